//! # Shoutout Transcoder
//!
//! Converts uploaded shoutout videos to watermarked MP4 in the background.
//!
//! The fulfillment saga enqueues a shoutout hash through [`TranscodeQueue`]
//! (the [`Transcoder`](shoutout_core::ports::Transcoder) port). A pool of
//! workers drains the queue; each job downloads the raw upload, runs ffmpeg
//! under a time limit, stores the result, repoints the shoutout at it and
//! finally publishes `ShoutoutSuccessfullyTranscodedEvent` on a fresh
//! fulfillment bus.
//!
//! Encoding failures and time-limit overruns are retried on a constant delay;
//! anything else fails the job at once.

pub mod config;
pub mod encoder;
pub mod error;
pub mod queue;
pub mod storage;
pub mod worker;

pub use config::TranscoderConfig;
pub use encoder::{FfmpegEncoder, VideoEncoder};
pub use error::TranscodeError;
pub use queue::{TranscodeJobs, TranscodeQueue, spawn_workers, transcode_channel};
pub use storage::{LocalVideoStorage, VideoStorage, transcoded_key};
pub use worker::{BusFactory, TranscodeWorker};
