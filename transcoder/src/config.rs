//! Worker pool settings.

use std::path::PathBuf;
use std::time::Duration;

/// Transcoding settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscoderConfig {
    /// ffmpeg binary.
    pub ffmpeg_path: PathBuf,
    /// Logo overlaid on every video. No overlay when absent.
    pub watermark_path: Option<PathBuf>,
    /// Root of the media storage.
    pub media_root: PathBuf,
    /// Directory for per-job working files.
    pub scratch_dir: PathBuf,
    /// Concurrent jobs.
    pub workers: usize,
    /// Jobs waiting before `schedule` starts failing.
    pub queue_capacity: usize,
    /// Wall-clock limit of a single attempt.
    pub time_limit: Duration,
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// Delay between attempts.
    pub retry_delay: Duration,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            watermark_path: None,
            media_root: PathBuf::from("media"),
            scratch_dir: std::env::temp_dir().join("shoutout-transcoder"),
            workers: 2,
            queue_capacity: 64,
            time_limit: Duration::from_secs(600),
            max_retries: 10,
            retry_delay: Duration::from_secs(180),
        }
    }
}
