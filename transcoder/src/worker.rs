//! A single transcode job, with retries.

use std::path::Path;
use std::sync::Arc;

use shoutout_core::ports::{ErrorTracker, ShoutoutVideos};
use shoutout_core::{Shoutout, ShoutoutSuccessfullyTranscodedEvent, ViewError};
use shoutout_runtime::MessageBus;
use shoutout_runtime::retry::{RetryError, RetryPolicy, retry_transient};
use uuid::Uuid;

use crate::config::TranscoderConfig;
use crate::encoder::VideoEncoder;
use crate::error::TranscodeError;
use crate::storage::{VideoStorage, transcoded_key};

/// Builds the bus that receives `ShoutoutSuccessfullyTranscodedEvent`.
pub type BusFactory = Arc<dyn Fn() -> MessageBus + Send + Sync>;

/// Runs transcode jobs.
pub struct TranscodeWorker {
    shoutouts: Arc<dyn ShoutoutVideos>,
    storage: Arc<dyn VideoStorage>,
    encoder: Arc<dyn VideoEncoder>,
    error_tracker: Arc<dyn ErrorTracker>,
    bus_factory: BusFactory,
    config: TranscoderConfig,
}

impl TranscodeWorker {
    /// Wires a worker.
    #[must_use]
    pub fn new(
        shoutouts: Arc<dyn ShoutoutVideos>,
        storage: Arc<dyn VideoStorage>,
        encoder: Arc<dyn VideoEncoder>,
        error_tracker: Arc<dyn ErrorTracker>,
        bus_factory: BusFactory,
        config: TranscoderConfig,
    ) -> Self {
        Self {
            shoutouts,
            storage,
            encoder,
            error_tracker,
            bus_factory,
            config,
        }
    }

    /// Transcodes a shoutout, retrying transient failures, then publishes
    /// the completion event.
    ///
    /// Failures are logged and reported; nothing is returned to the queue.
    pub async fn run(&self, shoutout_hash: Uuid) {
        let policy = RetryPolicy::constant(self.config.max_retries, self.config.retry_delay);
        let result = retry_transient(&policy, || self.attempt(shoutout_hash), TranscodeError::is_transient).await;

        match result {
            Ok(order_id) => {
                metrics::counter!("shoutout_transcodes_total", "outcome" => "success").increment(1);
                tracing::info!(shoutout = %shoutout_hash, order_id, "shoutout transcoded");
                self.publish(order_id).await;
            }
            Err(error) => {
                let outcome = match &error {
                    RetryError::Fatal { .. } => "fatal",
                    RetryError::Exhausted { .. } => "exhausted",
                };
                metrics::counter!("shoutout_transcodes_total", "outcome" => outcome).increment(1);
                tracing::error!(shoutout = %shoutout_hash, %error, "transcoding failed");
                self.error_tracker.capture_error(&error);
            }
        }
    }

    async fn publish(&self, order_id: i64) {
        let bus = (self.bus_factory)();
        if let Err(error) = bus.handle(ShoutoutSuccessfullyTranscodedEvent { order_id }.into()).await {
            tracing::error!(order_id, %error, "transcoded event handling failed");
            self.error_tracker.capture_error(&error);
        }
    }

    /// One attempt under the time limit.
    async fn attempt(&self, shoutout_hash: Uuid) -> Result<i64, TranscodeError> {
        let limit = self.config.time_limit;
        let scratch = self.config.scratch_dir.join(shoutout_hash.to_string());
        let outcome = tokio::time::timeout(limit, self.transcode(shoutout_hash, &scratch))
            .await
            .unwrap_or(Err(TranscodeError::TimeLimitExceeded(limit)));

        if let Err(error) = tokio::fs::remove_dir_all(&scratch).await {
            if error.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %scratch.display(), %error, "scratch directory not removed");
            }
        }
        outcome
    }

    async fn transcode(&self, shoutout_hash: Uuid, scratch: &Path) -> Result<i64, TranscodeError> {
        let shoutout = self.load(shoutout_hash).await?;
        tokio::fs::create_dir_all(scratch).await?;

        let input = scratch.join("original");
        let output = scratch.join("transcoded_video.mp4");
        self.storage.fetch(&shoutout.video_file, &input).await?;
        self.encoder.encode(&input, &output).await?;
        self.encoder.validate(&output).await?;

        let key = transcoded_key(&shoutout.video_file);
        self.storage.store(&output, &key).await?;
        self.shoutouts
            .replace_video_file(shoutout_hash, &key)
            .await
            .map_err(|e| TranscodeError::Database(e.to_string()))?;
        if key != shoutout.video_file {
            self.storage.delete(&shoutout.video_file).await?;
        }
        self.storage.mark_as_attachment(&key).await?;
        Ok(shoutout.order_id)
    }

    async fn load(&self, shoutout_hash: Uuid) -> Result<Shoutout, TranscodeError> {
        self.shoutouts.view_shoutout(shoutout_hash).await.map_err(|e| match e {
            ViewError::NotFound { .. } => TranscodeError::ShoutoutNotFound(shoutout_hash),
            ViewError::Storage(e) => TranscodeError::Database(e.to_string()),
        })
    }
}
