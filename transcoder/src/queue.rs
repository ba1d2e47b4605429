//! Job queue and worker pool.

use std::sync::Arc;

use shoutout_core::BoxFuture;
use shoutout_core::ports::{ScheduleError, Transcoder};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::worker::TranscodeWorker;

/// Producer side: implements the [`Transcoder`] port.
#[derive(Clone, Debug)]
pub struct TranscodeQueue {
    jobs: mpsc::Sender<Uuid>,
}

/// Consumer side, handed to [`spawn_workers`].
#[derive(Debug)]
pub struct TranscodeJobs {
    jobs: mpsc::Receiver<Uuid>,
}

/// Bounded job channel.
///
/// Split from [`spawn_workers`] so the queue can be injected into the
/// environment the workers' bus factory is built from.
#[must_use]
pub fn transcode_channel(capacity: usize) -> (TranscodeQueue, TranscodeJobs) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (TranscodeQueue { jobs: tx }, TranscodeJobs { jobs: rx })
}

impl Transcoder for TranscodeQueue {
    fn schedule(&self, shoutout_hash: Uuid) -> BoxFuture<'_, Result<(), ScheduleError>> {
        Box::pin(async move {
            self.jobs.try_send(shoutout_hash).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => ScheduleError("transcode queue is full".to_owned()),
                mpsc::error::TrySendError::Closed(_) => ScheduleError("transcode workers stopped".to_owned()),
            })?;
            tracing::debug!(shoutout = %shoutout_hash, "transcode scheduled");
            Ok(())
        })
    }
}

/// Starts `count` workers sharing the job channel.
///
/// Workers exit once every [`TranscodeQueue`] is dropped and the channel is
/// drained.
pub fn spawn_workers(jobs: TranscodeJobs, worker: Arc<TranscodeWorker>, count: usize) -> Vec<JoinHandle<()>> {
    let jobs = Arc::new(Mutex::new(jobs.jobs));
    (0..count.max(1))
        .map(|index| {
            let jobs = Arc::clone(&jobs);
            let worker = Arc::clone(&worker);
            tokio::spawn(async move {
                loop {
                    let next = jobs.lock().await.recv().await;
                    let Some(shoutout_hash) = next else { break };
                    tracing::debug!(worker = index, shoutout = %shoutout_hash, "transcode job started");
                    worker.run(shoutout_hash).await;
                }
                tracing::debug!(worker = index, "transcode worker stopped");
            })
        })
        .collect()
}
