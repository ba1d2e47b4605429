//! Background mail delivery.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use shoutout_core::BoxFuture;
use shoutout_core::emails::MailRequest;
use shoutout_core::ports::{ErrorTracker, MailError, MailSender};

/// Enqueues mail for the dispatcher task.
///
/// `send` only fails when the queue is full or the dispatcher has stopped.
#[derive(Clone, Debug)]
pub struct QueuedMailSender {
    queue: mpsc::Sender<MailRequest>,
}

impl MailSender for QueuedMailSender {
    fn send(&self, request: MailRequest) -> BoxFuture<'_, Result<(), MailError>> {
        Box::pin(async move {
            self.queue.try_send(request).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => MailError::Queue("mail queue is full".to_owned()),
                mpsc::error::TrySendError::Closed(_) => MailError::Queue("mail dispatcher stopped".to_owned()),
            })
        })
    }
}

/// Starts the dispatcher and returns the sender feeding it.
///
/// The task ends once every [`QueuedMailSender`] clone is dropped and the
/// queue is drained. Delivery failures are logged and reported; they are not
/// retried.
pub fn spawn_mail_dispatcher(
    carrier: Arc<dyn MailSender>,
    error_tracker: Arc<dyn ErrorTracker>,
    capacity: usize,
) -> (QueuedMailSender, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<MailRequest>(capacity.max(1));

    let handle = tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            let template = request.template.name.clone();
            match carrier.send(request).await {
                Ok(()) => {
                    metrics::counter!("shoutout_mails_total", "outcome" => "sent").increment(1);
                }
                Err(error) => {
                    metrics::counter!("shoutout_mails_total", "outcome" => "failed").increment(1);
                    tracing::error!(%template, %error, "mail delivery failed");
                    error_tracker.capture_error(&error);
                }
            }
        }
        tracing::debug!("mail dispatcher stopped");
    });

    (QueuedMailSender { queue: tx }, handle)
}
