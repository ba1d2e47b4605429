//! Saga step handlers.
//!
//! Each handler takes its message plus the collaborators it needs and returns
//! the follow-on messages for the bus. [`crate::routes`] binds collaborators and
//! registers the handlers in saga order.

pub mod fulfill_shoutout_request;
pub mod request_shoutout;

use shoutout_core::emails::MailRequest;
use shoutout_core::ports::{ErrorTracker, MailSender};

/// Sends a notification, containing its failure so sibling handlers still run.
pub(crate) async fn send_notification(
    mail_sender: &dyn MailSender,
    error_tracker: &dyn ErrorTracker,
    request: MailRequest,
) {
    let template = request.template.name.clone();
    match mail_sender.send(request).await {
        Ok(()) => tracing::info!(template, "notification sent"),
        Err(error) => {
            tracing::error!(template, %error, "notification not sent");
            error_tracker.capture_error(&error);
        }
    }
}
