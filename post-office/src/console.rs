//! Development mail sender.

use shoutout_core::BoxFuture;
use shoutout_core::emails::MailRequest;
use shoutout_core::ports::{MailError, MailSender};

/// Logs mail instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailSender;

impl MailSender for ConsoleMailSender {
    fn send(&self, request: MailRequest) -> BoxFuture<'_, Result<(), MailError>> {
        Box::pin(async move {
            tracing::info!(
                from = %request.from_email,
                to = %request.to_email,
                subject = %request.template.subject,
                template = %request.template.name,
                data = %serde_json::Value::Object(request.template.data),
                "mail (console)"
            );
            Ok(())
        })
    }
}
