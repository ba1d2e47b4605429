//! Operator alert channels.

use reqwest::Client;
use serde::Serialize;

use shoutout_core::BoxFuture;
use shoutout_core::ports::{AlertChannel, AlertError};

use crate::config::TelegramConfig;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Posts alerts to a Telegram group.
#[derive(Clone)]
pub struct TelegramAlertChannel {
    client: Client,
    config: TelegramConfig,
}

impl TelegramAlertChannel {
    /// Channel with a default HTTP client.
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn post(&self, text: &str) -> Result<(), AlertError> {
        let response = self
            .client
            .post(self.config.send_message_url())
            .json(&SendMessage {
                chat_id: &self.config.group_id,
                text,
            })
            .send()
            .await
            .map_err(|e| AlertError(format!("Telegram: {e}")))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError(format!("Telegram: {status} - {body}")));
        }
        Ok(())
    }
}

impl AlertChannel for TelegramAlertChannel {
    fn send_high_priority<'a>(&'a self, message: &'a str) -> BoxFuture<'a, Result<(), AlertError>> {
        Box::pin(self.post(message))
    }
}

/// Writes alerts to the log at error level. Used when no bot is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertChannel;

impl AlertChannel for LogAlertChannel {
    fn send_high_priority<'a>(&'a self, message: &'a str) -> BoxFuture<'a, Result<(), AlertError>> {
        Box::pin(async move {
            tracing::error!(alert = true, "{message}");
            Ok(())
        })
    }
}
