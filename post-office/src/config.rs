//! Provider settings.

/// Mailgun credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailgunConfig {
    /// Domain API root, e.g. `https://api.mailgun.net/v3/mg.viggio.com.br`.
    pub api_url: String,
    /// Private API key.
    pub api_key: String,
}

/// Telegram bot used for operator alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    /// Bot API root. Overridable for tests.
    pub api_url: String,
    /// Bot token.
    pub bot_token: String,
    /// Chat receiving the alerts.
    pub group_id: String,
}

impl TelegramConfig {
    /// Config against the public bot API.
    #[must_use]
    pub fn new(bot_token: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            api_url: "https://api.telegram.org".to_owned(),
            bot_token: bot_token.into(),
            group_id: group_id.into(),
        }
    }

    pub(crate) fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url.trim_end_matches('/'), self.bot_token)
    }
}
