//! Mailgun HTTP carrier.

use reqwest::Client;
use serde_json::Value;

use shoutout_core::BoxFuture;
use shoutout_core::emails::MailRequest;
use shoutout_core::ports::{MailError, MailSender};

use crate::config::MailgunConfig;

/// Sends templated mail through the Mailgun messages API.
#[derive(Clone)]
pub struct MailgunCarrier {
    client: Client,
    config: MailgunConfig,
}

impl MailgunCarrier {
    /// Carrier with a default HTTP client.
    #[must_use]
    pub fn new(config: MailgunConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Carrier sharing an existing client.
    #[must_use]
    pub const fn with_client(client: Client, config: MailgunConfig) -> Self {
        Self { client, config }
    }

    /// Delivers one message.
    ///
    /// # Errors
    ///
    /// [`MailError::Transport`] when the API is unreachable,
    /// [`MailError::Rejected`] on any non-2xx answer.
    pub async fn deliver(&self, request: &MailRequest) -> Result<(), MailError> {
        let response = self
            .client
            .post(format!("{}/messages", self.config.api_url.trim_end_matches('/')))
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form_fields(request))
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!(template = %request.template.name, to = %request.to_email, "mail accepted by mailgun");
        Ok(())
    }
}

/// Form body: envelope fields plus one `v:{key}` per template variable.
#[must_use]
pub fn form_fields(request: &MailRequest) -> Vec<(String, String)> {
    let mut fields = vec![
        ("from".to_owned(), request.from_email.clone()),
        ("to".to_owned(), request.to_email.clone()),
        ("subject".to_owned(), request.template.subject.clone()),
        ("template".to_owned(), request.template.name.clone()),
    ];
    fields.extend(request.template.data.iter().map(|(key, value)| {
        let value = match value {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        (format!("v:{key}"), value)
    }));
    fields
}

impl MailSender for MailgunCarrier {
    fn send(&self, request: MailRequest) -> BoxFuture<'_, Result<(), MailError>> {
        Box::pin(async move { self.deliver(&request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shoutout_core::emails::MailTemplate;

    #[test]
    fn template_variables_are_prefixed() {
        let request = MailRequest {
            from_email: "contato@viggio.com.br".into(),
            to_email: "Maria <maria@example.com>".into(),
            template: MailTemplate::new(
                "order-detail",
                "Seu pedido foi enviado",
                &json!({"talent_name": "Talento 1", "is_public": true, "missing": null}),
            ),
        };

        let fields = form_fields(&request);

        assert_eq!(fields[0], ("from".into(), "contato@viggio.com.br".into()));
        assert_eq!(fields[3], ("template".into(), "order-detail".into()));
        assert!(fields.contains(&("v:talent_name".into(), "Talento 1".into())));
        assert!(fields.contains(&("v:is_public".into(), "true".into())));
        assert!(fields.contains(&("v:missing".into(), String::new())));
    }
}
