//! Payment status webhook.
//!
//! The processor calls us back whenever a payment changes status. Deliveries
//! can arrive out of order, so every update carries the event time and older
//! events than the last one applied are dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use shoutout_core::ChargeStatus;
use shoutout_core::StorageError;
use shoutout_core::ports::{ErrorTracker, NotificationOutcome, PaymentRecords, PaymentStatusUpdate};

/// Webhook body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentNotification {
    /// Event name, e.g. `PAYMENT.AUTHORIZED`.
    #[serde(default)]
    pub event: String,
    /// Changed resource.
    pub resource: NotificationResource,
}

/// Resource wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationResource {
    /// The payment.
    pub payment: NotifiedPayment,
}

/// Payment as reported by the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedPayment {
    /// Processor payment id.
    pub id: String,
    /// Processor status.
    pub status: String,
    /// Event time, e.g. `2019-03-04T16:46:02.000-03`.
    pub updated_at: String,
}

/// A notification that could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    /// Status outside the known mapping.
    #[error("unknown payment status {0}")]
    UnknownStatus(String),

    /// `updatedAt` did not parse.
    #[error("invalid notification timestamp {0}")]
    InvalidTimestamp(String),

    /// The update could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Maps a processor payment status to a local charge status.
#[must_use]
pub fn map_remote_status(status: &str) -> Option<ChargeStatus> {
    match status {
        "WAITING" | "IN_ANALYSIS" => Some(ChargeStatus::Processing),
        "PRE_AUTHORIZED" => Some(ChargeStatus::PreAuthorized),
        "AUTHORIZED" | "SETTLED" => Some(ChargeStatus::Paid),
        "CANCELLED" | "REFUNDED" | "REVERSED" => Some(ChargeStatus::Cancelled),
        _ => None,
    }
}

/// Parses RFC 3339 or the processor's hour-only offset form.
///
/// # Errors
///
/// [`WebhookError::InvalidTimestamp`] when neither format matches.
pub fn parse_event_time(raw: &str) -> Result<DateTime<Utc>, WebhookError> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%#z"))
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| WebhookError::InvalidTimestamp(raw.to_owned()))
}

/// Compares the `Authorization` header against the configured secret.
#[must_use]
pub fn webhook_token_matches(header: Option<&str>, expected: &str) -> bool {
    !expected.is_empty() && header == Some(expected)
}

impl PaymentNotification {
    /// Converts the body into a storage update.
    ///
    /// # Errors
    ///
    /// [`WebhookError::UnknownStatus`] or [`WebhookError::InvalidTimestamp`].
    pub fn to_update(&self) -> Result<PaymentStatusUpdate, WebhookError> {
        let payment = &self.resource.payment;
        let status =
            map_remote_status(&payment.status).ok_or_else(|| WebhookError::UnknownStatus(payment.status.clone()))?;
        Ok(PaymentStatusUpdate {
            wirecard_payment_hash: payment.id.clone(),
            status,
            event_at: parse_event_time(&payment.updated_at)?,
        })
    }
}

/// Applies webhook notifications to local charges.
#[derive(Clone)]
pub struct PaymentStatusReconciler {
    records: Arc<dyn PaymentRecords>,
    error_tracker: Arc<dyn ErrorTracker>,
}

impl PaymentStatusReconciler {
    /// Wires the reconciler.
    #[must_use]
    pub fn new(records: Arc<dyn PaymentRecords>, error_tracker: Arc<dyn ErrorTracker>) -> Self {
        Self { records, error_tracker }
    }

    /// Applies a notification.
    ///
    /// Every failure and every dropped notification is reported to the error
    /// tracker before returning, so callers only need the outcome for logging.
    ///
    /// # Errors
    ///
    /// Any [`WebhookError`] raised while mapping or storing the update.
    pub async fn update_payment_status(
        &self,
        notification: &PaymentNotification,
    ) -> Result<NotificationOutcome, WebhookError> {
        let payment_id = &notification.resource.payment.id;
        let result = match notification.to_update() {
            Ok(update) => self
                .records
                .apply_payment_notification(&update)
                .await
                .map_err(WebhookError::from),
            Err(error) => Err(error),
        };

        let label = match &result {
            Ok(NotificationOutcome::Applied) => {
                tracing::info!(
                    payment = %payment_id,
                    event = %notification.event,
                    status = %notification.resource.payment.status,
                    "payment status updated"
                );
                "applied"
            }
            Ok(NotificationOutcome::Stale) => {
                tracing::warn!(payment = %payment_id, updated_at = %notification.resource.payment.updated_at, "stale payment notification ignored");
                self.error_tracker
                    .capture_message(&format!("stale notification for payment {payment_id} ignored"));
                "stale"
            }
            Ok(NotificationOutcome::UnknownPayment) => {
                tracing::error!(payment = %payment_id, "notification for unknown payment");
                self.error_tracker
                    .capture_message(&format!("transaction data not found for payment {payment_id}"));
                "unknown_payment"
            }
            Err(error) => {
                tracing::error!(payment = %payment_id, %error, "payment notification not applied");
                self.error_tracker.capture_error(error);
                "error"
            }
        };
        metrics::counter!("shoutout_webhook_notifications_total", "outcome" => label).increment(1);

        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_mapping() {
        assert_eq!(map_remote_status("WAITING"), Some(ChargeStatus::Processing));
        assert_eq!(map_remote_status("IN_ANALYSIS"), Some(ChargeStatus::Processing));
        assert_eq!(map_remote_status("PRE_AUTHORIZED"), Some(ChargeStatus::PreAuthorized));
        assert_eq!(map_remote_status("AUTHORIZED"), Some(ChargeStatus::Paid));
        assert_eq!(map_remote_status("SETTLED"), Some(ChargeStatus::Paid));
        assert_eq!(map_remote_status("CANCELLED"), Some(ChargeStatus::Cancelled));
        assert_eq!(map_remote_status("REFUNDED"), Some(ChargeStatus::Cancelled));
        assert_eq!(map_remote_status("REVERSED"), Some(ChargeStatus::Cancelled));
        assert_eq!(map_remote_status("CREATED"), None);
    }

    #[test]
    fn parses_processor_timestamps() {
        let expected = Utc.with_ymd_and_hms(2019, 3, 4, 19, 46, 2).unwrap();
        assert_eq!(parse_event_time("2019-03-04T16:46:02.000-03").unwrap(), expected);
        assert_eq!(parse_event_time("2019-03-04T16:46:02-03:00").unwrap(), expected);
        assert_eq!(parse_event_time("2019-03-04T19:46:02Z").unwrap(), expected);
        assert!(matches!(
            parse_event_time("yesterday"),
            Err(WebhookError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn token_must_match_exactly() {
        assert!(webhook_token_matches(Some("secret"), "secret"));
        assert!(!webhook_token_matches(Some("Secret"), "secret"));
        assert!(!webhook_token_matches(None, "secret"));
        assert!(!webhook_token_matches(Some(""), ""));
    }

    #[test]
    fn deserializes_processor_body() {
        let body = r#"{
            "date": "",
            "env": "sandbox",
            "event": "PAYMENT.AUTHORIZED",
            "resource": {
                "payment": {
                    "id": "PAY-6PYBY8A9CFMU",
                    "status": "AUTHORIZED",
                    "updatedAt": "2019-03-04T16:46:02.000-03",
                    "amount": {"total": 15000}
                }
            }
        }"#;
        let notification: PaymentNotification = serde_json::from_str(body).unwrap();
        let update = notification.to_update().unwrap();
        assert_eq!(update.wirecard_payment_hash, "PAY-6PYBY8A9CFMU");
        assert_eq!(update.status, ChargeStatus::Paid);
    }
}
