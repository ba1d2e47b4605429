//! Gateway settings.

use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Credentials and endpoints of the payment processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WirecardConfig {
    /// API root, e.g. `https://sandbox.moip.com.br/v2`.
    pub base_url: String,
    /// Account token (basic auth user).
    pub token: String,
    /// Account key (basic auth password).
    pub api_key: String,
    /// Secret expected in the webhook `Authorization` header.
    pub webhook_token: String,
    /// Text shown on the customer's card statement.
    pub statement_descriptor: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for WirecardConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sandbox.moip.com.br/v2".to_owned(),
            token: String::new(),
            api_key: String::new(),
            webhook_token: String::new(),
            statement_descriptor: "viggio.com.br".to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl WirecardConfig {
    pub(crate) fn orders_url(&self) -> String {
        format!("{}/orders", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn payments_url(&self, remote_order_id: &str) -> String {
        format!("{}/orders/{remote_order_id}/payments", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn capture_url(&self, remote_payment_id: &str) -> String {
        format!("{}/payments/{remote_payment_id}/capture", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        let config = WirecardConfig {
            base_url: "https://api.moip.com.br/v2/".into(),
            ..WirecardConfig::default()
        };
        assert_eq!(config.orders_url(), "https://api.moip.com.br/v2/orders");
        assert_eq!(config.payments_url("ORD-1"), "https://api.moip.com.br/v2/orders/ORD-1/payments");
        assert_eq!(config.capture_url("PAY-1"), "https://api.moip.com.br/v2/payments/PAY-1/capture");
    }
}
