//! # Shoutout Wirecard
//!
//! Client for the Wirecard (Moip) v2 API and reconciliation of its payment
//! webhooks.
//!
//! - [`WirecardClient`] implements [`PaymentGateway`](shoutout_core::ports::PaymentGateway):
//!   order creation, delayed-capture payment authorization, capture
//! - [`webhook::PaymentStatusReconciler`] applies status notifications,
//!   ignoring stale ones

pub mod client;
pub mod config;
pub mod webhook;
pub mod wire;

pub use client::WirecardClient;
pub use config::WirecardConfig;
pub use webhook::{PaymentNotification, PaymentStatusReconciler, WebhookError};
