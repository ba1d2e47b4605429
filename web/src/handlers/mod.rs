//! HTTP request handlers.

pub mod charge;
pub mod fulfill;
pub mod health;
pub mod webhook;

pub use charge::charge_order;
pub use fulfill::fulfill_shoutout_request;
pub use health::{health_check, readiness_check};
pub use webhook::payment_webhook;
