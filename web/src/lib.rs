//! # Shoutout Web
//!
//! HTTP surface of the fulfillment saga.
//!
//! | Route | Handler | Success |
//! |-------|---------|---------|
//! | `POST /charge` | [`handlers::charge_order`] | 201 `{order_hash}` |
//! | `POST /fulfill` | [`handlers::fulfill_shoutout_request`] | 201 `{shoutout_hash}` |
//! | `POST /webhook/payment` | [`handlers::payment_webhook`] | always 200 |
//! | `GET /health` | [`handlers::health_check`] | 200 |
//! | `GET /ready` | [`handlers::readiness_check`] | 200 or 503 |
//!
//! Each request builds a fresh bus from the shared
//! [`ShoutoutEnvironment`](shoutout_runtime::ShoutoutEnvironment); errors are
//! mapped to status codes by [`AppError`].

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::AppError;
pub use extractors::{TALENT_ID_HEADER, TalentId};
pub use state::{AppState, Readiness, StaticReadiness};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;

/// Router with every route and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/charge", post(handlers::charge_order))
        .route("/fulfill", post(handlers::fulfill_shoutout_request))
        .route("/webhook/payment", post(handlers::payment_webhook))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
