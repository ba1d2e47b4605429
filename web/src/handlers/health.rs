//! Health endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

/// Liveness body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Whether the database answered
    pub database: bool,
}

/// `GET /health`: the process is up. The database flag is informational.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database: state.readiness.is_ready().await,
    })
}

/// `GET /ready`: 503 until the database answers.
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    if state.readiness.is_ready().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
