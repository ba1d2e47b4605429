//! `POST /webhook/payment`.
//!
//! Always answers 200 so the processor never retries; anything unexpected
//! goes to the error tracker instead.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use serde_json::{Value, json};
use shoutout_wirecard::{PaymentNotification, webhook::webhook_token_matches};

use crate::state::AppState;

/// Reconciles a payment status notification.
pub async fn payment_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if !webhook_token_matches(authorization, &state.webhook_token) {
        tracing::warn!("unauthorized payment webhook");
        state.env.error_tracker.capture_message(&format!(
            "UNAUTHORIZED REQUEST | DATA: {}",
            String::from_utf8_lossy(&body)
        ));
        return acknowledged();
    }

    match serde_json::from_slice::<PaymentNotification>(&body) {
        Ok(notification) => {
            if let Ok(outcome) = state.reconciler.update_payment_status(&notification).await {
                tracing::debug!(event = %notification.event, ?outcome, "payment webhook handled");
            }
        }
        Err(error) => {
            tracing::warn!(%error, "malformed payment webhook");
            state.env.error_tracker.capture_error(&error);
        }
    }
    acknowledged()
}

fn acknowledged() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({})))
}
