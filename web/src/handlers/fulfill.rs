//! `POST /fulfill`.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use shoutout_core::FulfillShoutoutRequestCommand;
use shoutout_runtime::fulfill_shoutout_request_bus;
use uuid::Uuid;

use crate::WebResult;
use crate::error::AppError;
use crate::extractors::TalentId;
use crate::state::AppState;

/// Upload notification from the talent.
#[derive(Debug, Clone, Deserialize)]
pub struct FulfillRequest {
    /// Order being fulfilled
    pub order_hash: Uuid,
    /// Storage key of the raw upload
    pub video_file: String,
}

/// Created shoutout.
#[derive(Debug, Serialize)]
pub struct FulfillResponse {
    /// Public hash of the shoutout
    pub shoutout_hash: Uuid,
}

/// Records the shoutout, splits the profits and captures the payment.
///
/// # Errors
///
/// 401 without a talent, 400 for validation errors, 404 for an unknown
/// order, 500 when persistence fails.
pub async fn fulfill_shoutout_request(
    State(state): State<AppState>,
    TalentId(talent_id): TalentId,
    payload: Result<Json<FulfillRequest>, JsonRejection>,
) -> WebResult<(StatusCode, Json<FulfillResponse>)> {
    let Json(request) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let shoutout_hash = Uuid::new_v4();
    let command = FulfillShoutoutRequestCommand {
        shoutout_hash,
        order_hash: request.order_hash,
        talent_id,
        video_file: request.video_file,
    };

    fulfill_shoutout_request_bus(&state.env).handle(command.into()).await?;

    tracing::info!(order_hash = %request.order_hash, %shoutout_hash, talent_id, "shoutout request fulfilled");
    Ok((StatusCode::CREATED, Json(FulfillResponse { shoutout_hash })))
}
