//! Custom extractors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Header carrying the authenticated talent, set by the upstream
/// authentication layer.
pub const TALENT_ID_HEADER: &str = "x-talent-id";

/// Talent making the request.
///
/// Rejects with 401 when the header is missing or not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TalentId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for TalentId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(TALENT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
            .map(Self)
            .ok_or_else(|| AppError::unauthorized("Authentication credentials were not provided."))
    }
}
