//! Error responses.
//!
//! Saga failures are mapped onto the HTTP contract here: validation errors
//! become 400, unknown orders 404, and persistence or gateway failures 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shoutout_core::{DomainError, PersistingShoutoutVideoError, SagaError, ViewError};
use std::fmt;

/// Error returned by handlers.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// User-facing message
    message: String,
    /// Stable code for clients
    code: &'static str,
    /// Logged, never sent to the client
    source: Option<anyhow::Error>,
}

impl AppError {
    /// New error without a source.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attaches the underlying error for logging.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST")
    }

    /// 401 Unauthorized.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED")
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND")
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.into(), "INTERNAL_SERVER_ERROR")
    }

    /// Status sent to the client.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Code sent to the client.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "request failed"
                ),
                None => tracing::error!(status = %self.status, code = self.code, message = %self.message, "request failed"),
            }
        }

        let body = ErrorResponse {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<DomainError> for AppError {
    fn from(error: DomainError) -> Self {
        let code = match error {
            DomainError::RequiredField(_) => "REQUIRED_FIELD",
            DomainError::OrderExpired => "ORDER_EXPIRED",
            DomainError::TalentPermission => "TALENT_PERMISSION",
            DomainError::OrderHasShoutout => "ORDER_HAS_SHOUTOUT",
        };
        Self::new(StatusCode::BAD_REQUEST, error.to_string(), code)
    }
}

impl From<SagaError> for AppError {
    fn from(error: SagaError) -> Self {
        match error {
            SagaError::Domain(domain) => domain.into(),
            // Lost the race against a concurrent upload of the same order.
            SagaError::PersistingShoutoutVideo(PersistingShoutoutVideoError::OrderAlreadyFulfilled { .. }) => {
                DomainError::OrderHasShoutout.into()
            }
            SagaError::View(ViewError::NotFound { entity, key }) => Self::not_found(format!("{entity} {key} not found")),
            SagaError::ChargingShoutoutRequest(_) => {
                Self::internal("An issue happened while processing payment.").with_source(error)
            }
            SagaError::PersistingShoutoutRequest(_) => {
                Self::internal("An issue happened while persisting data.").with_source(error)
            }
            SagaError::PersistingShoutoutVideo(_) => {
                Self::internal("It happened an issue when persisting shoutout video").with_source(error)
            }
            SagaError::View(ViewError::Storage(_)) | SagaError::Scheduling(_) => {
                Self::internal("An internal error occurred").with_source(error)
            }
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}
