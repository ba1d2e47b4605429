//! Error taxonomy of the saga.
//!
//! Validation errors come from the domain and reach the HTTP boundary untouched.
//! Infrastructure failures are wrapped at the unit-of-work boundary into a
//! narrower type so callers can tell "not saved" from "bank said no".

use thiserror::Error;

/// Invalid input or state detected by the domain model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field required by the order's configuration is missing.
    #[error("{0} is required")]
    RequiredField(&'static str),

    /// The order passed its expiration date.
    #[error("Can't fulfill an expired order.")]
    OrderExpired,

    /// The talent fulfilling the order does not own it.
    #[error("Order belongs to another Talent.")]
    TalentPermission,

    /// The order was already fulfilled.
    #[error("Order already has a shoutout attached.")]
    OrderHasShoutout,
}

/// Generic storage failure raised by adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

/// Read-side lookup failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// Nothing matches the lookup.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Lookup key
        key: String,
    },

    /// The store could not be queried.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ViewError {
    /// Shorthand for [`ViewError::NotFound`].
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

/// The request-shoutout unit of work did not commit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistingShoutoutRequestError {
    /// Commit was attempted without staging every required entity.
    #[error("shoutout request is missing its {0}")]
    Incomplete(&'static str),

    /// The transaction failed and was rolled back.
    #[error("failed to persist shoutout request: {0}")]
    Storage(String),
}

/// The fulfill unit of work did not commit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistingShoutoutVideoError {
    /// Another fulfillment for the same order committed first.
    #[error("order {order_id} already has a shoutout")]
    OrderAlreadyFulfilled {
        /// Order that was fulfilled concurrently
        order_id: i64,
    },

    /// Commit was attempted without staging every required entity.
    #[error("shoutout fulfillment is missing its {0}")]
    Incomplete(&'static str),

    /// The transaction failed and was rolled back.
    #[error("failed to persist shoutout video: {0}")]
    Storage(String),
}

/// Failure talking to the payment processor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Remote order was not created.
    #[error("create order failed: {0}")]
    CreateOrder(String),

    /// Remote payment was not authorized.
    #[error("create payment failed: {0}")]
    CreatePayment(String),

    /// Authorized payment was not captured.
    #[error("capture payment failed: {0}")]
    CapturePayment(String),

    /// The processor did not answer in time.
    #[error("payment gateway timed out")]
    Timeout,

    /// Network or decoding failure.
    #[error("payment gateway transport error: {0}")]
    Transport(String),
}

/// Charging a shoutout request failed; the charge was marked failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChargingShoutoutRequestError {
    /// The processor rejected or never answered.
    #[error("charging shoutout request failed: {0}")]
    Gateway(#[from] GatewayError),

    /// Gateway succeeded but the transaction identifiers were not saved.
    #[error("charging shoutout request failed: {0}")]
    Storage(#[from] StorageError),

    /// The order has not been persisted yet.
    #[error("order {0} has no storage id")]
    UnsavedOrder(uuid::Uuid),
}

/// Anything a saga handler can fail with.
#[derive(Error, Debug, Clone)]
pub enum SagaError {
    /// Validation failure.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request persistence failed.
    #[error(transparent)]
    PersistingShoutoutRequest(#[from] PersistingShoutoutRequestError),

    /// Charging failed.
    #[error(transparent)]
    ChargingShoutoutRequest(#[from] ChargingShoutoutRequestError),

    /// Fulfillment persistence failed.
    #[error(transparent)]
    PersistingShoutoutVideo(#[from] PersistingShoutoutVideoError),

    /// A lookup failed.
    #[error(transparent)]
    View(#[from] ViewError),

    /// The transcode job could not be enqueued.
    #[error("failed to schedule transcoding: {0}")]
    Scheduling(String),
}
