//! # Shoutout Core
//!
//! Domain model and ports for the order-fulfillment saga of the shoutout
//! marketplace.
//!
//! Customers buy personalized videos ("shoutouts") from talents. Fulfilling one
//! is a saga spanning the local database, a third-party payment processor and an
//! asynchronous transcoding worker. This crate holds everything that does not
//! touch I/O:
//!
//! - **Entities**: [`Order`], [`Charge`], [`Buyer`], [`CreditCard`], [`Shoutout`],
//!   [`TalentProfit`], [`AgencyProfit`]
//! - **Messages**: the commands and events flowing through the message bus
//! - **Ports**: traits implemented by storage, gateway, mail and transcoding adapters
//! - **Profit factories**: revenue-split calculations
//! - **Emails**: templated notification builders
//!
//! Execution (bus, saga services, retries) lives in `shoutout-runtime`.

pub mod charge;
pub mod config;
pub mod emails;
pub mod error;
pub mod messages;
pub mod money;
pub mod order;
pub mod ports;
pub mod profit;
pub mod shoutout;
pub mod talent;

pub use charge::{Buyer, Charge, ChargeStatus, CreditCard, PaymentMethod};
pub use config::SiteConfig;
pub use error::{
    ChargingShoutoutRequestError, DomainError, GatewayError, PersistingShoutoutRequestError,
    PersistingShoutoutVideoError, SagaError, StorageError, ViewError,
};
pub use messages::{
    BusMessage, FulfillShoutoutRequestCommand, Message, MessageType, RequestShoutoutCommand,
    ShoutoutSuccessfullyRequestedEvent, ShoutoutSuccessfullyTranscodedEvent, ShoutoutUploadedEvent,
};
pub use order::{Order, OrderDetails, OrderLookup, VideoIsFor};
pub use shoutout::{AgencyProfit, Shoutout, TalentProfit};
pub use talent::{AgencyProfitPercentage, Talent, TalentProfitPercentage};

use std::future::Future;
use std::pin::Pin;

/// Boxed, sendable future returned by every port so the traits stay dyn-compatible.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Environment traits for dependency injection.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
