//! Ports consumed by the saga.
//!
//! Storage, gateway, mail, alerting and transcoding adapters implement these
//! traits. Methods return [`BoxFuture`] so the traits stay dyn-compatible and
//! collaborators can be injected as `Arc<dyn Trait>`.
//!
//! Units of work follow a stage-then-commit contract: `*_repository_add` calls
//! stage entities, `commit` persists all of them in one transaction or none.

use chrono::{DateTime, Utc};
use std::error::Error as StdError;
use thiserror::Error;
use uuid::Uuid;

use crate::BoxFuture;
use crate::charge::{Buyer, Charge, ChargeStatus, CreditCard};
use crate::emails::MailRequest;
use crate::error::{
    ChargingShoutoutRequestError, GatewayError, PersistingShoutoutRequestError,
    PersistingShoutoutVideoError, StorageError, ViewError,
};
use crate::messages::ShoutoutSuccessfullyRequestedEvent;
use crate::order::{Order, OrderLookup};
use crate::shoutout::{AgencyProfit, Shoutout, TalentProfit};
use crate::talent::{AgencyProfitPercentage, Talent, TalentProfitPercentage};

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// Identifiers of the remote order/payment created for a local order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionData {
    /// Local order id.
    pub order_id: i64,
    /// Local order hash.
    pub order_hash: Uuid,
    /// Processor order id.
    pub wirecard_order_hash: String,
    /// Processor payment id.
    pub wirecard_payment_hash: String,
    /// Time of the last applied webhook event.
    pub payment_event_last_timestamp: Option<DateTime<Utc>>,
}

/// Order lookups.
pub trait OrderViews: Send + Sync {
    /// Order with its charge, instruments and shoutout populated.
    fn view_order(&self, lookup: OrderLookup) -> BoxFuture<'_, Result<Order, ViewError>>;

    /// Processor identifiers for an order.
    fn view_transaction_data(&self, order_hash: Uuid) -> BoxFuture<'_, Result<TransactionData, ViewError>>;
}

/// Talent lookups.
pub trait TalentViews: Send + Sync {
    /// Talent by id.
    fn view_talent(&self, talent_id: i64) -> BoxFuture<'_, Result<Talent, ViewError>>;
}

/// Profit percentage lookups.
pub trait ProfitPercentageViews: Send + Sync {
    /// Talent-specific percentage, if configured.
    fn view_customized_talent_profit_percentage(
        &self,
        talent_id: i64,
    ) -> BoxFuture<'_, Result<Option<TalentProfitPercentage>, ViewError>>;

    /// The platform-wide default. Exactly one must exist.
    fn view_default_talent_profit_percentage(&self) -> BoxFuture<'_, Result<TalentProfitPercentage, ViewError>>;

    /// Agency percentage.
    fn view_agency_profit_percentage(
        &self,
        agency_id: i64,
    ) -> BoxFuture<'_, Result<AgencyProfitPercentage, ViewError>>;
}

/// Shoutout video records, used by the transcoder.
pub trait ShoutoutVideos: Send + Sync {
    /// Shoutout by public hash.
    fn view_shoutout(&self, shoutout_hash: Uuid) -> BoxFuture<'_, Result<Shoutout, ViewError>>;

    /// Points the shoutout at a new video file.
    fn replace_video_file<'a>(
        &'a self,
        shoutout_hash: Uuid,
        video_file: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>>;
}

// ---------------------------------------------------------------------------
// Units of work
// ---------------------------------------------------------------------------

/// Atomic creation of an order with its charge and payer snapshots.
pub trait PersistRequestShoutoutUnitOfWork: Send {
    /// Stage the order.
    fn order_repository_add(&mut self, order: Order);
    /// Stage the charge.
    fn charge_repository_add(&mut self, charge: Charge);
    /// Stage the credit card.
    fn credit_card_repository_add(&mut self, credit_card: CreditCard);
    /// Stage the buyer.
    fn buyer_repository_add(&mut self, buyer: Buyer);

    /// Persist order, charge, card and buyer in that order, or nothing.
    fn commit(&mut self) -> BoxFuture<'_, Result<(), PersistingShoutoutRequestError>>;
}

/// Atomic creation of the shoutout and its profit records.
pub trait FulfillShoutoutRequestUnitOfWork: Send {
    /// Stage the shoutout.
    fn shoutout_repository_add(&mut self, shoutout: Shoutout);
    /// Stage the talent profit.
    fn talent_profit_repository_add(&mut self, profit: TalentProfit);
    /// Stage the agency profit.
    fn agency_profit_repository_add(&mut self, profit: AgencyProfit);

    /// Persist everything staged, or nothing.
    ///
    /// A concurrent fulfillment of the same order surfaces as
    /// [`PersistingShoutoutVideoError::OrderAlreadyFulfilled`].
    fn commit(&mut self) -> BoxFuture<'_, Result<(), PersistingShoutoutVideoError>>;
}

/// Fresh unit-of-work instances, one per bus.
pub trait UnitOfWorkFactory: Send + Sync {
    /// New request unit of work.
    fn persist_request_shoutout(&self) -> Box<dyn PersistRequestShoutoutUnitOfWork>;
    /// New fulfillment unit of work.
    fn fulfill_shoutout_request(&self) -> Box<dyn FulfillShoutoutRequestUnitOfWork>;
}

/// Charges an order against the processor.
pub trait ProcessPayment: Send + Sync {
    /// Creates the remote order and a delayed-capture payment.
    ///
    /// Always leaves `order.charge.status` as `Processing` or `Failed` and
    /// persists it.
    fn charge<'a>(
        &'a self,
        order: &'a mut Order,
    ) -> BoxFuture<'a, Result<ShoutoutSuccessfullyRequestedEvent, ChargingShoutoutRequestError>>;
}

/// Result of a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Funds captured.
    Captured,
    /// Capture failed and operators were alerted; the saga continues.
    AlertRaised,
}

/// Captures a previously authorized payment.
pub trait CapturePayment: Send + Sync {
    /// Never fails the saga: failures are alerted and reported as
    /// [`CaptureOutcome::AlertRaised`].
    fn capture<'a>(&'a self, transaction: &'a TransactionData) -> BoxFuture<'a, CaptureOutcome>;
}

// ---------------------------------------------------------------------------
// Payment processor
// ---------------------------------------------------------------------------

/// Order or payment as acknowledged by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResource {
    /// Processor id.
    pub id: String,
    /// Processor status string.
    pub status: String,
}

/// Wire client for the payment processor.
pub trait PaymentGateway: Send + Sync {
    /// Creates the remote order.
    fn create_order<'a>(&'a self, order: &'a Order) -> BoxFuture<'a, Result<RemoteResource, GatewayError>>;

    /// Authorizes a payment for a remote order.
    fn create_payment<'a>(
        &'a self,
        order: &'a Order,
        remote_order_id: &'a str,
        delay_capture: bool,
    ) -> BoxFuture<'a, Result<RemoteResource, GatewayError>>;

    /// Captures a delayed payment.
    fn capture_payment<'a>(&'a self, remote_payment_id: &'a str) -> BoxFuture<'a, Result<RemoteResource, GatewayError>>;
}

/// A status change reported by the processor's webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStatusUpdate {
    /// Processor payment id.
    pub wirecard_payment_hash: String,
    /// Mapped local status.
    pub status: ChargeStatus,
    /// When the processor emitted the event.
    pub event_at: DateTime<Utc>,
}

/// What happened to a webhook notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Status and timestamp updated.
    Applied,
    /// Older than the last applied event, ignored.
    Stale,
    /// No transaction record for the payment id.
    UnknownPayment,
}

/// `true` when an event at `incoming` must be ignored given the last applied one.
#[must_use]
pub fn is_stale_notification(incoming: DateTime<Utc>, last_applied: Option<DateTime<Utc>>) -> bool {
    last_applied.is_some_and(|last| incoming < last)
}

/// Storage of processor transaction identifiers and charge status.
pub trait PaymentRecords: Send + Sync {
    /// Saves the remote ids of an order.
    fn persist_transaction_data<'a>(
        &'a self,
        order_id: i64,
        wirecard_order_hash: &'a str,
        wirecard_payment_hash: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Overwrites the charge status of an order.
    fn persist_charge_status(&self, order_id: i64, status: ChargeStatus) -> BoxFuture<'_, Result<(), StorageError>>;

    /// Applies a webhook status change atomically, skipping stale events
    /// (see [`is_stale_notification`]).
    fn apply_payment_notification<'a>(
        &'a self,
        update: &'a PaymentStatusUpdate,
    ) -> BoxFuture<'a, Result<NotificationOutcome, StorageError>>;
}

// ---------------------------------------------------------------------------
// Side channels
// ---------------------------------------------------------------------------

/// Mail delivery failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MailError {
    /// The provider refused the message.
    #[error("mail rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status
        status: u16,
        /// Response body
        body: String,
    },

    /// The provider could not be reached.
    #[error("mail transport error: {0}")]
    Transport(String),

    /// The local queue is closed or full.
    #[error("mail queue unavailable: {0}")]
    Queue(String),
}

/// Sends templated email, either directly or through a queue.
pub trait MailSender: Send + Sync {
    /// Send or enqueue a message.
    fn send(&self, request: MailRequest) -> BoxFuture<'_, Result<(), MailError>>;
}

/// An operator alert could not be delivered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("alert delivery failed: {0}")]
pub struct AlertError(pub String);

/// High-priority operational notifications.
pub trait AlertChannel: Send + Sync {
    /// Notify operators.
    fn send_high_priority<'a>(&'a self, message: &'a str) -> BoxFuture<'a, Result<(), AlertError>>;
}

/// Operator-visible error reporting.
pub trait ErrorTracker: Send + Sync {
    /// Record an error.
    fn capture_error(&self, error: &(dyn StdError + 'static));
    /// Record a message.
    fn capture_message(&self, message: &str);
}

/// The transcode job could not be enqueued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transcode queue unavailable: {0}")]
pub struct ScheduleError(pub String);

/// Enqueue-and-forget transcoding.
pub trait Transcoder: Send + Sync {
    /// Enqueue a transcode job for a shoutout.
    fn schedule(&self, shoutout_hash: Uuid) -> BoxFuture<'_, Result<(), ScheduleError>>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stale_only_when_strictly_older() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap();
        assert!(is_stale_notification(t1, Some(t2)));
        assert!(!is_stale_notification(t2, Some(t2)));
        assert!(!is_stale_notification(t2, Some(t1)));
        assert!(!is_stale_notification(t1, None));
    }
}
