//! The order aggregate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::charge::Charge;
use crate::error::DomainError;
use crate::messages::FulfillShoutoutRequestCommand;
use crate::shoutout::Shoutout;

/// Days a talent has to fulfill an order.
pub const EXPIRATION_DAYS: i64 = 5;

/// Margin subtracted from the expiration so customers never see an order
/// expire earlier than promised.
pub const SAFE_PERIOD_HOURS: i64 = 1;

/// Offset of the customer-facing timezone (São Paulo, UTC-3).
pub const SP_TIMEZONE_OFFSET_HOURS: i64 = 3;

/// Who the video is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoIsFor {
    /// A gift; `is_from` names the sender.
    SomeoneElse,
    /// The customer is the recipient.
    Myself,
}

impl VideoIsFor {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SomeoneElse => "someone_else",
            Self::Myself => "myself",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "someone_else" => Some(Self::SomeoneElse),
            "myself" => Some(Self::Myself),
            _ => None,
        }
    }
}

impl fmt::Display for VideoIsFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to find an order: by storage id or public hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderLookup {
    /// Numeric primary key.
    Id(i64),
    /// Public hash.
    Hash(Uuid),
}

impl fmt::Display for OrderLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Hash(hash) => write!(f, "{hash}"),
        }
    }
}

/// Customer-provided order fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    /// Public identifier.
    pub hash_id: Uuid,
    /// Talent asked to record the video.
    pub talent_id: i64,
    /// Recipient kind.
    pub video_is_for: VideoIsFor,
    /// Sender name, required for gifts.
    pub is_from: Option<String>,
    /// Recipient name.
    pub is_to: String,
    /// What the talent should say.
    pub instruction: String,
    /// Customer email.
    pub email: String,
    /// Whether the video may be shown on the talent's public page.
    pub is_public: bool,
}

/// A purchased shoutout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Assigned by storage.
    pub id: Option<i64>,
    /// Public identifier.
    pub hash_id: Uuid,
    /// Owning talent.
    pub talent_id: i64,
    /// Recipient kind.
    pub video_is_for: VideoIsFor,
    is_from: Option<String>,
    /// Recipient name.
    pub is_to: String,
    /// What the talent should say.
    pub instruction: String,
    /// Customer email.
    pub email: String,
    /// Whether the video may be shown publicly.
    pub is_public: bool,
    /// Payment attempt.
    pub charge: Charge,
    /// Fulfillment artifact, once uploaded.
    pub shoutout: Option<Shoutout>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Deadline for fulfillment.
    pub expiration_datetime: DateTime<Utc>,
}

impl Order {
    /// Creates a new order at `now`.
    ///
    /// # Errors
    ///
    /// [`DomainError::RequiredField`] when the video is a gift and no sender
    /// name was given.
    pub fn new(details: OrderDetails, charge: Charge, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let is_from = details.is_from.filter(|name| !name.is_empty());
        if details.video_is_for == VideoIsFor::SomeoneElse && is_from.is_none() {
            return Err(DomainError::RequiredField("is_from"));
        }
        Ok(Self {
            id: None,
            hash_id: details.hash_id,
            talent_id: details.talent_id,
            video_is_for: details.video_is_for,
            is_from,
            is_to: details.is_to,
            instruction: details.instruction,
            email: details.email,
            is_public: details.is_public,
            charge,
            shoutout: None,
            created_at: now,
            expiration_datetime: Self::expiration_for(now),
        })
    }

    /// Rebuilds a persisted order.
    #[must_use]
    pub fn restore(
        id: i64,
        details: OrderDetails,
        charge: Charge,
        shoutout: Option<Shoutout>,
        created_at: DateTime<Utc>,
        expiration_datetime: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            hash_id: details.hash_id,
            talent_id: details.talent_id,
            video_is_for: details.video_is_for,
            is_from: details.is_from.filter(|name| !name.is_empty()),
            is_to: details.is_to,
            instruction: details.instruction,
            email: details.email,
            is_public: details.is_public,
            charge,
            shoutout,
            created_at,
            expiration_datetime,
        }
    }

    /// Deadline for an order created at `created_at`.
    #[must_use]
    pub fn expiration_for(created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + Duration::days(EXPIRATION_DAYS) - Duration::hours(SAFE_PERIOD_HOURS)
    }

    /// Sender name. Falls back to the recipient when the customer bought it for themselves.
    #[must_use]
    pub fn is_from(&self) -> &str {
        self.is_from.as_deref().unwrap_or(&self.is_to)
    }

    /// Sender name exactly as the customer typed it.
    #[must_use]
    pub fn raw_is_from(&self) -> Option<&str> {
        self.is_from.as_deref()
    }

    /// Whether the deadline has passed.
    #[must_use]
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration_datetime
    }

    /// Checks the order may be fulfilled by the command's talent.
    ///
    /// Expiry is checked first, then ownership, then whether a shoutout exists.
    ///
    /// # Errors
    ///
    /// [`DomainError::OrderExpired`], [`DomainError::TalentPermission`] or
    /// [`DomainError::OrderHasShoutout`].
    pub fn validate_if_it_can_be_fulfilled(
        &self,
        command: &FulfillShoutoutRequestCommand,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.expired(now) {
            return Err(DomainError::OrderExpired);
        }
        if command.talent_id != self.talent_id {
            return Err(DomainError::TalentPermission);
        }
        if self.shoutout.is_some() {
            return Err(DomainError::OrderHasShoutout);
        }
        Ok(())
    }

    /// Details in their constructor shape, used by storage adapters.
    #[must_use]
    pub fn details(&self) -> OrderDetails {
        OrderDetails {
            hash_id: self.hash_id,
            talent_id: self.talent_id,
            video_is_for: self.video_is_for,
            is_from: self.is_from.clone(),
            is_to: self.is_to.clone(),
            instruction: self.instruction.clone(),
            email: self.email.clone(),
            is_public: self.is_public,
        }
    }
}
