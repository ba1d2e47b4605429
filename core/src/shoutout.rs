//! Fulfillment artifacts: the video and the revenue split records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The finished video attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shoutout {
    /// Public identifier.
    pub hash_id: Uuid,
    /// Owning order (1:1).
    pub order_id: i64,
    /// Talent who recorded it.
    pub talent_id: i64,
    /// Storage key of the video file.
    pub video_file: String,
}

impl Shoutout {
    /// Creates a shoutout record.
    #[must_use]
    pub const fn new(hash_id: Uuid, order_id: i64, talent_id: i64, video_file: String) -> Self {
        Self {
            hash_id,
            order_id,
            talent_id,
            video_file,
        }
    }

    /// Public page of the video, e.g. `https://site/v/<hash>`.
    #[must_use]
    pub fn absolute_url(&self, site_url: &str) -> String {
        format!("{site_url}v/{}", self.hash_id)
    }
}

/// Talent's share of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalentProfit {
    /// Payee.
    pub talent_id: i64,
    /// Source order.
    pub order_id: i64,
    /// Amount the customer paid.
    pub shoutout_price: Decimal,
    /// Percentage snapshotted at fulfillment time.
    pub profit_percentage: Decimal,
    /// `shoutout_price × profit_percentage`, two decimals.
    pub profit: Decimal,
    /// Whether the payout happened.
    pub paid: bool,
}

/// Agency's share of an order, present only when the talent has an agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyProfit {
    /// Payee.
    pub agency_id: i64,
    /// Source order.
    pub order_id: i64,
    /// Amount the customer paid.
    pub shoutout_price: Decimal,
    /// Percentage snapshotted at fulfillment time.
    pub profit_percentage: Decimal,
    /// `shoutout_price × profit_percentage`, two decimals.
    pub profit: Decimal,
    /// Whether the payout happened.
    pub paid: bool,
}
