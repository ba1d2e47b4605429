//! Read models owned by the catalogue side of the marketplace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A content creator as seen by the saga.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talent {
    /// Primary key.
    pub id: i64,
    /// Agency representing the talent, if any.
    pub agency_id: Option<i64>,
    /// Public profile page.
    pub profile_url: String,
    /// Display name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
}

/// Profit percentage for talents: custom per talent, or the single default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalentProfitPercentage {
    /// `None` for the default percentage.
    pub talent_id: Option<i64>,
    /// Fraction in `0..=1`, two decimals.
    pub value: Decimal,
}

/// Profit percentage configured for an agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyProfitPercentage {
    /// Agency.
    pub agency_id: i64,
    /// Fraction in `0..=1`, two decimals.
    pub value: Decimal,
}
