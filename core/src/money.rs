//! Fixed-point currency helpers.
//!
//! All monetary values are [`Decimal`]s quantized to two places with banker's
//! rounding (round half to even). The same rule is applied to charge amounts and
//! profit splits so repeated computations never drift.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for currency amounts.
pub const CURRENCY_PLACES: u32 = 2;

/// Quantize an amount to two decimal places (round half to even).
#[must_use]
pub fn quantize(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(CURRENCY_PLACES, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(CURRENCY_PLACES);
    rounded
}

/// `price × percentage`, quantized.
#[must_use]
pub fn profit_share(price: Decimal, percentage: Decimal) -> Decimal {
    quantize(price * percentage)
}

/// Converts an amount to integer minor units (cents).
///
/// Returns `None` when the amount does not fit an `i64`.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
}
