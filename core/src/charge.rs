//! Charge aggregate members: the payment attempt and the payer snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money;

/// Lifecycle of a charge.
///
/// Not a strictly ordered machine: webhook notifications may move it in any
/// direction the payment processor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    /// Persisted, gateway not called yet.
    NotProcessed,
    /// Remote order and payment created, awaiting confirmation.
    Processing,
    /// Authorized, capture pending.
    PreAuthorized,
    /// Funds captured.
    Paid,
    /// Gateway rejected or could not be reached.
    Failed,
    /// Cancelled, refunded or reversed remotely.
    Cancelled,
}

impl ChargeStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotProcessed => "not_processed",
            Self::Processing => "processing",
            Self::PreAuthorized => "pre_authorized",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_processed" => Ok(Self::NotProcessed),
            "processing" => Ok(Self::Processing),
            "pre_authorized" => Ok(Self::PreAuthorized),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown charge status: {other}")),
        }
    }
}

/// How the customer paid. Only credit cards are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Tokenized credit card.
    #[default]
    CreditCard,
}

impl PaymentMethod {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
        }
    }
}

/// Identity of whoever pays, captured at charge time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    /// Assigned by storage.
    pub charge_id: Option<i64>,
    /// Full name.
    pub fullname: String,
    /// Date of birth.
    pub birthdate: NaiveDate,
    /// CPF number.
    pub tax_document: String,
    /// Phone number without area code.
    pub phone_number: String,
    /// Two digit area code.
    pub area_code: String,
}

impl Buyer {
    /// Snapshot a buyer identity.
    #[must_use]
    pub const fn new(
        fullname: String,
        birthdate: NaiveDate,
        tax_document: String,
        phone_number: String,
        area_code: String,
    ) -> Self {
        Self {
            charge_id: None,
            fullname,
            birthdate,
            tax_document,
            phone_number,
            area_code,
        }
    }
}

/// Card holder identity plus the processor's opaque card token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    /// Assigned by storage.
    pub charge_id: Option<i64>,
    /// Holder identity.
    pub holder: Buyer,
    /// Encrypted card hash produced client-side by the processor's SDK.
    pub credit_card_hash: String,
}

impl CreditCard {
    /// Snapshot a funding instrument.
    #[must_use]
    pub const fn new(holder: Buyer, credit_card_hash: String) -> Self {
        Self {
            charge_id: None,
            holder,
            credit_card_hash,
        }
    }
}

/// Payment attempt attached 1:1 to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    /// Assigned by storage.
    pub id: Option<i64>,
    /// Set when the owning order is persisted.
    pub order_id: Option<i64>,
    /// Amount in BRL, always two decimal places.
    pub amount_paid: Decimal,
    /// When the customer placed the payment.
    pub payment_date: DateTime<Utc>,
    /// Always [`PaymentMethod::CreditCard`].
    pub payment_method: PaymentMethod,
    /// Current status.
    pub status: ChargeStatus,
    /// Card used for the payment.
    pub funding_instrument: CreditCard,
    /// Customer identity.
    pub buyer: Buyer,
}

impl Charge {
    /// Builds a new charge, quantizing the amount.
    #[must_use]
    pub fn new(
        amount_paid: Decimal,
        payment_date: DateTime<Utc>,
        status: ChargeStatus,
        funding_instrument: CreditCard,
        buyer: Buyer,
    ) -> Self {
        Self {
            id: None,
            order_id: None,
            amount_paid: money::quantize(amount_paid),
            payment_date,
            payment_method: PaymentMethod::CreditCard,
            status,
            funding_instrument,
            buyer,
        }
    }

    /// Marks the charge as awaiting processor confirmation.
    pub const fn set_processing_status(&mut self) {
        self.status = ChargeStatus::Processing;
    }

    /// Marks the charge as rejected.
    pub const fn set_failed_status(&mut self) {
        self.status = ChargeStatus::Failed;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn buyer() -> Buyer {
        Buyer::new(
            "Maria Silva".into(),
            NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
            "12345678901".into(),
            "912345678".into(),
            "11".into(),
        )
    }

    #[test]
    fn amount_is_quantized_on_construction() {
        let card = CreditCard::new(buyer(), "hash".into());
        let charge = Charge::new(dec!(150), Utc::now(), ChargeStatus::NotProcessed, card, buyer());
        assert_eq!(charge.amount_paid.to_string(), "150.00");
        assert_eq!(charge.payment_method, PaymentMethod::CreditCard);
    }

    #[test]
    fn status_transitions() {
        let card = CreditCard::new(buyer(), "hash".into());
        let mut charge =
            Charge::new(dec!(10), Utc::now(), ChargeStatus::NotProcessed, card, buyer());
        charge.set_processing_status();
        assert_eq!(charge.status, ChargeStatus::Processing);
        charge.set_failed_status();
        assert_eq!(charge.status, ChargeStatus::Failed);
    }

    #[test]
    fn status_text_round_trips() {
        for status in [
            ChargeStatus::NotProcessed,
            ChargeStatus::Processing,
            ChargeStatus::PreAuthorized,
            ChargeStatus::Paid,
            ChargeStatus::Failed,
            ChargeStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<ChargeStatus>(), Ok(status));
        }
        assert!("settled".parse::<ChargeStatus>().is_err());
    }
}
