//! Request and response bodies of the Wirecard v2 API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shoutout_core::charge::Buyer;
use shoutout_core::{GatewayError, Order, money};

/// Product name sent on every order item.
pub const PRODUCT: &str = "viggio";
/// Item category accepted by the processor for shoutouts.
pub const CATEGORY: &str = "ARTS_AND_ENTERTAINMENT";
/// Settlement currency.
pub const CURRENCY: &str = "BRL";
/// Country calling code of every phone number.
pub const COUNTRY_CODE: &str = "55";
/// Tax document kind of every buyer.
pub const TAX_DOCUMENT_TYPE: &str = "CPF";

/// `POST /orders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub own_id: String,
    pub amount: Amount,
    pub items: Vec<Item>,
    pub customer: Customer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Amount {
    pub currency: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub product: &'static str,
    pub quantity: u32,
    pub category: &'static str,
    /// Minor units.
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub own_id: u64,
    pub fullname: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub tax_document: TaxDocument,
    pub phone: Phone,
    pub shipping_address: ShippingAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxDocument {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    pub country_code: &'static str,
    pub area_code: String,
    pub number: String,
}

/// The processor refuses orders without a shipping address, so a fixed one
/// is sent for a product that is never shipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub city: &'static str,
    pub district: &'static str,
    pub street: &'static str,
    pub street_number: &'static str,
    pub zip_code: &'static str,
    pub state: &'static str,
    pub country: &'static str,
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self {
            city: "São Paulo",
            district: "Centro Histórico de São Paulo",
            street: "Praça da Sé",
            street_number: "68",
            zip_code: "01001001",
            state: "SP",
            country: "BRA",
        }
    }
}

/// `POST /orders/{id}/payments`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub statement_descriptor: String,
    pub installment_count: u32,
    pub delay_capture: bool,
    pub funding_instrument: FundingInstrument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingInstrument {
    pub method: &'static str,
    pub credit_card: CreditCard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditCard {
    pub hash: String,
    pub store: bool,
    pub holder: Holder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holder {
    pub fullname: String,
    pub birthdate: NaiveDate,
    pub tax_document: TaxDocument,
    pub phone: Phone,
}

/// `{id, status}` returned by every endpoint we call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceResponse {
    pub id: String,
    pub status: String,
}

/// Lower 48 bits of the hash, sent as the customer's own id. The processor
/// requires the field but never uses it.
#[must_use]
pub fn customer_own_id(hash: Uuid) -> u64 {
    hash.as_bytes()[10..]
        .iter()
        .fold(0_u64, |node, byte| (node << 8) | u64::from(*byte))
}

fn tax_document(buyer: &Buyer) -> TaxDocument {
    TaxDocument {
        kind: TAX_DOCUMENT_TYPE,
        number: buyer.tax_document.clone(),
    }
}

fn phone(buyer: &Buyer) -> Phone {
    Phone {
        country_code: COUNTRY_CODE,
        area_code: buyer.area_code.clone(),
        number: buyer.phone_number.clone(),
    }
}

impl CreateOrderRequest {
    /// Builds the order body.
    ///
    /// # Errors
    ///
    /// [`GatewayError::CreateOrder`] when the amount does not fit in minor units.
    pub fn from_order(order: &Order) -> Result<Self, GatewayError> {
        let price = money::to_minor_units(order.charge.amount_paid).ok_or_else(|| {
            GatewayError::CreateOrder(format!("amount out of range: {}", order.charge.amount_paid))
        })?;
        let buyer = &order.charge.buyer;

        Ok(Self {
            own_id: order.hash_id.to_string(),
            amount: Amount { currency: CURRENCY },
            items: vec![Item {
                product: PRODUCT,
                quantity: 1,
                category: CATEGORY,
                price,
            }],
            customer: Customer {
                own_id: customer_own_id(order.hash_id),
                fullname: buyer.fullname.clone(),
                email: order.email.clone(),
                birth_date: buyer.birthdate,
                tax_document: tax_document(buyer),
                phone: phone(buyer),
                shipping_address: ShippingAddress::default(),
            },
        })
    }
}

impl CreatePaymentRequest {
    /// Builds a single-installment credit card payment.
    #[must_use]
    pub fn from_order(order: &Order, statement_descriptor: &str, delay_capture: bool) -> Self {
        let card = &order.charge.funding_instrument;
        Self {
            statement_descriptor: statement_descriptor.to_owned(),
            installment_count: 1,
            delay_capture,
            funding_instrument: FundingInstrument {
                method: "CREDIT_CARD",
                credit_card: CreditCard {
                    hash: card.credit_card_hash.clone(),
                    store: false,
                    holder: Holder {
                        fullname: card.holder.fullname.clone(),
                        birthdate: card.holder.birthdate,
                        tax_document: tax_document(&card.holder),
                        phone: phone(&card.holder),
                    },
                },
            },
        }
    }
}
