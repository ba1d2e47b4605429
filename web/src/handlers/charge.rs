//! `POST /charge`.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shoutout_core::{DomainError, RequestShoutoutCommand, VideoIsFor};
use shoutout_runtime::charge_order_bus;
use uuid::Uuid;

use crate::WebResult;
use crate::error::AppError;
use crate::state::AppState;

/// Checkout form.
///
/// Card holder fields are only read when `not_my_cc` is set; otherwise the
/// customer is the holder.
#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeOrderRequest {
    pub order_video_is_for: VideoIsFor,
    #[serde(default)]
    pub order_is_from: Option<String>,
    pub order_is_to: String,
    pub order_instruction: String,
    pub order_email: String,
    pub order_talent_id: i64,
    pub order_amount_paid: Decimal,
    #[serde(default)]
    pub order_is_not_public: bool,
    pub customer_fullname: String,
    pub customer_birthdate: NaiveDate,
    pub customer_phone_number: String,
    pub customer_area_code: String,
    pub customer_tax_document: String,
    #[serde(default)]
    pub credit_card_owner_fullname: Option<String>,
    #[serde(default)]
    pub credit_card_owner_birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub credit_card_owner_phone_number: Option<String>,
    #[serde(default)]
    pub credit_card_owner_area_code: Option<String>,
    #[serde(default)]
    pub credit_card_owner_tax_document: Option<String>,
    pub credit_card_hash: String,
    #[serde(default)]
    pub not_my_cc: bool,
}

impl ChargeOrderRequest {
    /// Builds the command for a new order hash.
    ///
    /// # Errors
    ///
    /// `RequiredField` when someone else's card is used without its holder
    /// details.
    pub fn into_command(self, order_hash_id: Uuid) -> Result<RequestShoutoutCommand, DomainError> {
        let holder = if self.not_my_cc {
            CardHolder {
                fullname: required(self.credit_card_owner_fullname, "credit_card_owner_fullname")?,
                birthdate: required(self.credit_card_owner_birthdate, "credit_card_owner_birthdate")?,
                phone_number: required(self.credit_card_owner_phone_number, "credit_card_owner_phone_number")?,
                area_code: required(self.credit_card_owner_area_code, "credit_card_owner_area_code")?,
                tax_document: required(self.credit_card_owner_tax_document, "credit_card_owner_tax_document")?,
            }
        } else {
            CardHolder {
                fullname: self
                    .credit_card_owner_fullname
                    .unwrap_or_else(|| self.customer_fullname.clone()),
                birthdate: self.customer_birthdate,
                phone_number: self.customer_phone_number.clone(),
                area_code: self.customer_area_code.clone(),
                tax_document: self.customer_tax_document.clone(),
            }
        };

        Ok(RequestShoutoutCommand {
            order_hash_id,
            order_video_is_for: self.order_video_is_for,
            order_is_from: self.order_is_from,
            order_is_to: self.order_is_to,
            order_instruction: self.order_instruction,
            order_email: self.order_email,
            order_talent_id: self.order_talent_id,
            order_amount_paid: self.order_amount_paid,
            order_is_public: !self.order_is_not_public,
            customer_fullname: self.customer_fullname,
            customer_birthdate: self.customer_birthdate,
            customer_phone_number: self.customer_phone_number,
            customer_area_code: self.customer_area_code,
            customer_tax_document: self.customer_tax_document,
            credit_card_owner_fullname: holder.fullname,
            credit_card_owner_birthdate: holder.birthdate,
            credit_card_owner_phone_number: holder.phone_number,
            credit_card_owner_area_code: holder.area_code,
            credit_card_owner_tax_document: holder.tax_document,
            credit_card_hash: self.credit_card_hash,
        })
    }
}

struct CardHolder {
    fullname: String,
    birthdate: NaiveDate,
    phone_number: String,
    area_code: String,
    tax_document: String,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, DomainError> {
    value.ok_or(DomainError::RequiredField(field))
}

/// Created order.
#[derive(Debug, Serialize)]
pub struct ChargeOrderResponse {
    /// Public hash of the order
    pub order_hash: Uuid,
}

/// Persists the order and charges the card.
///
/// # Errors
///
/// 400 for invalid input, 500 when persistence or the processor fails.
pub async fn charge_order(
    State(state): State<AppState>,
    payload: Result<Json<ChargeOrderRequest>, JsonRejection>,
) -> WebResult<(StatusCode, Json<ChargeOrderResponse>)> {
    let Json(request) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let order_hash = Uuid::new_v4();
    let command = request.into_command(order_hash)?;

    charge_order_bus(&state.env).handle(command.into()).await?;

    tracing::info!(%order_hash, "order charged");
    Ok((StatusCode::CREATED, Json(ChargeOrderResponse { order_hash })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(extra: serde_json::Value) -> ChargeOrderRequest {
        let mut body = json!({
            "order_video_is_for": "someone_else",
            "order_is_from": "Maria",
            "order_is_to": "Joana",
            "order_instruction": "Deseje feliz aniversário",
            "order_email": "maria@example.com",
            "order_talent_id": 7,
            "order_amount_paid": "150.00",
            "order_is_not_public": true,
            "customer_fullname": "Maria Silva",
            "customer_birthdate": "1990-04-01",
            "customer_phone_number": "912345678",
            "customer_area_code": "11",
            "customer_tax_document": "12345678901",
            "credit_card_hash": "encrypted-card-hash",
        });
        if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            body.extend(extra.clone());
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn own_card_copies_the_customer_into_the_holder() {
        let command = request(json!({})).into_command(Uuid::nil()).unwrap();

        assert_eq!(command.credit_card_owner_fullname, "Maria Silva");
        assert_eq!(command.credit_card_owner_tax_document, "12345678901");
        assert_eq!(command.credit_card_owner_area_code, "11");
        assert!(!command.order_is_public);
    }

    #[test]
    fn someone_elses_card_keeps_the_holder() {
        let command = request(json!({
            "not_my_cc": true,
            "credit_card_owner_fullname": "Ana Souza",
            "credit_card_owner_birthdate": "1970-01-01",
            "credit_card_owner_phone_number": "999999999",
            "credit_card_owner_area_code": "21",
            "credit_card_owner_tax_document": "98765432100",
        }))
        .into_command(Uuid::nil())
        .unwrap();

        assert_eq!(command.credit_card_owner_fullname, "Ana Souza");
        assert_eq!(command.credit_card_owner_area_code, "21");
        assert_eq!(command.customer_fullname, "Maria Silva");
    }

    #[test]
    fn someone_elses_card_needs_holder_details() {
        let err = request(json!({ "not_my_cc": true, "credit_card_owner_fullname": "Ana" }))
            .into_command(Uuid::nil())
            .unwrap_err();

        assert_eq!(err, DomainError::RequiredField("credit_card_owner_birthdate"));
    }
}
