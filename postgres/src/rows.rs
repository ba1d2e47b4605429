//! Row decoding.

use shoutout_core::charge::{Buyer, Charge, ChargeStatus, CreditCard, PaymentMethod};
use shoutout_core::order::{Order, OrderDetails, VideoIsFor};
use shoutout_core::ports::TransactionData;
use shoutout_core::{Shoutout, StorageError, Talent};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::storage_error;

/// Order aggregate with charge, payer snapshots and optional shoutout.
pub(crate) const ORDER_SELECT: &str = r"
    SELECT o.id, o.hash_id, o.talent_id, o.video_is_for, o.is_from, o.is_to,
           o.instruction, o.email, o.is_public, o.created_at, o.expiration_datetime,
           c.id AS charge_id, c.amount_paid, c.payment_date, c.status,
           cc.fullname AS card_fullname, cc.birthdate AS card_birthdate,
           cc.tax_document AS card_tax_document, cc.phone_number AS card_phone_number,
           cc.area_code AS card_area_code, cc.credit_card_hash,
           b.fullname AS buyer_fullname, b.birthdate AS buyer_birthdate,
           b.tax_document AS buyer_tax_document, b.phone_number AS buyer_phone_number,
           b.area_code AS buyer_area_code,
           s.hash_id AS shoutout_hash, s.talent_id AS shoutout_talent_id, s.video_file
    FROM orders o
    JOIN charges c ON c.order_id = o.id
    JOIN credit_cards cc ON cc.charge_id = c.id
    JOIN buyers b ON b.charge_id = c.id
    LEFT JOIN shoutouts s ON s.order_id = o.id
";

fn buyer(row: &PgRow, prefix: &str, charge_id: i64) -> Result<Buyer, sqlx::Error> {
    Ok(Buyer {
        charge_id: Some(charge_id),
        fullname: row.try_get(format!("{prefix}_fullname").as_str())?,
        birthdate: row.try_get(format!("{prefix}_birthdate").as_str())?,
        tax_document: row.try_get(format!("{prefix}_tax_document").as_str())?,
        phone_number: row.try_get(format!("{prefix}_phone_number").as_str())?,
        area_code: row.try_get(format!("{prefix}_area_code").as_str())?,
    })
}

pub(crate) fn order(row: &PgRow) -> Result<Order, StorageError> {
    decode_order(row).map_err(storage_error)
}

fn decode_order(row: &PgRow) -> Result<Order, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    let charge_id: i64 = row.try_get("charge_id")?;
    let raw_status: String = row.try_get("status")?;
    let raw_video_is_for: String = row.try_get("video_is_for")?;

    let status = raw_status
        .parse::<ChargeStatus>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;
    let video_is_for = VideoIsFor::parse(&raw_video_is_for)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown recipient kind {raw_video_is_for}").into()))?;

    let charge = Charge {
        id: Some(charge_id),
        order_id: Some(id),
        amount_paid: row.try_get("amount_paid")?,
        payment_date: row.try_get("payment_date")?,
        payment_method: PaymentMethod::CreditCard,
        status,
        funding_instrument: CreditCard {
            charge_id: Some(charge_id),
            holder: buyer(row, "card", charge_id)?,
            credit_card_hash: row.try_get("credit_card_hash")?,
        },
        buyer: buyer(row, "buyer", charge_id)?,
    };

    let shoutout_hash: Option<Uuid> = row.try_get("shoutout_hash")?;
    let shoutout = match shoutout_hash {
        Some(hash_id) => Some(Shoutout::new(
            hash_id,
            id,
            row.try_get("shoutout_talent_id")?,
            row.try_get("video_file")?,
        )),
        None => None,
    };

    let details = OrderDetails {
        hash_id: row.try_get("hash_id")?,
        talent_id: row.try_get("talent_id")?,
        video_is_for,
        is_from: Some(row.try_get("is_from")?),
        is_to: row.try_get("is_to")?,
        instruction: row.try_get("instruction")?,
        email: row.try_get("email")?,
        is_public: row.try_get("is_public")?,
    };

    Ok(Order::restore(
        id,
        details,
        charge,
        shoutout,
        row.try_get("created_at")?,
        row.try_get("expiration_datetime")?,
    ))
}

pub(crate) fn talent(row: &PgRow) -> Result<Talent, sqlx::Error> {
    Ok(Talent {
        id: row.try_get("id")?,
        agency_id: row.try_get("agency_id")?,
        profile_url: row.try_get("profile_url")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
    })
}

pub(crate) fn shoutout(row: &PgRow) -> Result<Shoutout, sqlx::Error> {
    Ok(Shoutout::new(
        row.try_get("hash_id")?,
        row.try_get("order_id")?,
        row.try_get("talent_id")?,
        row.try_get("video_file")?,
    ))
}

pub(crate) fn transaction(row: &PgRow) -> Result<TransactionData, sqlx::Error> {
    Ok(TransactionData {
        order_id: row.try_get("order_id")?,
        order_hash: row.try_get("order_hash")?,
        wirecard_order_hash: row.try_get("wirecard_order_hash")?,
        wirecard_payment_hash: row.try_get("wirecard_payment_hash")?,
        payment_event_last_timestamp: row.try_get("payment_event_last_timestamp")?,
    })
}
