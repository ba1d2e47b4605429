//! Ready-made domain values.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use shoutout_core::{
    Buyer, Charge, ChargeStatus, CreditCard, FulfillShoutoutRequestCommand, Order, OrderDetails,
    RequestShoutoutCommand, Talent, VideoIsFor,
};
use uuid::Uuid;

/// 2025-01-01 00:00:00 UTC, the time of [`crate::mocks::test_clock`].
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn birthdate() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 5, 17).unwrap_or_default()
}

/// A talent without agency.
#[must_use]
pub fn talent(id: i64) -> Talent {
    Talent {
        id,
        agency_id: None,
        profile_url: format!("https://viggio.com.br/talento/{id}"),
        full_name: format!("Talento {id}"),
        email: format!("talento{id}@example.com"),
    }
}

/// A talent represented by `agency_id`.
#[must_use]
pub fn agency_talent(id: i64, agency_id: i64) -> Talent {
    Talent {
        agency_id: Some(agency_id),
        ..talent(id)
    }
}

/// A valid gift request of R$ 150,00 for `talent_id`.
#[must_use]
pub fn request_shoutout_command(talent_id: i64) -> RequestShoutoutCommand {
    RequestShoutoutCommand {
        order_hash_id: Uuid::new_v4(),
        order_video_is_for: VideoIsFor::SomeoneElse,
        order_is_from: Some("Maria".into()),
        order_is_to: "Joana".into(),
        order_instruction: "Deseje feliz aniversário".into(),
        order_email: "maria@example.com".into(),
        order_talent_id: talent_id,
        order_amount_paid: Decimal::new(15_000, 2),
        order_is_public: true,
        customer_fullname: "Maria Silva".into(),
        customer_birthdate: birthdate(),
        customer_phone_number: "912345678".into(),
        customer_area_code: "11".into(),
        customer_tax_document: "12345678901".into(),
        credit_card_owner_fullname: "Maria Silva".into(),
        credit_card_owner_birthdate: birthdate(),
        credit_card_owner_phone_number: "912345678".into(),
        credit_card_owner_area_code: "11".into(),
        credit_card_owner_tax_document: "12345678901".into(),
        credit_card_hash: "encrypted-card-hash".into(),
    }
}

/// An unsaved order for `talent_id`, created at [`epoch`].
#[must_use]
pub fn order(talent_id: i64) -> Order {
    let buyer = Buyer::new(
        "Maria Silva".into(),
        birthdate(),
        "12345678901".into(),
        "912345678".into(),
        "11".into(),
    );
    let card = CreditCard::new(buyer.clone(), "encrypted-card-hash".into());
    let charge = Charge::new(Decimal::new(15_000, 2), epoch(), ChargeStatus::Processing, card, buyer);
    let details = OrderDetails {
        hash_id: Uuid::new_v4(),
        talent_id,
        video_is_for: VideoIsFor::Myself,
        is_from: None,
        is_to: "Maria".into(),
        instruction: "Manda um alô".into(),
        email: "maria@example.com".into(),
        is_public: false,
    };
    let mut order = Order::restore(0, details, charge, None, epoch(), Order::expiration_for(epoch()));
    order.id = None;
    order
}

/// Fulfill command for an order.
#[must_use]
pub fn fulfill_command(order_hash: Uuid, talent_id: i64) -> FulfillShoutoutRequestCommand {
    FulfillShoutoutRequestCommand {
        shoutout_hash: Uuid::new_v4(),
        order_hash,
        talent_id,
        video_file: format!("orders/talent-{talent_id}/order-{order_hash}/raw.mov"),
    }
}
