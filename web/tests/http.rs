//! The HTTP contract of the saga, over in-memory adapters.

#![allow(clippy::unwrap_used)]

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
use common::{App, WEBHOOK_TOKEN};
use serde_json::{Value, json};
use shoutout_core::ChargeStatus;
use shoutout_testing::fixtures;
use uuid::Uuid;

fn checkout(talent_id: i64, amount: &str) -> Value {
    json!({
        "order_video_is_for": "someone_else",
        "order_is_from": "Maria",
        "order_is_to": "Joana",
        "order_instruction": "Deseje feliz aniversário",
        "order_email": "maria@example.com",
        "order_talent_id": talent_id,
        "order_amount_paid": amount,
        "order_is_not_public": false,
        "customer_fullname": "Maria Silva",
        "customer_birthdate": "1990-04-01",
        "customer_phone_number": "912345678",
        "customer_area_code": "11",
        "customer_tax_document": "12345678901",
        "credit_card_hash": "encrypted-card-hash",
        "not_my_cc": false,
    })
}

fn talent_header(talent_id: i64) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(shoutout_web::TALENT_ID_HEADER),
        HeaderValue::from_str(&talent_id.to_string()).unwrap(),
    )
}

async fn charge(app: &App, talent_id: i64) -> Uuid {
    let response = app.server.post("/charge").json(&checkout(talent_id, "150.00")).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    body["order_hash"].as_str().unwrap().parse().unwrap()
}

async fn fulfill(app: &App, order_hash: Uuid, talent_id: i64) -> axum_test::TestResponse {
    let (name, value) = talent_header(talent_id);
    app.server
        .post("/fulfill")
        .add_header(name, value)
        .json(&json!({ "order_hash": order_hash, "video_file": "orders/talent-7/viggio-para-joana.mov" }))
        .await
}

#[tokio::test]
async fn charge_creates_and_charges_the_order() {
    let app = App::new();
    app.store.add_talent(fixtures::talent(7));

    let order_hash = charge(&app, 7).await;

    assert_eq!(app.store.order_count(), 1);
    assert_eq!(app.store.charge_status(order_hash), Some(ChargeStatus::Processing));
    assert_eq!(app.gateway.created_orders(), vec![order_hash.to_string()]);
    assert_eq!(app.mail.sent().len(), 2);
}

#[tokio::test]
async fn rejected_payment_is_a_server_error() {
    let app = App::new();
    app.store.add_talent(fixtures::talent(7));

    let response = app.server.post("/charge").json(&checkout(7, "10000.01")).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "An issue happened while processing payment.");
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
}

#[tokio::test]
async fn gift_without_sender_is_a_bad_request() {
    let app = App::new();
    app.store.add_talent(fixtures::talent(7));
    let mut body = checkout(7, "150.00");
    body["order_is_from"] = Value::Null;

    let response = app.server.post("/charge").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.order_count(), 0);
}

#[tokio::test]
async fn malformed_checkout_is_a_bad_request() {
    let app = App::new();

    let response = app.server.post("/charge").json(&json!({ "order_talent_id": 7 })).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn fulfill_records_the_shoutout_and_schedules_transcoding() {
    let app = App::new();
    app.store.add_talent(fixtures::talent(7));
    let order_hash = charge(&app, 7).await;

    let response = fulfill(&app, order_hash, 7).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    let shoutout_hash: Uuid = body["shoutout_hash"].as_str().unwrap().parse().unwrap();
    assert_eq!(app.store.shoutouts()[0].hash_id, shoutout_hash);
    assert_eq!(app.store.talent_profits().len(), 1);
    assert_eq!(app.transcoder.scheduled(), vec![shoutout_hash]);
    assert_eq!(app.gateway.captured().len(), 1);
}

#[tokio::test]
async fn fulfill_needs_a_talent() {
    let app = App::new();

    let response = app
        .server
        .post("/fulfill")
        .json(&json!({ "order_hash": Uuid::new_v4(), "video_file": "a.mov" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn fulfill_by_another_talent_is_refused() {
    let app = App::new();
    app.store.add_talent(fixtures::talent(7));
    let order_hash = charge(&app, 7).await;

    let response = fulfill(&app, order_hash, 8).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Order belongs to another Talent.");
    assert!(app.store.shoutouts().is_empty());
}

#[tokio::test]
async fn second_fulfill_is_refused() {
    let app = App::new();
    app.store.add_talent(fixtures::talent(7));
    let order_hash = charge(&app, 7).await;
    assert_eq!(fulfill(&app, order_hash, 7).await.status_code(), StatusCode::CREATED);

    let response = fulfill(&app, order_hash, 7).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Order already has a shoutout attached.");
    assert_eq!(app.store.shoutouts().len(), 1);
}

#[tokio::test]
async fn fulfill_of_unknown_order_is_not_found() {
    let app = App::new();

    let response = fulfill(&app, Uuid::new_v4(), 7).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

fn authorized_webhook(payment_id: &str, status: &str) -> Value {
    json!({
        "event": format!("PAYMENT.{status}"),
        "resource": {"payment": {"id": payment_id, "status": status, "updatedAt": "2025-01-02T10:00:00.000-03"}}
    })
}

#[tokio::test]
async fn webhook_applies_authorized_payments() {
    let app = App::new();
    app.store.add_talent(fixtures::talent(7));
    let order_hash = charge(&app, 7).await;
    let payment_id = app.store.transaction(order_hash).unwrap().wirecard_payment_hash;

    let response = app
        .server
        .post("/webhook/payment")
        .add_header(AUTHORIZATION, HeaderValue::from_static(WEBHOOK_TOKEN))
        .json(&authorized_webhook(&payment_id, "AUTHORIZED"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.store.charge_status(order_hash), Some(ChargeStatus::Paid));
}

#[tokio::test]
async fn unauthorized_webhook_is_acknowledged_and_reported() {
    let app = App::new();
    app.store.add_talent(fixtures::talent(7));
    let order_hash = charge(&app, 7).await;
    let payment_id = app.store.transaction(order_hash).unwrap().wirecard_payment_hash;

    let response = app
        .server
        .post("/webhook/payment")
        .add_header(AUTHORIZATION, HeaderValue::from_static("wrong"))
        .json(&authorized_webhook(&payment_id, "AUTHORIZED"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.store.charge_status(order_hash), Some(ChargeStatus::Processing));
    let captured = app.tracker.captured();
    assert_eq!(captured.len(), 1);
    assert!(captured[0].starts_with("UNAUTHORIZED REQUEST"));
}

#[tokio::test]
async fn webhook_for_unknown_payment_is_acknowledged() {
    let app = App::new();

    let response = app
        .server
        .post("/webhook/payment")
        .add_header(AUTHORIZATION, HeaderValue::from_static(WEBHOOK_TOKEN))
        .json(&authorized_webhook("PAY-UNKNOWN", "AUTHORIZED"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.tracker.captured().len(), 1);
}

#[tokio::test]
async fn malformed_webhook_is_acknowledged_and_reported() {
    let app = App::new();

    let response = app
        .server
        .post("/webhook/payment")
        .add_header(AUTHORIZATION, HeaderValue::from_static(WEBHOOK_TOKEN))
        .text("not json")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.tracker.captured().len(), 1);
}

#[tokio::test]
async fn health_reports_database_readiness() {
    let ready = App::new();
    let response = ready.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
    assert_eq!(ready.server.get("/ready").await.status_code(), StatusCode::OK);

    let down = App::with_readiness(false);
    assert_eq!(down.server.get("/health").await.status_code(), StatusCode::OK);
    assert_eq!(down.server.get("/ready").await.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}
