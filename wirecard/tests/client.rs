//! Wire-level tests of the Wirecard client against a mock server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use serde_json::json;
use shoutout_core::GatewayError;
use shoutout_core::ports::PaymentGateway;
use shoutout_testing::fixtures;
use shoutout_wirecard::{WirecardClient, WirecardConfig};
use wiremock::matchers::{basic_auth, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> WirecardClient {
    WirecardClient::new(WirecardConfig {
        base_url: server.uri(),
        token: "TOKEN".into(),
        api_key: "KEY".into(),
        webhook_token: "hook".into(),
        statement_descriptor: "viggio.com.br".into(),
        timeout: Duration::from_millis(300),
    })
    .unwrap()
}

#[tokio::test]
async fn create_order_authenticates_and_sends_cents() {
    let server = MockServer::start().await;
    let order = fixtures::order(1);
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(basic_auth("TOKEN", "KEY"))
        .and(body_partial_json(json!({
            "ownId": order.hash_id.to_string(),
            "items": [{"price": 15000, "quantity": 1}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "ORD-X1", "status": "CREATED"})))
        .expect(1)
        .mount(&server)
        .await;

    let remote = client(&server).create_order(&order).await.unwrap();
    assert_eq!(remote.id, "ORD-X1");
    assert_eq!(remote.status, "CREATED");
}

#[tokio::test]
async fn create_order_requires_created_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "ORD-X1", "status": "WAITING"})))
        .mount(&server)
        .await;

    let error = client(&server).create_order(&fixtures::order(1)).await.unwrap_err();
    assert!(matches!(error, GatewayError::CreateOrder(_)));
}

#[tokio::test]
async fn create_order_rejects_non_201() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid customer"))
        .mount(&server)
        .await;

    let error = client(&server).create_order(&fixtures::order(1)).await.unwrap_err();
    assert_eq!(error, GatewayError::CreateOrder("400 - invalid customer".into()));
}

#[tokio::test]
async fn create_payment_sends_delayed_capture() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders/ORD-X1/payments"))
        .and(body_partial_json(json!({"delayCapture": true, "installmentCount": 1})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "PAY-X1", "status": "IN_ANALYSIS"})))
        .expect(1)
        .mount(&server)
        .await;

    let remote = client(&server)
        .create_payment(&fixtures::order(1), "ORD-X1", true)
        .await
        .unwrap();
    assert_eq!(remote.id, "PAY-X1");
}

#[tokio::test]
async fn create_payment_rejects_cancelled_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders/ORD-X1/payments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "PAY-X1", "status": "CANCELLED"})))
        .mount(&server)
        .await;

    let error = client(&server)
        .create_payment(&fixtures::order(1), "ORD-X1", true)
        .await
        .unwrap_err();
    assert!(matches!(error, GatewayError::CreatePayment(_)));
}

#[tokio::test]
async fn capture_requires_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments/PAY-OK/capture"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "PAY-OK", "status": "AUTHORIZED"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/payments/PAY-KO/capture"))
        .respond_with(ResponseTemplate::new(409).set_body_string("not pre-authorized"))
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.capture_payment("PAY-OK").await.unwrap().status, "AUTHORIZED");
    assert!(matches!(
        client.capture_payment("PAY-KO").await.unwrap_err(),
        GatewayError::CapturePayment(_)
    ));
}

#[tokio::test]
async fn slow_processor_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": "ORD-X1", "status": "CREATED"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let gateway: &dyn PaymentGateway = &client(&server);
    let error = gateway.create_order(&fixtures::order(1)).await.unwrap_err();
    assert_eq!(error, GatewayError::Timeout);
}
