//! HTTP-level tests of the mail carrier, the dispatcher and the alert channels.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use shoutout_core::emails::{MailRequest, MailTemplate};
use shoutout_core::ports::{AlertChannel, AlertError, ErrorTracker, MailError, MailSender};
use shoutout_post_office::{
    LogAlertChannel, MailgunCarrier, MailgunConfig, TelegramAlertChannel, TelegramConfig,
    spawn_mail_dispatcher,
};
use wiremock::matchers::{basic_auth, body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> MailRequest {
    MailRequest {
        from_email: "contato@viggio.com.br".into(),
        to_email: "Maria <maria@example.com>".into(),
        template: MailTemplate::new(
            "order-detail",
            "Seu pedido foi enviado para Talento 1",
            &json!({"talent_name": "Talento 1"}),
        ),
    }
}

fn mailgun(server: &MockServer) -> MailgunCarrier {
    MailgunCarrier::new(MailgunConfig {
        api_url: server.uri(),
        api_key: "key-123".into(),
    })
}

#[derive(Default)]
struct Errors(Mutex<Vec<String>>);

impl ErrorTracker for Errors {
    fn capture_error(&self, error: &(dyn std::error::Error + 'static)) {
        self.0.lock().unwrap().push(error.to_string());
    }

    fn capture_message(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_owned());
    }
}

#[tokio::test]
async fn mailgun_posts_the_template_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(basic_auth("api", "key-123"))
        .and(body_string_contains("template=order-detail"))
        .and(body_string_contains("v%3Atalent_name=Talento+1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Queued. Thank you."})))
        .expect(1)
        .mount(&server)
        .await;

    mailgun(&server).send(request()).await.unwrap();
}

#[tokio::test]
async fn mailgun_rejection_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(400).set_body_string("template not found"))
        .mount(&server)
        .await;

    let error = mailgun(&server).send(request()).await.unwrap_err();
    assert_eq!(
        error,
        MailError::Rejected {
            status: 400,
            body: "template not found".into()
        }
    );
}

#[tokio::test]
async fn dispatcher_delivers_and_reports_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    let errors = Arc::new(Errors::default());

    let (sender, handle) = spawn_mail_dispatcher(Arc::new(mailgun(&server)), errors.clone(), 8);
    sender.send(request()).await.unwrap();
    sender.send(request()).await.unwrap();
    drop(sender);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("dispatcher did not stop")
        .unwrap();

    assert_eq!(errors.0.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn full_queue_is_an_error() {
    struct Stuck;
    impl MailSender for Stuck {
        fn send(&self, _request: MailRequest) -> shoutout_core::BoxFuture<'_, Result<(), MailError>> {
            Box::pin(std::future::pending())
        }
    }

    let (sender, _handle) = spawn_mail_dispatcher(Arc::new(Stuck), Arc::new(Errors::default()), 1);
    // The dispatcher takes the first message and blocks on it; the second
    // fills the queue.
    sender.send(request()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    sender.send(request()).await.unwrap();

    assert!(matches!(sender.send(request()).await, Err(MailError::Queue(_))));
}

#[tokio::test]
async fn telegram_alert_posts_to_the_group() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .and(body_json(json!({"chat_id": "-100", "text": "Falha ao capturar pagamento"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    let channel = TelegramAlertChannel::new(TelegramConfig {
        api_url: server.uri(),
        ..TelegramConfig::new("TOKEN", "-100")
    });

    channel.send_high_priority("Falha ao capturar pagamento").await.unwrap();
}

#[tokio::test]
async fn telegram_non_200_is_an_alert_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("bot was kicked"))
        .mount(&server)
        .await;
    let channel = TelegramAlertChannel::new(TelegramConfig {
        api_url: server.uri(),
        ..TelegramConfig::new("TOKEN", "-100")
    });

    let AlertError(message) = channel.send_high_priority("alert").await.unwrap_err();
    assert!(message.contains("403"));
    assert!(message.contains("bot was kicked"));
}

#[tokio::test]
async fn log_channel_never_fails() {
    assert!(LogAlertChannel.send_high_priority("alert").await.is_ok());
}
