#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use axum_test::TestServer;
use rust_decimal_macros::dec;
use shoutout_core::SiteConfig;
use shoutout_runtime::ShoutoutEnvironment;
use shoutout_testing::gateway::FakePaymentGateway;
use shoutout_testing::mocks::test_clock;
use shoutout_testing::recorders::{RecordingAlerts, RecordingErrorTracker, RecordingMailSender, RecordingTranscoder};
use shoutout_testing::store::InMemoryStore;
use shoutout_web::{AppState, StaticReadiness, build_router};

pub const WEBHOOK_TOKEN: &str = "webhook-secret";

pub struct App {
    pub server: TestServer,
    pub store: InMemoryStore,
    pub gateway: Arc<FakePaymentGateway>,
    pub mail: Arc<RecordingMailSender>,
    pub tracker: Arc<RecordingErrorTracker>,
    pub transcoder: Arc<RecordingTranscoder>,
}

impl App {
    pub fn new() -> Self {
        Self::with_readiness(true)
    }

    pub fn with_readiness(ready: bool) -> Self {
        let store = InMemoryStore::new();
        store.set_default_talent_profit_percentage(dec!(0.75));
        let gateway = Arc::new(FakePaymentGateway::default());
        let mail = Arc::new(RecordingMailSender::new());
        let tracker = Arc::new(RecordingErrorTracker::new());
        let transcoder = Arc::new(RecordingTranscoder::new());
        let env = ShoutoutEnvironment {
            orders: Arc::new(store.clone()),
            talents: Arc::new(store.clone()),
            percentages: Arc::new(store.clone()),
            units_of_work: Arc::new(store.clone()),
            payment_records: Arc::new(store.clone()),
            payment_gateway: gateway.clone(),
            mail_sender: mail.clone(),
            alerts: Arc::new(RecordingAlerts::new()),
            error_tracker: tracker.clone(),
            transcoder: transcoder.clone(),
            clock: Arc::new(test_clock()),
            site: SiteConfig::new("https://viggio.com.br/", "contato@viggio.com.br", "staff@viggio.com.br"),
        };
        let state = AppState::new(env, WEBHOOK_TOKEN, Arc::new(StaticReadiness(ready)));
        Self {
            server: TestServer::new(build_router(state)).unwrap(),
            store,
            gateway,
            mail,
            tracker,
            transcoder,
        }
    }
}
