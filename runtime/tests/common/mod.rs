#![allow(dead_code)]

use rust_decimal_macros::dec;
use shoutout_core::SiteConfig;
use shoutout_runtime::ShoutoutEnvironment;
use shoutout_testing::gateway::FakePaymentGateway;
use shoutout_testing::mocks::{FixedClock, test_clock};
use shoutout_testing::recorders::{RecordingAlerts, RecordingErrorTracker, RecordingMailSender, RecordingTranscoder};
use shoutout_testing::store::InMemoryStore;
use std::sync::Arc;

pub struct Harness {
    pub store: InMemoryStore,
    pub gateway: Arc<FakePaymentGateway>,
    pub mail: Arc<RecordingMailSender>,
    pub alerts: Arc<RecordingAlerts>,
    pub tracker: Arc<RecordingErrorTracker>,
    pub transcoder: Arc<RecordingTranscoder>,
    pub clock: Arc<FixedClock>,
    pub env: ShoutoutEnvironment,
}

impl Harness {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        store.set_default_talent_profit_percentage(dec!(0.75));
        let gateway = Arc::new(FakePaymentGateway::default());
        let mail = Arc::new(RecordingMailSender::new());
        let alerts = Arc::new(RecordingAlerts::new());
        let tracker = Arc::new(RecordingErrorTracker::new());
        let transcoder = Arc::new(RecordingTranscoder::new());
        let clock = Arc::new(test_clock());
        let env = ShoutoutEnvironment {
            orders: Arc::new(store.clone()),
            talents: Arc::new(store.clone()),
            percentages: Arc::new(store.clone()),
            units_of_work: Arc::new(store.clone()),
            payment_records: Arc::new(store.clone()),
            payment_gateway: gateway.clone(),
            mail_sender: mail.clone(),
            alerts: alerts.clone(),
            error_tracker: tracker.clone(),
            transcoder: transcoder.clone(),
            clock: clock.clone(),
            site: SiteConfig::new("https://viggio.com.br/", "contato@viggio.com.br", "staff@viggio.com.br"),
        };
        Self {
            store,
            gateway,
            mail,
            alerts,
            tracker,
            transcoder,
            clock,
            env,
        }
    }
}
