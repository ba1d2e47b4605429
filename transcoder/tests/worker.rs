//! Transcode jobs against in-memory storage and a scripted encoder.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shoutout_core::ports::Transcoder;
use shoutout_core::{BoxFuture, Shoutout, ShoutoutSuccessfullyTranscodedEvent};
use shoutout_runtime::MessageBus;
use shoutout_testing::fixtures;
use shoutout_testing::recorders::RecordingErrorTracker;
use shoutout_testing::store::InMemoryStore;
use shoutout_transcoder::{
    BusFactory, TranscodeError, TranscodeWorker, TranscoderConfig, VideoEncoder, VideoStorage,
    spawn_workers, transcode_channel,
};
use uuid::Uuid;

const RAW_KEY: &str = "orders/talent-1/order-x/viggio-para-maria.mov";
const MP4_KEY: &str = "orders/talent-1/order-x/mp4/viggio-para-maria.mp4";

#[derive(Default)]
struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    fn with(key: &str) -> Self {
        let storage = Self::default();
        storage.objects.lock().unwrap().insert(key.to_owned(), b"raw".to_vec());
        storage
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl VideoStorage for MemoryStorage {
    fn fetch<'a>(&'a self, key: &'a str, destination: &'a Path) -> BoxFuture<'a, Result<(), TranscodeError>> {
        Box::pin(async move {
            let bytes = self
                .objects
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| TranscodeError::Storage(format!("{key} missing")))?;
            tokio::fs::write(destination, bytes).await?;
            Ok(())
        })
    }

    fn store<'a>(&'a self, source: &'a Path, key: &'a str) -> BoxFuture<'a, Result<(), TranscodeError>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(source).await?;
            self.objects.lock().unwrap().insert(key.to_owned(), bytes);
            Ok(())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), TranscodeError>> {
        Box::pin(async move {
            self.objects.lock().unwrap().remove(key);
            Ok(())
        })
    }
}

/// Fails the first `failures` encodes, optionally sleeping on each one.
#[derive(Default)]
struct ScriptedEncoder {
    failures: usize,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl VideoEncoder for ScriptedEncoder {
    fn encode<'a>(&'a self, _input: &'a Path, output: &'a Path) -> BoxFuture<'a, Result<(), TranscodeError>> {
        Box::pin(async move {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if call < self.failures {
                return Err(TranscodeError::Encoding("moov atom not found".into()));
            }
            tokio::fs::write(output, b"mp4").await?;
            Ok(())
        })
    }

    fn validate<'a>(&'a self, _output: &'a Path) -> BoxFuture<'a, Result<(), TranscodeError>> {
        Box::pin(async { Ok(()) })
    }
}

struct Setup {
    store: InMemoryStore,
    storage: Arc<MemoryStorage>,
    tracker: Arc<RecordingErrorTracker>,
    published: Arc<Mutex<Vec<i64>>>,
    shoutout: Shoutout,
}

impl Setup {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let mut order = fixtures::order(1);
        order.shoutout = Some(Shoutout::new(Uuid::new_v4(), 0, 1, RAW_KEY.into()));
        let order = store.seed_order(order);
        Self {
            store,
            storage: Arc::new(MemoryStorage::with(RAW_KEY)),
            tracker: Arc::new(RecordingErrorTracker::new()),
            published: Arc::new(Mutex::new(Vec::new())),
            shoutout: Shoutout {
                order_id: order.id.unwrap(),
                ..order.shoutout.unwrap()
            },
        }
    }

    fn bus_factory(&self) -> BusFactory {
        let published = Arc::clone(&self.published);
        Arc::new(move || {
            let mut bus = MessageBus::new();
            let published = Arc::clone(&published);
            bus.register(move |event: ShoutoutSuccessfullyTranscodedEvent| {
                published.lock().unwrap().push(event.order_id);
                async { Ok(Vec::new()) }
            });
            bus
        })
    }

    fn worker(&self, encoder: ScriptedEncoder, max_retries: usize, time_limit: Duration) -> TranscodeWorker {
        TranscodeWorker::new(
            Arc::new(self.store.clone()),
            self.storage.clone(),
            Arc::new(encoder),
            self.tracker.clone(),
            self.bus_factory(),
            TranscoderConfig {
                scratch_dir: std::env::temp_dir().join(format!("shoutout-transcoder-test-{}", Uuid::new_v4())),
                max_retries,
                retry_delay: Duration::from_millis(1),
                time_limit,
                ..TranscoderConfig::default()
            },
        )
    }

    fn published(&self) -> Vec<i64> {
        self.published.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn successful_job_replaces_the_video_and_publishes() {
    let s = Setup::new();
    let worker = s.worker(ScriptedEncoder::default(), 10, Duration::from_secs(5));

    worker.run(s.shoutout.hash_id).await;

    assert_eq!(s.store.shoutouts()[0].video_file, MP4_KEY);
    assert_eq!(s.storage.keys(), vec![MP4_KEY.to_owned()]);
    assert_eq!(s.published(), vec![s.shoutout.order_id]);
    assert!(s.tracker.captured().is_empty());
}

#[tokio::test]
async fn encoding_failures_are_retried() {
    let s = Setup::new();
    let worker = s.worker(
        ScriptedEncoder {
            failures: 2,
            ..ScriptedEncoder::default()
        },
        10,
        Duration::from_secs(5),
    );

    worker.run(s.shoutout.hash_id).await;

    assert_eq!(s.store.shoutouts()[0].video_file, MP4_KEY);
    assert_eq!(s.published(), vec![s.shoutout.order_id]);
}

#[tokio::test]
async fn gives_up_after_the_retry_budget() {
    let s = Setup::new();
    let encoder = ScriptedEncoder {
        failures: usize::MAX,
        ..ScriptedEncoder::default()
    };
    let worker = s.worker(encoder, 2, Duration::from_secs(5));

    worker.run(s.shoutout.hash_id).await;

    assert_eq!(s.store.shoutouts()[0].video_file, RAW_KEY);
    assert_eq!(s.storage.keys(), vec![RAW_KEY.to_owned()]);
    assert!(s.published().is_empty());
    let captured = s.tracker.captured();
    assert_eq!(captured.len(), 1);
    assert!(captured[0].contains("gave up after 3 attempt(s)"));
}

#[tokio::test]
async fn slow_encodes_hit_the_time_limit() {
    let s = Setup::new();
    let encoder = ScriptedEncoder {
        delay: Some(Duration::from_millis(500)),
        ..ScriptedEncoder::default()
    };
    let worker = s.worker(encoder, 0, Duration::from_millis(20));

    worker.run(s.shoutout.hash_id).await;

    assert!(s.published().is_empty());
    assert!(s.tracker.captured()[0].contains("time limit"));
}

#[tokio::test]
async fn unknown_shoutout_fails_without_retrying() {
    let s = Setup::new();
    let worker = s.worker(ScriptedEncoder::default(), 10, Duration::from_secs(5));

    worker.run(Uuid::new_v4()).await;

    let captured = s.tracker.captured();
    assert_eq!(captured.len(), 1);
    assert!(captured[0].contains("fatal error after 1 attempt(s)"));
    assert!(s.published().is_empty());
}

#[tokio::test]
async fn pool_drains_scheduled_jobs() {
    let s = Setup::new();
    let worker = Arc::new(s.worker(ScriptedEncoder::default(), 0, Duration::from_secs(5)));
    let (queue, jobs) = transcode_channel(4);
    let handles = spawn_workers(jobs, worker, 2);

    queue.schedule(s.shoutout.hash_id).await.unwrap();
    drop(queue);
    for handle in handles {
        tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    }

    assert_eq!(s.published(), vec![s.shoutout.order_id]);
}

#[tokio::test]
async fn full_queue_refuses_new_jobs() {
    let (queue, _jobs) = transcode_channel(1);

    queue.schedule(Uuid::new_v4()).await.unwrap();

    assert!(queue.schedule(Uuid::new_v4()).await.is_err());
}
