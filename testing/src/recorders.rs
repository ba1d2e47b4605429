//! Doubles that record what they were asked to do.

use shoutout_core::emails::MailRequest;
use shoutout_core::ports::{AlertChannel, AlertError, ErrorTracker, MailError, MailSender, ScheduleError, Transcoder};
use shoutout_core::BoxFuture;
use std::error::Error as StdError;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

fn snapshot<T: Clone>(items: &Mutex<Vec<T>>) -> Vec<T> {
    items.lock().map(|v| v.clone()).unwrap_or_default()
}

fn push<T>(items: &Mutex<Vec<T>>, item: T) {
    if let Ok(mut v) = items.lock() {
        v.push(item);
    }
}

/// Keeps every mail; can refuse one template.
#[derive(Debug, Default)]
pub struct RecordingMailSender {
    sent: Mutex<Vec<MailRequest>>,
    failing_template: Mutex<Option<String>>,
}

impl RecordingMailSender {
    /// New recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses messages using `template`.
    pub fn fail_template(&self, template: &str) {
        if let Ok(mut failing) = self.failing_template.lock() {
            *failing = Some(template.to_owned());
        }
    }

    /// Messages accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<MailRequest> {
        snapshot(&self.sent)
    }

    /// Template names accepted so far, in order.
    #[must_use]
    pub fn templates(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.template.name).collect()
    }
}

impl MailSender for RecordingMailSender {
    fn send(&self, request: MailRequest) -> BoxFuture<'_, Result<(), MailError>> {
        Box::pin(async move {
            let refused = self
                .failing_template
                .lock()
                .map(|f| f.as_deref() == Some(request.template.name.as_str()))
                .unwrap_or(false);
            if refused {
                return Err(MailError::Rejected {
                    status: 500,
                    body: "refused by test".into(),
                });
            }
            push(&self.sent, request);
            Ok(())
        })
    }
}

/// Keeps every alert; can be made to fail.
#[derive(Debug, Default)]
pub struct RecordingAlerts {
    sent: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl RecordingAlerts {
    /// New recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes delivery fail.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Alerts delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        snapshot(&self.sent)
    }
}

impl AlertChannel for RecordingAlerts {
    fn send_high_priority<'a>(&'a self, message: &'a str) -> BoxFuture<'a, Result<(), AlertError>> {
        Box::pin(async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(AlertError("alert channel down".into()));
            }
            push(&self.sent, message.to_owned());
            Ok(())
        })
    }
}

/// Keeps the text of every captured error or message.
#[derive(Debug, Default)]
pub struct RecordingErrorTracker {
    captured: Mutex<Vec<String>>,
}

impl RecordingErrorTracker {
    /// New recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything captured so far.
    #[must_use]
    pub fn captured(&self) -> Vec<String> {
        snapshot(&self.captured)
    }
}

impl ErrorTracker for RecordingErrorTracker {
    fn capture_error(&self, error: &(dyn StdError + 'static)) {
        push(&self.captured, error.to_string());
    }

    fn capture_message(&self, message: &str) {
        push(&self.captured, message.to_owned());
    }
}

/// Keeps scheduled shoutout hashes.
#[derive(Debug, Default)]
pub struct RecordingTranscoder {
    scheduled: Mutex<Vec<Uuid>>,
}

impl RecordingTranscoder {
    /// New recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes scheduled so far.
    #[must_use]
    pub fn scheduled(&self) -> Vec<Uuid> {
        snapshot(&self.scheduled)
    }
}

impl Transcoder for RecordingTranscoder {
    fn schedule(&self, shoutout_hash: Uuid) -> BoxFuture<'_, Result<(), ScheduleError>> {
        Box::pin(async move {
            push(&self.scheduled, shoutout_hash);
            Ok(())
        })
    }
}
