//! Error tracking backed by `tracing`.

use shoutout_core::ports::ErrorTracker;
use std::error::Error as StdError;

/// Reports errors as structured `tracing` events tagged `tracker = true`.
///
/// A log pipeline can route those events to an incident tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorTracker;

impl ErrorTracker for TracingErrorTracker {
    fn capture_error(&self, error: &(dyn StdError + 'static)) {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        tracing::error!(tracker = true, error = %error, causes = ?causes, "captured error");
    }

    fn capture_message(&self, message: &str) {
        tracing::error!(tracker = true, message, "captured message");
    }
}
