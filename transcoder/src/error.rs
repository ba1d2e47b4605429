//! Transcoding failures.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Why a transcode attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    /// ffmpeg failed or produced an invalid file.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The attempt ran longer than allowed.
    #[error("transcoding exceeded the {0:?} time limit")]
    TimeLimitExceeded(Duration),

    /// No shoutout with that hash.
    #[error("shoutout {0} not found")]
    ShoutoutNotFound(Uuid),

    /// Reading or writing video files failed.
    #[error("video storage error: {0}")]
    Storage(String),

    /// The shoutout record could not be read or updated.
    #[error("database error: {0}")]
    Database(String),
}

impl TranscodeError {
    /// Whether another attempt may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Encoding(_) | Self::TimeLimitExceeded(_))
    }
}

impl From<std::io::Error> for TranscodeError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_encoding_and_timeouts_are_retried() {
        assert!(TranscodeError::Encoding("x".into()).is_transient());
        assert!(TranscodeError::TimeLimitExceeded(Duration::from_secs(1)).is_transient());
        assert!(!TranscodeError::ShoutoutNotFound(Uuid::nil()).is_transient());
        assert!(!TranscodeError::Storage("x".into()).is_transient());
        assert!(!TranscodeError::Database("x".into()).is_transient());
    }
}
