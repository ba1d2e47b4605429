//! Bounded retries for background jobs.
//!
//! Failures are split into transient ones, retried after a delay, and fatal
//! ones, returned at once. The caller decides which is which.
//!
//! # Example
//!
//! ```rust
//! use shoutout_runtime::retry::{RetryPolicy, retry_transient};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let policy = RetryPolicy::builder()
//!     .max_retries(10)
//!     .initial_delay(Duration::from_millis(10))
//!     .build();
//!
//! let result = retry_transient(
//!     &policy,
//!     || async { Ok::<_, String>(42) },
//!     |err: &String| err.contains("timeout"),
//! )
//! .await;
//! assert_eq!(result.ok(), Some(42));
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// How many times, and how long apart, a job is retried.
///
/// # Default Values
///
/// - `max_retries`: 3
/// - `initial_delay`: 100ms
/// - `max_delay`: 30 seconds
/// - `multiplier`: 2.0
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for any delay.
    pub max_delay: Duration,
    /// Growth factor between retries; `1.0` keeps the delay constant.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    /// Create a new policy builder.
    #[must_use]
    pub const fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }

    /// Same delay before every retry.
    #[must_use]
    pub const fn constant(max_retries: usize, delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1.0,
        }
    }

    /// Delay before retry number `retry` (zero based), capped at `max_delay`.
    #[must_use]
    pub fn delay_for_retry(&self, retry: usize) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let scaled = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !scaled.is_finite() || scaled >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(scaled.max(0.0))
    }
}

/// Builder for [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    max_retries: usize,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl RetryPolicyBuilder {
    /// Set maximum number of retries.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set delay before the first retry.
    #[must_use]
    pub const fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay.
    #[must_use]
    pub const fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set growth factor.
    #[must_use]
    pub const fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Build the [`RetryPolicy`].
    #[must_use]
    pub const fn build(self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: self.initial_delay,
            max_delay: self.max_delay,
            multiplier: self.multiplier,
        }
    }
}

/// Why a retried operation gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// A non-retryable error; `attempts` includes the failing one.
    Fatal {
        /// Attempts made
        attempts: usize,
        /// The error
        error: E,
    },
    /// Every attempt failed with a transient error.
    Exhausted {
        /// Attempts made
        attempts: usize,
        /// Last error
        error: E,
    },
}

impl<E> RetryError<E> {
    /// The underlying error.
    pub fn into_inner(self) -> E {
        match self {
            Self::Fatal { error, .. } | Self::Exhausted { error, .. } => error,
        }
    }

    /// Attempts made before giving up.
    pub const fn attempts(&self) -> usize {
        match self {
            Self::Fatal { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal { attempts, error } => write!(f, "fatal error after {attempts} attempt(s): {error}"),
            Self::Exhausted { attempts, error } => write!(f, "gave up after {attempts} attempt(s): {error}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fatal { error, .. } | Self::Exhausted { error, .. } => Some(error),
        }
    }
}

/// Runs `operation` until it succeeds, fails fatally, or runs out of retries.
///
/// # Errors
///
/// [`RetryError::Fatal`] as soon as `is_transient` rejects an error,
/// [`RetryError::Exhausted`] after `max_retries` retries.
pub async fn retry_transient<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    mut operation: F,
    is_transient: P,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut retry = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if retry > 0 {
                    tracing::info!(retries = retry, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if !is_transient(&error) => {
                tracing::error!(attempt = retry + 1, error = %error, "non-retryable failure");
                return Err(RetryError::Fatal {
                    attempts: retry + 1,
                    error,
                });
            }
            Err(error) if retry >= policy.max_retries => {
                tracing::error!(attempt = retry + 1, error = %error, "retries exhausted");
                return Err(RetryError::Exhausted {
                    attempts: retry + 1,
                    error,
                });
            }
            Err(error) => {
                let delay = policy.delay_for_retry(retry);
                tracing::warn!(
                    attempt = retry + 1,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "transient failure, retrying"
                );
                sleep(delay).await;
                retry += 1;
            }
        }
    }
}
