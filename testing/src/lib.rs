//! # Shoutout Testing
//!
//! Test doubles for the shoutout saga.
//!
//! - [`store::InMemoryStore`]: every storage port, with atomic commits and
//!   failure injection
//! - [`gateway::FakePaymentGateway`]: rejects amounts above a threshold
//! - [`recorders`]: mail, alert, error-tracker and transcoder doubles that
//!   remember what they were given
//! - [`fixtures`]: ready-made commands and talents
//! - [`mocks::FixedClock`]: controllable time

pub mod fixtures;
pub mod gateway;
pub mod recorders;
pub mod store;

/// Mock implementations of environment traits.
pub mod mocks {
    use chrono::{DateTime, Duration, Utc};
    use shoutout_core::environment::Clock;
    use std::sync::Mutex;

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub struct FixedClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time: Mutex::new(time) }
        }

        /// Moves time forward.
        pub fn advance(&self, by: Duration) {
            if let Ok(mut time) = self.time.lock() {
                *time += by;
            }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time.lock().map_or_else(|poisoned| *poisoned.into_inner(), |time| *time)
        }
    }

    /// Fixed clock at 2025-01-01 00:00:00 UTC.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_735_689_600))
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::{FixedClock, test_clock};
    use chrono::Duration;
    use shoutout_core::environment::Clock;

    #[test]
    fn fixed_clock_only_moves_when_advanced() {
        let clock: FixedClock = test_clock();
        let start = clock.now();
        assert_eq!(start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(clock.now(), start);
        clock.advance(Duration::days(6));
        assert_eq!(clock.now() - start, Duration::days(6));
    }
}
