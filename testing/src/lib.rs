//! # Todo Store Testing
//!
//! Testing utilities and helpers for the todo store.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//! - Test log output via `tracing-subscriber`
//!
//! ## Example
//!
//! ```ignore
//! use todo_store_testing::{ReducerTest, assertions, test_clock};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(TodoEnvironment::mock(Arc::new(test_clock())))
//!     .given_state(TodoState::new())
//!     .when_action(TodoAction::AddTodo { content: "buy milk".into() })
//!     .then_state(|state| assert_eq!(state.count(), 1))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use todo_store_core::environment::Clock;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_store_testing::mocks::FixedClock;
    /// use todo_store_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to
    ///
    /// Clones share the same time, so a test can keep one handle and hand
    /// another to the environment.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Create a manual clock starting at `time`
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward
        ///
        /// # Panics
        ///
        /// Panics if the inner mutex is poisoned.
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable in tests
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap();
            *time += by;
        }
    }

    impl Clock for ManualClock {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable in tests
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap()
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Route `tracing` output through the test harness
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Honors `RUST_LOG`, defaulting to `warn`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().timestamp_millis(), 1_735_689_600_000);
    }

    #[test]
    fn test_manual_clock_shares_time() {
        let clock = ManualClock::new(test_clock().now());
        let handle = clock.clone();

        handle.advance(chrono::Duration::milliseconds(5));

        assert_eq!(
            clock.now().timestamp_millis(),
            test_clock().now().timestamp_millis() + 5
        );
    }

    #[test]
    fn test_init_tracing_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}
