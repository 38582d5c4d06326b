//! # Optimistic Testing
//!
//! Testing utilities for reconcilers and the reducers built around them.
//!
//! This crate provides:
//! - Deterministic clocks
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertions over effects and derived views
//! - proptest strategies for record ids and action tags
//!
//! ## Example
//!
//! ```ignore
//! use optimistic_testing::{settle, test_clock};
//!
//! #[tokio::test]
//! async fn create_shows_provisional_row() {
//!     let store = sections_store(test_clock());
//!
//!     let mut handle = store.send(ResourceAction::Create { params }).await?;
//!     assert_eq!(store.state(|s| s.reconciler.pending_count()).await, 1);
//!
//!     settle(&mut handle).await;
//!     assert!(store.state(|s| s.reconciler.is_settled()).await);
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use optimistic_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use optimistic_testing::mocks::FixedClock;
    /// use optimistic_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2);
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

    /// Clock that moves forward by a fixed step on every reading
    ///
    /// Useful when a test needs `created_at` and `updated_at` to differ.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl SteppingClock {
        /// Starts at `start`, advancing `step` after each call to `now`
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = match self.next.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let current = *next;
            *next = current + self.step;
            current
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

/// Test helpers and utilities
pub mod helpers {
    use optimistic_runtime::EffectHandle;
    use std::time::Duration;

    /// How long [`settle`] waits before failing the test
    pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Waits until every effect started by one `send`, including the effects
    /// of the actions they fed back, has finished
    ///
    /// # Panics
    ///
    /// Panics if the effects are still running after [`SETTLE_TIMEOUT`].
    #[allow(clippy::panic)]
    pub async fn settle(handle: &mut EffectHandle) {
        if handle.wait_with_timeout(SETTLE_TIMEOUT).await.is_err() {
            panic!("effects did not settle within {SETTLE_TIMEOUT:?}: {handle:?}");
        }
    }

    /// Installs a `tracing` subscriber that writes through the test harness
    ///
    /// Safe to call from every test; only the first call installs anything.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use optimistic_core::{DELETE_ID, OPTIMISTIC_ID, RecordId};
    use proptest::collection::{btree_set, vec};
    use proptest::prelude::*;

    /// Persisted-looking ids, never a sentinel
    pub fn record_id() -> impl Strategy<Value = RecordId> {
        "[a-z0-9]{1,12}"
            .prop_filter("sentinel ids are reserved", |s| {
                s != OPTIMISTIC_ID && s != DELETE_ID
            })
            .prop_map(RecordId::new)
    }

    /// Between `0` and `max` distinct persisted ids, in arbitrary order
    pub fn distinct_ids(max: usize) -> impl Strategy<Value = Vec<RecordId>> {
        btree_set(record_id(), 0..=max)
            .prop_map(|ids| ids.into_iter().collect::<Vec<_>>())
            .prop_shuffle()
    }

    /// Tags that are none of `create`, `update` or `delete`
    pub fn unknown_tag() -> impl Strategy<Value = String> {
        "[a-zA-Z_]{0,16}".prop_filter("known tags are decoded", |tag| {
            !matches!(tag.as_str(), "create" | "update" | "delete")
        })
    }

    /// Short human-readable names
    pub fn name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z ]{0,23}"
    }

    /// Several names at once
    pub fn names(max: usize) -> impl Strategy<Value = Vec<String>> {
        vec(name(), 0..=max)
    }
}

// Re-export commonly used items
pub use helpers::{init_test_tracing, settle};
pub use mocks::{FixedClock, SteppingClock, test_clock};
