//! # Gala Testing
//!
//! Testing utilities and helpers for the gala reservation engine.
//!
//! This crate provides:
//! - Mock implementations of Environment traits and snapshot storage
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use gala_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(GalaReducer::new())
//!     .with_env(GalaEnvironment::new(Arc::new(test_clock())))
//!     .given_state(state)
//!     .when_action(GalaCommand::Subscribe { member_id })
//!     .then_state(|state| assert!(state.is_subscribed(member_id)))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use gala_core::environment::Clock;

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits and storage.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use gala_core::snapshot::{SnapshotError, SnapshotStore};
    use std::io;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use gala_testing::mocks::FixedClock;
    /// use gala_core::environment::Clock;
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

    /// In-memory snapshot slot with failure injection
    ///
    /// `fail_saves(true)` makes every following `save` return a storage error
    /// while keeping the previously saved bytes, mimicking a full disk.
    #[derive(Debug, Default)]
    pub struct InMemorySnapshotStore {
        bytes: Mutex<Option<Vec<u8>>>,
        failing: AtomicBool,
        saves: AtomicUsize,
    }

    impl InMemorySnapshotStore {
        /// Create an empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a store that already holds `bytes`
        #[must_use]
        pub fn with_bytes(bytes: Vec<u8>) -> Self {
            Self {
                bytes: Mutex::new(Some(bytes)),
                ..Self::default()
            }
        }

        /// Make subsequent saves fail (or succeed again)
        pub fn fail_saves(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Number of successful saves so far
        #[must_use]
        pub fn saves(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    impl SnapshotStore for InMemorySnapshotStore {
        fn load(&self) -> Result<Option<Vec<u8>>, SnapshotError> {
            let bytes = self
                .bytes
                .lock()
                .map_err(|_| SnapshotError::Storage(io::Error::other("snapshot lock poisoned")))?;
            Ok(bytes.clone())
        }

        fn save(&self, bytes: &[u8]) -> Result<(), SnapshotError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(SnapshotError::Storage(io::Error::other(
                    "injected snapshot write failure",
                )));
            }
            let mut slot = self
                .bytes
                .lock()
                .map_err(|_| SnapshotError::Storage(io::Error::other("snapshot lock poisoned")))?;
            *slot = Some(bytes.to_vec());
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, InMemorySnapshotStore, test_clock};
