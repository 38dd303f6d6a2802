//! # Gala Runtime
//!
//! Runtime implementation for the gala reservation engine.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state behind a single lock, runs the reducer, executes effects
//! - **`FileSnapshotStore`**: Durable snapshot slot on the local filesystem
//! - **Metrics**: Counter names and descriptions recorded by the Store
//!
//! ## Example
//!
//! ```ignore
//! use gala_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment)
//!     .with_snapshots(Arc::new(FileSnapshotStore::new("gala.snapshot")));
//!
//! // Send an action; published events come back on success
//! let events = store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field)?;
//! ```

use gala_core::{effect::Effect, event::Event, reducer::Reducer};
use std::sync::{Arc, Mutex};

/// File-backed snapshot storage
pub mod file_store;

/// Metric names and descriptions
pub mod metrics;

pub use file_store::FileSnapshotStore;

/// Error types for the Store runtime
pub mod error {
    use gala_core::snapshot::SnapshotError;
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError<E>
    where
        E: std::error::Error + 'static,
    {
        /// The reducer rejected the action; state is unchanged
        ///
        /// This is an expected, recoverable outcome.
        #[error("Action rejected: {0}")]
        Rejected(#[source] E),

        /// The snapshot could not be written; the action was rolled back
        #[error("Snapshot write failed: {0}")]
        Persistence(#[from] SnapshotError),

        /// A previous holder of the state lock panicked
        #[error("Store state lock poisoned")]
        Poisoned,
    }

    impl<E> StoreError<E>
    where
        E: std::error::Error + 'static,
    {
        /// The business-rule rejection, if that is what this error is
        #[must_use]
        pub const fn rejection(&self) -> Option<&E> {
            match self {
                Self::Rejected(error) => Some(error),
                Self::Persistence(_) | Self::Poisoned => None,
            }
        }
    }
}

pub use error::StoreError;

/// The Store module - runtime coordinator for a reducer
pub mod store {
    use super::{Arc, Effect, Event, Mutex, Reducer, StoreError};
    use crate::metrics::{ACTIONS_REJECTED, ACTIONS_TOTAL, SNAPSHOTS_FAILED, SNAPSHOTS_WRITTEN};
    use gala_core::snapshot::{Snapshot, SnapshotStore, encode_snapshot};

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind a `Mutex`; every `send` is one transaction over the whole state)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (published events, snapshot writes)
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::new(
    ///     ReservationEngine::new(registry, layout, calendar, policy),
    ///     GalaReducer::new(),
    ///     GalaEnvironment::new(Arc::new(SystemClock)),
    /// );
    ///
    /// let events = store.send(GalaCommand::Subscribe { member_id })?;
    /// ```
    pub struct Store<R>
    where
        R: Reducer,
    {
        state: Mutex<R::State>,
        reducer: R,
        environment: R::Environment,
        snapshots: Option<Arc<dyn SnapshotStore>>,
    }

    impl<R> Store<R>
    where
        R: Reducer,
        R::State: Clone + Snapshot,
        R::Event: Event,
        R::Error: std::error::Error + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The store does not persist anything until a snapshot store is attached
        /// with [`Store::with_snapshots`].
        #[must_use]
        pub fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
            Self {
                state: Mutex::new(initial_state),
                reducer,
                environment,
                snapshots: None,
            }
        }

        /// Attach durable storage for `Effect::Persist`
        #[must_use]
        pub fn with_snapshots(mut self, snapshots: Arc<dyn SnapshotStore>) -> Self {
            self.snapshots = Some(snapshots);
            self
        }

        /// Send an action to the store
        ///
        /// Runs the reducer under the state lock, then executes the returned
        /// effects. Published events are returned in order. If a snapshot was
        /// requested and the write fails, the state is restored to its value
        /// before the action and no events are returned.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Rejected`]: the reducer refused the action
        /// - [`StoreError::Persistence`]: the snapshot write failed (action rolled back)
        /// - [`StoreError::Poisoned`]: the state lock was poisoned
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub fn send(&self, action: R::Action) -> Result<Vec<R::Event>, StoreError<R::Error>> {
            let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
            let before = self.snapshots.as_ref().map(|_| state.clone());

            let effects = match self.reducer.reduce(&mut state, action, &self.environment) {
                Ok(effects) => effects,
                Err(error) => {
                    ::metrics::counter!(ACTIONS_REJECTED).increment(1);
                    tracing::warn!(%error, "Action rejected");
                    return Err(StoreError::Rejected(error));
                }
            };

            let mut published = Vec::with_capacity(effects.len());
            let mut persist = false;
            for effect in effects {
                match effect {
                    Effect::Publish(event) => published.push(event),
                    Effect::Persist => persist = true,
                }
            }

            if persist {
                if let Err(error) = self.write_snapshot(&state) {
                    ::metrics::counter!(SNAPSHOTS_FAILED).increment(1);
                    tracing::error!(%error, "Snapshot write failed, rolling back action");
                    if let Some(before) = before {
                        *state = before;
                    }
                    return Err(StoreError::Persistence(error));
                }
            }

            for event in &published {
                ::metrics::counter!(ACTIONS_TOTAL, "event_type" => event.event_type()).increment(1);
                tracing::debug!(event_type = event.event_type(), "Action applied");
            }

            Ok(published)
        }

        /// Read from the current state
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Poisoned`] if the state lock was poisoned.
        pub fn state<F, T>(&self, f: F) -> Result<T, StoreError<R::Error>>
        where
            F: FnOnce(&R::State) -> T,
        {
            let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
            Ok(f(&state))
        }

        /// Write a snapshot of the current state immediately
        ///
        /// Used at first start so that a freshly initialized state is on disk
        /// before any action runs. Does nothing without a snapshot store.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Persistence`]: the write failed
        /// - [`StoreError::Poisoned`]: the state lock was poisoned
        pub fn snapshot_now(&self) -> Result<(), StoreError<R::Error>> {
            let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
            self.write_snapshot(&state)?;
            Ok(())
        }

        fn write_snapshot(
            &self,
            state: &R::State,
        ) -> Result<(), gala_core::snapshot::SnapshotError> {
            let Some(snapshots) = &self.snapshots else {
                return Ok(());
            };
            let bytes = encode_snapshot(state)?;
            snapshots.save(&bytes)?;
            ::metrics::counter!(SNAPSHOTS_WRITTEN).increment(1);
            Ok(())
        }
    }
}

pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gala_core::snapshot::{Snapshot, SnapshotError, SnapshotStore, decode_snapshot};
    use gala_core::{SmallVec, smallvec};
    use gala_testing::InMemorySnapshotStore;
    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq)]
    struct TestState {
        value: u32,
    }

    #[derive(Serialize, Deserialize)]
    struct TestRecord {
        value: u32,
    }

    impl Snapshot for TestState {
        const KIND: &'static str = "test";
        const SCHEMA_VERSION: u32 = 1;
        type Record = TestRecord;

        fn to_record(&self) -> TestRecord {
            TestRecord { value: self.value }
        }

        fn from_record(record: TestRecord) -> Result<Self, SnapshotError> {
            Ok(Self {
                value: record.value,
            })
        }
    }

    #[derive(Debug, Clone)]
    enum TestAction {
        Increment,
        Decrement,
        Peek,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Changed(u32),
        Peeked(u32),
    }

    impl Event for TestEvent {
        fn event_type(&self) -> &'static str {
            match self {
                Self::Changed(_) => "Changed.v1",
                Self::Peeked(_) => "Peeked.v1",
            }
        }
    }

    #[derive(Debug, Error)]
    enum TestError {
        #[error("value is already zero")]
        Underflow,
    }

    struct TestEnv;

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Event = TestEvent;
        type Environment = TestEnv;
        type Error = TestError;

        fn reduce(
            &self,
            state: &mut TestState,
            action: TestAction,
            _env: &TestEnv,
        ) -> Result<SmallVec<[Effect<TestEvent>; 4]>, TestError> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    Ok(smallvec![Effect::Publish(TestEvent::Changed(state.value)), Effect::Persist])
                }
                TestAction::Decrement => {
                    if state.value == 0 {
                        return Err(TestError::Underflow);
                    }
                    state.value -= 1;
                    Ok(smallvec![Effect::Publish(TestEvent::Changed(state.value)), Effect::Persist])
                }
                TestAction::Peek => Ok(smallvec![Effect::Publish(TestEvent::Peeked(state.value))]),
            }
        }
    }

    fn store_with(snapshots: &Arc<InMemorySnapshotStore>) -> Store<TestReducer> {
        Store::new(TestState { value: 0 }, TestReducer, TestEnv).with_snapshots(snapshots.clone())
    }

    #[test]
    fn send_returns_published_events() {
        let store = Store::new(TestState { value: 0 }, TestReducer, TestEnv);

        let events = store.send(TestAction::Increment).unwrap();

        assert_eq!(events, vec![TestEvent::Changed(1)]);
        assert_eq!(store.state(|s| s.value).unwrap(), 1);
    }

    #[test]
    fn rejection_leaves_state_and_disk_alone() {
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        let store = store_with(&snapshots);

        let err = store.send(TestAction::Decrement).unwrap_err();

        assert!(matches!(err.rejection(), Some(TestError::Underflow)));
        assert_eq!(store.state(|s| s.value).unwrap(), 0);
        assert_eq!(snapshots.saves(), 0);
    }

    #[test]
    fn persist_effect_writes_snapshot() {
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        let store = store_with(&snapshots);

        store.send(TestAction::Increment).unwrap();
        store.send(TestAction::Increment).unwrap();

        assert_eq!(snapshots.saves(), 2);
        let stored: TestState = decode_snapshot(&snapshots.load().unwrap().unwrap()).unwrap();
        assert_eq!(stored.value, 2);
    }

    #[test]
    fn actions_without_persist_do_not_write() {
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        let store = store_with(&snapshots);

        let events = store.send(TestAction::Peek).unwrap();

        assert_eq!(events, vec![TestEvent::Peeked(0)]);
        assert_eq!(snapshots.saves(), 0);
    }

    #[test]
    fn failed_write_rolls_back_the_action() {
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        let store = store_with(&snapshots);
        store.send(TestAction::Increment).unwrap();

        snapshots.fail_saves(true);
        let err = store.send(TestAction::Increment).unwrap_err();

        assert!(matches!(err, StoreError::Persistence(_)));
        assert_eq!(store.state(|s| s.value).unwrap(), 1);

        snapshots.fail_saves(false);
        store.send(TestAction::Increment).unwrap();
        assert_eq!(store.state(|s| s.value).unwrap(), 2);
    }

    #[test]
    fn snapshot_now_writes_current_state() {
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        let store = store_with(&snapshots);

        store.snapshot_now().unwrap();

        assert_eq!(snapshots.saves(), 1);
    }
}
