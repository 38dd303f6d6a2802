//! # Gala Core
//!
//! Core traits and types for the gala reservation engine.
//!
//! The engine follows a "functional core, imperative shell" split:
//!
//! - **State**: Domain state, owned by value
//! - **Action**: A command asking the state to change
//! - **Reducer**: `(State, Action, Environment) → Result<Effects, Error>`
//! - **Effect**: Side effect descriptions (publish a fact, persist a snapshot)
//! - **Environment**: Injected dependencies (the wall clock)
//!
//! A reducer either rejects an action with a typed error and leaves the state
//! untouched, or applies it and returns the effects the runtime must execute.
//!
//! ## Example
//!
//! ```ignore
//! use gala_core::*;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Event = CounterEvent;
//!     type Environment = CounterEnvironment;
//!     type Error = CounterError;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         env: &CounterEnvironment,
//!     ) -> Result<SmallVec<[Effect<CounterEvent>; 4]>, CounterError> {
//!         state.count += 1;
//!         Ok(smallvec![Effect::Publish(CounterEvent::Incremented), Effect::Persist])
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Event trait for facts published by reducers
pub mod event;

/// Versioned state snapshots and the storage abstraction behind them
pub mod snapshot;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The command type this reducer processes
    /// - `Event`: The facts this reducer publishes when an action is applied
    /// - `Environment`: The injected dependencies this reducer needs
    /// - `Error`: Why an action was rejected
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The event type published on success
        type Event;

        /// The environment type with injected dependencies
        type Environment;

        /// The rejection type
        type Error;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place (only once validation passed)
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` when the action violates a business rule.
        /// The state must be left exactly as it was in that case.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Result<SmallVec<[Effect<Self::Event>; 4]>, Self::Error>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution).
pub mod effect {
    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Effect<Event> {
        /// Hand a fact back to the caller of the store
        Publish(Event),

        /// Write a snapshot of the full state to durable storage
        Persist,
    }

    impl<Event> Effect<Event> {
        /// Returns the published event, if this effect is a `Publish`
        #[must_use]
        pub const fn as_published(&self) -> Option<&Event> {
            match self {
                Self::Publish(event) => Some(event),
                Self::Persist => None,
            }
        }

        /// Whether this effect requests a snapshot write
        #[must_use]
        pub const fn is_persist(&self) -> bool {
            matches!(self, Self::Persist)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};

    #[test]
    fn effect_accessors() {
        let publish: Effect<u8> = Effect::Publish(7);
        assert_eq!(publish.as_published(), Some(&7));
        assert!(!publish.is_persist());

        let persist: Effect<u8> = Effect::Persist;
        assert_eq!(persist.as_published(), None);
        assert!(persist.is_persist());
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
