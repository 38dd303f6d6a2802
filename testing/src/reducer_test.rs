//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use gala_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<V> = Box<dyn FnOnce(&[Effect<V>])>;

/// Type alias for rejection assertion functions
type ErrorAssertion<X> = Box<dyn FnOnce(&X)>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// A test either expects the action to be applied (`then_effects`) or to be
/// rejected (`then_error`). State assertions run in both cases, which makes
/// "rejection leaves state untouched" checks one line long.
///
/// # Example
///
/// ```ignore
/// use gala_testing::ReducerTest;
///
/// ReducerTest::new(GalaReducer::new())
///     .with_env(test_environment())
///     .given_state(state)
///     .when_action(GalaCommand::Confirm { member_id })
///     .then_error(|error| assert!(matches!(error, GalaError::NotOnHold { .. })))
///     .run();
/// ```
pub struct ReducerTest<R>
where
    R: Reducer,
{
    reducer: R,
    environment: Option<R::Environment>,
    initial_state: Option<R::State>,
    action: Option<R::Action>,
    state_assertions: Vec<StateAssertion<R::State>>,
    effect_assertions: Vec<EffectAssertion<R::Event>>,
    error_assertion: Option<ErrorAssertion<R::Error>>,
}

impl<R> ReducerTest<R>
where
    R: Reducer,
    R::Error: std::fmt::Debug,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
            error_assertion: None,
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: R::Environment) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the action to test (When)
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the resulting effects (Then)
    ///
    /// The action is expected to be applied.
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<R::Event>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Expect the action to be rejected and inspect the error (Then)
    #[must_use]
    pub fn then_error<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::Error) + 'static,
    {
        self.error_assertion = Some(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set, if the
    /// outcome (applied vs rejected) differs from what the assertions expect,
    /// or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        let action = self.action.expect("Action must be set with when_action()");

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        // Execute reducer
        let outcome = self.reducer.reduce(&mut state, action, &env);

        match (outcome, self.error_assertion) {
            (Ok(effects), None) => {
                for assertion in self.effect_assertions {
                    assertion(&effects);
                }
            }
            (Err(error), Some(assertion)) => {
                assert!(
                    self.effect_assertions.is_empty(),
                    "Effect assertions were given but the action was rejected: {error:?}"
                );
                assertion(&error);
            }
            (Ok(effects), Some(_)) => {
                panic!(
                    "Expected the action to be rejected, but it produced {} effects",
                    effects.len()
                );
            }
            (Err(error), None) => {
                panic!("Expected the action to be applied, but it was rejected: {error:?}");
            }
        }

        // Run state assertions
        for assertion in self.state_assertions {
            assertion(&state);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use gala_core::effect::Effect;
    use gala_core::event::Event;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if effects is not empty.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<V: std::fmt::Debug>(effects: &[Effect<V>]) {
        assert!(
            effects.is_empty(),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert that a snapshot write was requested
    ///
    /// # Panics
    ///
    /// Panics if no `Persist` effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_persisted<V>(effects: &[Effect<V>]) {
        assert!(
            effects.iter().any(Effect::is_persist),
            "Expected a Persist effect, but none found"
        );
    }

    /// Assert that an event of the given type was published
    ///
    /// # Panics
    ///
    /// Panics if no published event has `event_type() == expected`.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_published<V: Event>(effects: &[Effect<V>], expected: &str) {
        let published: Vec<&'static str> = effects
            .iter()
            .filter_map(Effect::as_published)
            .map(Event::event_type)
            .collect();
        assert!(
            published.contains(&expected),
            "Expected a published {expected} event, found {published:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gala_core::event::Event;
    use gala_core::{SmallVec, smallvec};
    use thiserror::Error;

    #[derive(Clone, Debug)]
    struct TestState {
        count: u32,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Increment,
        Decrement,
    }

    #[derive(Clone, Debug)]
    struct Counted(u32);

    impl Event for Counted {
        fn event_type(&self) -> &'static str {
            "Counted.v1"
        }
    }

    #[derive(Debug, Error)]
    #[error("cannot go below zero")]
    struct Underflow;

    struct TestReducer;

    struct TestEnv;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Event = Counted;
        type Environment = TestEnv;
        type Error = Underflow;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> Result<SmallVec<[Effect<Counted>; 4]>, Underflow> {
            match action {
                TestAction::Increment => state.count += 1,
                TestAction::Decrement => {
                    if state.count == 0 {
                        return Err(Underflow);
                    }
                    state.count -= 1;
                }
            }
            Ok(smallvec![Effect::Publish(Counted(state.count)), Effect::Persist])
        }
    }

    #[test]
    fn test_reducer_test_increment() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Increment)
            .then_state(|state| {
                assert_eq!(state.count, 1);
            })
            .then_effects(|effects| {
                assertions::assert_persisted(effects);
                assertions::assert_published(effects, "Counted.v1");
            })
            .run();
    }

    #[test]
    fn test_reducer_test_rejection() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Decrement)
            .then_error(|error| {
                assert_eq!(error.to_string(), "cannot go below zero");
            })
            .then_state(|state| {
                assert_eq!(state.count, 0);
            })
            .run();
    }

    #[test]
    #[should_panic(expected = "Expected the action to be rejected")]
    fn test_reducer_test_expects_rejection() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Increment)
            .then_error(|_| {})
            .run();
    }

    #[test]
    fn test_assertions_no_effects() {
        assertions::assert_no_effects::<Counted>(&[]);
    }
}
