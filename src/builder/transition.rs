//! Builder for a single transition rule.

use crate::builder::error::BuildError;
use crate::core::{Guard, State};
use crate::machine::Event;

/// A validated transition ready to be registered on a machine.
pub struct TransitionSpec<S: State, E: Event> {
    pub from: S,
    pub event: E::Kind,
    pub to: S,
    pub guard: Option<Guard<S>>,
}

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<S: State, E: Event> {
    from: Option<S>,
    event: Option<E::Kind>,
    to: Option<S>,
    guard: Option<Guard<S>>,
}

impl<S: State, E: Event> TransitionBuilder<S, E> {
    pub fn new() -> Self {
        Self {
            from: None,
            event: None,
            to: None,
            guard: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the triggering event kind (required).
    pub fn on(mut self, kind: E::Kind) -> Self {
        self.event = Some(kind);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    pub fn guard(mut self, guard: Guard<S>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    pub fn build(self) -> Result<TransitionSpec<S, E>, BuildError> {
        Ok(TransitionSpec {
            from: self.from.ok_or(BuildError::MissingFromState)?,
            event: self.event.ok_or(BuildError::MissingEvent)?,
            to: self.to.ok_or(BuildError::MissingToState)?,
            guard: self.guard,
        })
    }
}

impl<S: State, E: Event> Default for TransitionBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
