//! State transition history tracking.
//!
//! A history always starts at the machine's initial state and grows by one
//! record per committed transition. Its last state is the machine's current
//! state.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Kind of the event that triggered the transition
    pub event: String,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of visited states.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{State, StateHistory, StateTransition};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Phase { Start, Middle, End }
///
/// impl State for Phase {
///     fn name(&self) -> &str {
///         match self {
///             Self::Start => "Start",
///             Self::Middle => "Middle",
///             Self::End => "End",
///         }
///     }
/// }
///
/// let history = StateHistory::new(Phase::Start)
///     .record(StateTransition {
///         from: Phase::Start,
///         to: Phase::Middle,
///         event: "Advance".to_string(),
///         timestamp: Utc::now(),
///     })
///     .record(StateTransition {
///         from: Phase::Middle,
///         to: Phase::End,
///         event: "Advance".to_string(),
///         timestamp: Utc::now(),
///     });
///
/// assert_eq!(history.path(), vec![&Phase::Start, &Phase::Middle, &Phase::End]);
/// assert_eq!(history.current(), &Phase::End);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    initial: S,
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> StateHistory<S> {
    /// Create a history positioned at `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            initial,
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The original history is left untouched.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut next = self.clone();
        next.push(transition);
        next
    }

    pub(crate) fn push(&mut self, transition: StateTransition<S>) {
        self.transitions.push(transition);
    }

    /// The state the history started from.
    pub fn initial(&self) -> &S {
        &self.initial
    }

    /// The most recently visited state.
    pub fn current(&self) -> &S {
        self.transitions
            .last()
            .map(|t| &t.to)
            .unwrap_or(&self.initial)
    }

    /// States traversed in order, starting with the initial state.
    pub fn path(&self) -> Vec<&S> {
        std::iter::once(&self.initial)
            .chain(self.transitions.iter().map(|t| &t.to))
            .collect()
    }

    /// Number of states on the path (transitions + 1).
    pub fn len(&self) -> usize {
        self.transitions.len() + 1
    }

    /// A history always contains its initial state.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All committed transitions in order.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    /// Check that every record continues from the previous one.
    pub fn is_contiguous(&self) -> bool {
        let mut at = &self.initial;
        for transition in &self.transitions {
            if &transition.from != at {
                return false;
            }
            at = &transition.to;
        }
        true
    }

    /// Time between the first and last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Initial => "Initial",
                Self::Processing => "Processing",
                Self::Complete => "Complete",
            }
        }
    }

    fn step(from: TestState, to: TestState) -> StateTransition<TestState> {
        StateTransition {
            from,
            to,
            event: "Next".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_holds_initial_state() {
        let history = StateHistory::new(TestState::Initial);

        assert_eq!(history.len(), 1);
        assert_eq!(history.path(), vec![&TestState::Initial]);
        assert_eq!(history.current(), &TestState::Initial);
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new(TestState::Initial);
        let next = history.record(step(TestState::Initial, TestState::Processing));

        assert_eq!(history.transitions().len(), 0);
        assert_eq!(next.transitions().len(), 1);
        assert_eq!(next.current(), &TestState::Processing);
    }

    #[test]
    fn path_returns_state_sequence() {
        let mut history = StateHistory::new(TestState::Initial);
        history.push(step(TestState::Initial, TestState::Processing));
        history.push(step(TestState::Processing, TestState::Complete));

        let path = history.path();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], &TestState::Initial);
        assert_eq!(path[1], &TestState::Processing);
        assert_eq!(path[2], &TestState::Complete);
        assert!(history.is_contiguous());
    }

    #[test]
    fn detects_broken_chain() {
        let mut history = StateHistory::new(TestState::Initial);
        history.push(step(TestState::Processing, TestState::Complete));

        assert!(!history.is_contiguous());
    }

    #[test]
    fn single_transition_has_zero_duration() {
        let history = StateHistory::new(TestState::Initial)
            .record(step(TestState::Initial, TestState::Processing));

        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new(TestState::Initial)
            .record(step(TestState::Initial, TestState::Processing));

        let json = serde_json::to_string(&history).unwrap();
        let restored: StateHistory<TestState> = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.path(), history.path());
        assert_eq!(restored.transitions()[0].event, "Next");
    }
}
