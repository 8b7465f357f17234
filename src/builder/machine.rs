//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::transition::{TransitionBuilder, TransitionSpec};
use crate::core::{Guard, State};
use crate::machine::{Event, HookError, StateHooks, StateMachine};
use std::collections::{HashMap, HashSet};

/// Builder for constructing state machines with a fluent API.
///
/// Unlike [`StateMachine::add_transition`], which replaces an existing
/// `(state, event)` entry, the builder treats a repeated pair as a mistake
/// and rejects it on `build()`.
pub struct StateMachineBuilder<S: State, E: Event> {
    initial: Option<S>,
    hooks: HashMap<S, StateHooks<S>>,
    transitions: Vec<TransitionSpec<S, E>>,
}

impl<S: State, E: Event> StateMachineBuilder<S, E> {
    pub fn new() -> Self {
        Self {
            initial: None,
            hooks: HashMap::new(),
            transitions: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Attach hooks to `state`, merging with hooks set earlier.
    pub fn state(mut self, state: S, hooks: StateHooks<S>) -> Self {
        let merged = self.hooks.remove(&state).unwrap_or_default().merge(hooks);
        self.hooks.insert(state, merged);
        self
    }

    pub fn on_enter<F>(self, state: S, hook: F) -> Self
    where
        F: Fn(&S) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.state(state, StateHooks::new().on_enter(hook))
    }

    pub fn on_exit<F>(self, state: S, hook: F) -> Self
    where
        F: Fn(&S) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.state(state, StateHooks::new().on_exit(hook))
    }

    /// Add an unconditional transition.
    pub fn transition(mut self, from: S, event: E::Kind, to: S) -> Self {
        self.transitions.push(TransitionSpec {
            from,
            event,
            to,
            guard: None,
        });
        self
    }

    /// Add a transition only taken while `guard` accepts the current state.
    pub fn guarded_transition<F>(mut self, from: S, event: E::Kind, to: S, guard: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.transitions.push(TransitionSpec {
            from,
            event,
            to,
            guard: Some(Guard::new(guard)),
        });
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn with(mut self, builder: TransitionBuilder<S, E>) -> Result<Self, BuildError> {
        self.transitions.push(builder.build()?);
        Ok(self)
    }

    /// Build the state machine.
    pub fn build(self) -> Result<StateMachine<S, E>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        let mut seen = HashSet::new();
        for spec in &self.transitions {
            if !seen.insert((&spec.from, &spec.event)) {
                return Err(BuildError::DuplicateTransition {
                    from: spec.from.name().to_string(),
                    event: format!("{:?}", spec.event),
                });
            }
        }

        let mut machine = StateMachine::new(initial);
        for (state, hooks) in self.hooks {
            machine.add_state(state, hooks);
        }
        for spec in self.transitions {
            match spec.guard {
                Some(guard) => machine.add_guarded_transition(spec.from, spec.event, spec.to, guard),
                None => machine.add_transition(spec.from, spec.event, spec.to),
            };
        }

        Ok(machine)
    }
}

impl<S: State, E: Event> Default for StateMachineBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_enum;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    state_enum! {
        enum Job {
            Queued,
            Running,
            Done,
        }
        final: [Done]
    }

    #[derive(Debug)]
    enum JobEvent {
        Start,
        Finish { output: String },
    }

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    enum JobEventKind {
        Start,
        Finish,
    }

    impl Event for JobEvent {
        type Kind = JobEventKind;

        fn kind(&self) -> JobEventKind {
            match self {
                Self::Start => JobEventKind::Start,
                Self::Finish { .. } => JobEventKind::Finish,
            }
        }
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = StateMachineBuilder::<Job, JobEvent>::new().build();

        assert!(matches!(result, Err(BuildError::MissingInitialState)));
    }

    #[test]
    fn builder_requires_transitions() {
        let result = StateMachineBuilder::<Job, JobEvent>::new()
            .initial(Job::Queued)
            .build();

        assert!(matches!(result, Err(BuildError::NoTransitions)));
    }

    #[test]
    fn builder_rejects_duplicate_transitions() {
        let result = StateMachineBuilder::<Job, JobEvent>::new()
            .initial(Job::Queued)
            .transition(Job::Queued, JobEventKind::Start, Job::Running)
            .transition(Job::Queued, JobEventKind::Start, Job::Done)
            .build();

        assert_eq!(
            result.err(),
            Some(BuildError::DuplicateTransition {
                from: "Queued".to_string(),
                event: "Start".to_string(),
            })
        );
    }

    #[test]
    fn fluent_api_builds_working_machine() {
        let entered = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&entered);

        let mut machine = StateMachineBuilder::<Job, JobEvent>::new()
            .initial(Job::Queued)
            .on_enter(Job::Running, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .on_exit(Job::Running, |_| Ok(()))
            .transition(Job::Queued, JobEventKind::Start, Job::Running)
            .guarded_transition(Job::Running, JobEventKind::Finish, Job::Done, |s| {
                !s.is_final()
            })
            .build()
            .unwrap();

        machine.transition(&JobEvent::Start).unwrap();
        let done = machine
            .transition(&JobEvent::Finish {
                output: "ok".to_string(),
            })
            .unwrap();

        assert_eq!(done, Job::Done);
        assert!(machine.is_final());
        assert_eq!(entered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn transition_builder_feeds_machine_builder() {
        let machine = StateMachineBuilder::<Job, JobEvent>::new()
            .initial(Job::Queued)
            .with(
                TransitionBuilder::new()
                    .from(Job::Queued)
                    .on(JobEventKind::Start)
                    .to(Job::Running),
            )
            .unwrap()
            .build()
            .unwrap();

        assert!(machine.has_transition(&Job::Queued, &JobEventKind::Start));
    }

    #[test]
    fn incomplete_transition_builder_is_rejected() {
        let result = StateMachineBuilder::<Job, JobEvent>::new()
            .initial(Job::Queued)
            .with(TransitionBuilder::new().from(Job::Queued).to(Job::Running));

        assert!(matches!(result, Err(BuildError::MissingEvent)));
    }
}
