//! Table-driven state machine with enter/exit hooks.

use super::error::{HookError, MachineError};
use super::event::Event;
use crate::checkpoint::{CheckpointError, MachineSnapshot};
use crate::core::unwind::catch_panic;
use crate::core::{Guard, State, StateHistory, StateTransition};
use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Side effect run when a state is entered or left.
pub type Hook<S> = Arc<dyn Fn(&S) -> Result<(), HookError> + Send + Sync>;

/// Optional enter/exit hooks attached to a state.
pub struct StateHooks<S> {
    on_enter: Option<Hook<S>>,
    on_exit: Option<Hook<S>>,
}

impl<S> StateHooks<S> {
    pub fn new() -> Self {
        Self {
            on_enter: None,
            on_exit: None,
        }
    }

    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&S) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on_enter = Some(Arc::new(hook));
        self
    }

    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&S) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on_exit = Some(Arc::new(hook));
        self
    }

    pub(crate) fn merge(mut self, other: StateHooks<S>) -> Self {
        if other.on_enter.is_some() {
            self.on_enter = other.on_enter;
        }
        if other.on_exit.is_some() {
            self.on_exit = other.on_exit;
        }
        self
    }
}

impl<S> Default for StateHooks<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for StateHooks<S> {
    fn clone(&self) -> Self {
        Self {
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
        }
    }
}

impl<S> fmt::Debug for StateHooks<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHooks")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

struct TransitionRule<S> {
    target: S,
    guard: Option<Guard<S>>,
}

/// Finite-state machine keyed by `(state, event kind)`.
///
/// Transitions are transactional: the guard, the exit hook of the current
/// state and the enter hook of the target all run before anything is
/// committed. If any of them fails, `current_state()` and `history()` are
/// exactly as they were.
///
/// # Example
///
/// ```rust
/// use waypoint::machine::{Event, StateMachine};
/// use waypoint::state_enum;
///
/// state_enum! {
///     enum Light { Red, Green }
/// }
///
/// struct Tick;
///
/// impl Event for Tick {
///     type Kind = ();
///     fn kind(&self) {}
/// }
///
/// let mut machine: StateMachine<Light, Tick> = StateMachine::new(Light::Red);
/// machine.add_transition(Light::Red, (), Light::Green);
/// machine.add_transition(Light::Green, (), Light::Red);
///
/// assert_eq!(machine.transition(&Tick).unwrap(), Light::Green);
/// assert_eq!(machine.transition(&Tick).unwrap(), Light::Red);
/// assert_eq!(machine.history().len(), 3);
/// ```
pub struct StateMachine<S: State, E: Event> {
    current: S,
    states: HashMap<S, StateHooks<S>>,
    transitions: HashMap<S, HashMap<E::Kind, TransitionRule<S>>>,
    history: StateHistory<S>,
    _event: PhantomData<fn(E)>,
}

impl<S: State, E: Event> StateMachine<S, E> {
    /// Create a new state machine in the initial state.
    pub fn new(initial: S) -> Self {
        Self {
            history: StateHistory::new(initial.clone()),
            current: initial,
            states: HashMap::new(),
            transitions: HashMap::new(),
            _event: PhantomData,
        }
    }

    /// Register hooks for `state`, replacing any previous ones.
    pub fn add_state(&mut self, state: S, hooks: StateHooks<S>) {
        self.states.insert(state, hooks);
    }

    /// Route `kind` events from `from` to `to`.
    ///
    /// Registering the same `(from, kind)` pair again replaces the previous
    /// target, which is returned.
    pub fn add_transition(&mut self, from: S, kind: E::Kind, to: S) -> Option<S> {
        self.insert_rule(from, kind, TransitionRule { target: to, guard: None })
    }

    /// Like [`add_transition`](Self::add_transition), but only taken while
    /// `guard` accepts the current state.
    pub fn add_guarded_transition(
        &mut self,
        from: S,
        kind: E::Kind,
        to: S,
        guard: Guard<S>,
    ) -> Option<S> {
        self.insert_rule(
            from,
            kind,
            TransitionRule {
                target: to,
                guard: Some(guard),
            },
        )
    }

    fn insert_rule(&mut self, from: S, kind: E::Kind, rule: TransitionRule<S>) -> Option<S> {
        let table = self.transitions.entry(from.clone()).or_default();
        let replaced = table.insert(kind.clone(), rule).map(|old| old.target);
        if let Some(old) = &replaced {
            warn!(
                from = from.name(),
                event = ?kind,
                replaced = old.name(),
                "transition re-registered, previous target replaced"
            );
        }
        replaced
    }

    pub fn has_transition(&self, from: &S, kind: &E::Kind) -> bool {
        self.transitions
            .get(from)
            .is_some_and(|table| table.contains_key(kind))
    }

    /// Event kinds with a registered transition out of the current state.
    pub fn available_events(&self) -> Vec<E::Kind> {
        self.transitions
            .get(&self.current)
            .map(|table| table.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn current_state(&self) -> &S {
        &self.current
    }

    pub fn is_final(&self) -> bool {
        self.current.is_final()
    }

    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    /// Apply `event` and return the new current state.
    pub fn transition(&mut self, event: &E) -> Result<S, MachineError> {
        let kind = catch_panic(|| event.kind()).map_err(MachineError::EventPanicked)?;
        let rule = self
            .transitions
            .get(&self.current)
            .and_then(|table| table.get(&kind))
            .ok_or_else(|| MachineError::NoTransition {
                from: self.current.name().to_string(),
                event: format!("{kind:?}"),
            })?;
        let target = rule.target.clone();

        if let Some(guard) = &rule.guard {
            let allowed = guard.try_check(&self.current).unwrap_or_else(|panic| {
                warn!(from = self.current.name(), %panic, "transition guard panicked");
                false
            });
            if !allowed {
                return Err(MachineError::GuardBlocked {
                    from: self.current.name().to_string(),
                    to: target.name().to_string(),
                });
            }
        }

        let hooks = self.states.get(&self.current);
        if let Some(exit) = hooks.and_then(|h| h.on_exit.as_ref()) {
            run_hook(exit, &self.current).map_err(|source| MachineError::ExitHookFailed {
                state: self.current.name().to_string(),
                source,
            })?;
        }

        let hooks = self.states.get(&target);
        if let Some(enter) = hooks.and_then(|h| h.on_enter.as_ref()) {
            run_hook(enter, &target).map_err(|source| MachineError::EnterHookFailed {
                state: target.name().to_string(),
                source,
            })?;
        }

        debug!(
            from = self.current.name(),
            to = target.name(),
            event = ?kind,
            "transition committed"
        );
        let from = std::mem::replace(&mut self.current, target.clone());
        self.history.push(StateTransition {
            from,
            to: target.clone(),
            event: format!("{kind:?}"),
            timestamp: Utc::now(),
        });

        Ok(target)
    }

    /// Capture the current state and history.
    pub fn snapshot(&self) -> MachineSnapshot<S> {
        MachineSnapshot::capture(&self.history)
    }

    /// Replace current state and history with `snapshot`, keeping all
    /// registered states and transitions.
    pub fn restore(&mut self, snapshot: MachineSnapshot<S>) -> Result<(), CheckpointError> {
        snapshot.validate()?;
        self.current = snapshot.current;
        self.history = snapshot.history;
        Ok(())
    }
}

fn run_hook<S>(hook: &Hook<S>, state: &S) -> Result<(), HookError> {
    catch_panic(|| hook(state))
        .unwrap_or_else(|panic| Err(HookError::new(format!("hook panicked: {panic}"))))
}

impl<S: State, E: Event> fmt::Debug for StateMachine<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("states", &self.states.len())
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}
