//! Shared access to a state machine through a single owning task.

use super::error::MachineError;
use super::event::Event;
use super::machine::{StateHooks, StateMachine};
use crate::checkpoint::MachineSnapshot;
use crate::core::unwind::catch_panic;
use crate::core::{State, StateHistory};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Mailbox size used by [`MachineHandle::spawn`].
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

enum Command<S: State, E: Event> {
    Transition {
        event: E,
        reply: oneshot::Sender<Result<S, MachineError>>,
    },
    AddState {
        state: S,
        hooks: StateHooks<S>,
    },
    AddTransition {
        from: S,
        kind: E::Kind,
        to: S,
        reply: oneshot::Sender<Option<S>>,
    },
    Current {
        reply: oneshot::Sender<S>,
    },
    History {
        reply: oneshot::Sender<StateHistory<S>>,
    },
    Snapshot {
        reply: oneshot::Sender<MachineSnapshot<S>>,
    },
}

/// Cloneable handle to a [`StateMachine`] owned by a background task.
///
/// Commands are applied one at a time in arrival order, so concurrent
/// callers never observe a half-applied transition. The task stops once
/// every handle has been dropped.
pub struct MachineHandle<S: State, E: Event> {
    sender: mpsc::Sender<Command<S, E>>,
}

impl<S: State, E: Event> Clone for MachineHandle<S, E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<S: State, E: Event> MachineHandle<S, E> {
    /// Move `machine` into a new task. Must be called within a tokio runtime.
    pub fn spawn(machine: StateMachine<S, E>) -> Self {
        Self::spawn_with_capacity(machine, DEFAULT_MAILBOX_CAPACITY)
    }

    pub fn spawn_with_capacity(machine: StateMachine<S, E>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        tokio::spawn(run(machine, receiver));
        Self { sender }
    }

    pub async fn transition(&self, event: E) -> Result<S, MachineError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Transition { event, reply }).await?;
        response.await.map_err(|_| MachineError::Closed)?
    }

    pub async fn add_state(&self, state: S, hooks: StateHooks<S>) -> Result<(), MachineError> {
        self.send(Command::AddState { state, hooks }).await
    }

    /// Returns the replaced target if `(from, kind)` was already registered.
    pub async fn add_transition(
        &self,
        from: S,
        kind: E::Kind,
        to: S,
    ) -> Result<Option<S>, MachineError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::AddTransition {
            from,
            kind,
            to,
            reply,
        })
        .await?;
        response.await.map_err(|_| MachineError::Closed)
    }

    pub async fn current_state(&self) -> Result<S, MachineError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Current { reply }).await?;
        response.await.map_err(|_| MachineError::Closed)
    }

    pub async fn history(&self) -> Result<StateHistory<S>, MachineError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::History { reply }).await?;
        response.await.map_err(|_| MachineError::Closed)
    }

    pub async fn snapshot(&self) -> Result<MachineSnapshot<S>, MachineError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        response.await.map_err(|_| MachineError::Closed)
    }

    async fn send(&self, command: Command<S, E>) -> Result<(), MachineError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| MachineError::Closed)
    }
}

async fn run<S: State, E: Event>(
    mut machine: StateMachine<S, E>,
    mut receiver: mpsc::Receiver<Command<S, E>>,
) {
    while let Some(command) = receiver.recv().await {
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            Command::Transition { event, reply } => {
                let outcome = catch_panic(|| machine.transition(&event))
                    .unwrap_or_else(|message| Err(MachineError::Panicked(message)));
                let _ = reply.send(outcome);
            }
            Command::AddState { state, hooks } => machine.add_state(state, hooks),
            Command::AddTransition {
                from,
                kind,
                to,
                reply,
            } => {
                let _ = reply.send(machine.add_transition(from, kind, to));
            }
            Command::Current { reply } => {
                let _ = reply.send(machine.current_state().clone());
            }
            Command::History { reply } => {
                let _ = reply.send(machine.history().clone());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(machine.snapshot());
            }
        }
    }
    debug!(state = machine.current_state().name(), "state machine task stopped");
}
