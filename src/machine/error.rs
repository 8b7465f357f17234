//! State machine errors.

use thiserror::Error;

/// Failure reported by an enter or exit hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors that can occur during transitions.
///
/// Every variant leaves the machine's current state and history untouched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    #[error("No transition from state '{from}' on event '{event}'")]
    NoTransition { from: String, event: String },

    #[error("Guard blocked transition from '{from}' to '{to}'")]
    GuardBlocked { from: String, to: String },

    #[error("Exit hook of state '{state}' failed: {source}")]
    ExitHookFailed {
        state: String,
        #[source]
        source: HookError,
    },

    #[error("Enter hook of state '{state}' failed: {source}")]
    EnterHookFailed {
        state: String,
        #[source]
        source: HookError,
    },

    #[error("Event kind could not be determined: {0}")]
    EventPanicked(String),

    #[error("Transition panicked: {0}")]
    Panicked(String),

    #[error("State machine actor has stopped")]
    Closed,
}
