//! Build errors for machine, transition and workflow builders.

use thiserror::Error;

/// Errors that can occur when building machines and workflows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("Transition event not specified. Call .on(kind)")]
    MissingEvent,

    #[error("Transition from '{from}' on '{event}' is defined more than once")]
    DuplicateTransition { from: String, event: String },

    #[error("Step '{0}' is defined more than once")]
    DuplicateStep(String),

    #[error("Step '{step}' allows retries but max_retries is 0")]
    ZeroRetries { step: String },
}
