//! Builder API for state machine construction.
//!
//! This module provides fluent builders and the [`state_enum!`](crate::state_enum)
//! macro for creating state machines with minimal boilerplate. Builders
//! validate on `build()` and report problems as [`BuildError`].

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use transition::{TransitionBuilder, TransitionSpec};
