//! Multi-step workflows with dependency checks and saga compensation.
//!
//! A [`Workflow`] is an ordered list of [`Step`]s sharing one
//! [`SharedState`] map. Each step body is a stillwater effect built fresh
//! for every attempt and run against the caller's environment.

mod definition;
mod engine;
mod error;
mod state;
mod step;

pub use definition::{Workflow, WorkflowBuilder};
pub use engine::{WorkflowEngine, WorkflowReport};
pub use error::{StepError, WorkflowError};
pub use state::SharedState;
pub use step::{Step, StepAction, StepBuilder, StepStatus};
