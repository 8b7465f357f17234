//! Workflow and step errors.

use std::error::Error;
use thiserror::Error;

/// Failure of a single step body or compensation.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{0}")]
    Message(String),

    #[error("step panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Source(Box<dyn Error + Send + Sync>),
}

impl StepError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn from_error<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Source(Box::new(error))
    }
}

/// Why a workflow execution stopped.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("workflow has no steps")]
    Empty,

    #[error("step '{step}' depends on steps that have not completed: {}", missing.join(", "))]
    DependencyNotMet { step: String, missing: Vec<String> },

    #[error("step '{step}' failed after {attempts} attempt(s): {source}")]
    StepFailed {
        step: String,
        attempts: usize,
        #[source]
        source: StepError,
    },

    #[error("workflow cancelled at step '{step}'")]
    Cancelled { step: String },
}

impl WorkflowError {
    /// Name of the step the workflow stopped at, if any.
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::DependencyNotMet { step, .. }
            | Self::StepFailed { step, .. }
            | Self::Cancelled { step } => Some(step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_step() {
        let err = WorkflowError::DependencyNotMet {
            step: "ship".to_string(),
            missing: vec!["reserve".to_string(), "charge".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "step 'ship' depends on steps that have not completed: reserve, charge"
        );
        assert_eq!(err.step(), Some("ship"));

        let err = WorkflowError::StepFailed {
            step: "charge".to_string(),
            attempts: 2,
            source: StepError::msg("card declined"),
        };
        assert!(err.to_string().contains("charge"));
        assert_eq!(
            err.source().map(ToString::to_string),
            Some("card declined".to_string())
        );
    }

    #[test]
    fn wrapped_errors_are_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(StepError::from_error(io).to_string(), "disk full");
    }
}
