//! Collaborator errors.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by, or while talking to, the inference collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InferenceError {
    #[error("inference call timed out after {0:?}")]
    Timeout(Duration),

    #[error("inference backend failed: {0}")]
    Backend(String),

    #[error("malformed inference response: {0}")]
    Malformed(String),
}
