//! Retry errors.

use std::time::Duration;
use thiserror::Error;

/// Invalid retry configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StrategyError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("max_delay ({max:?}) is smaller than initial_delay ({initial:?})")]
    MaxBelowInitial { initial: Duration, max: Duration },

    #[error("multiplier must be a finite number >= 1.0, got {0}")]
    InvalidMultiplier(f64),
}

/// Terminal outcome of a retried operation.
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error + 'static> {
    /// The error did not look transient; no further attempts were made.
    #[error("operation failed with a non-retryable error: {0}")]
    Permanent(#[source] E),

    #[error("operation failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: usize,
        #[source]
        source: E,
    },

    #[error("retry cancelled after {attempts} attempts")]
    Cancelled { attempts: usize, last: Option<E> },

    #[error("operation panicked on attempt {attempt}: {message}")]
    Panicked { attempt: usize, message: String },
}

impl<E: std::error::Error + 'static> RetryError<E> {
    /// The last error returned by the operation, if any.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::Permanent(source) | Self::Exhausted { source, .. } => Some(source),
            Self::Cancelled { last, .. } => last.as_ref(),
            Self::Panicked { .. } => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
