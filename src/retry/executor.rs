//! Retry executor with exponential backoff.

use super::attempts::{run_attempts, LoopError};
use super::backoff::RetryStrategy;
use super::classify::{default_classifier, Classifier};
use super::error::{RetryError, StrategyError};
use crate::core::unwind::panic_message;
use futures_util::FutureExt;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs fallible async operations under a [`RetryStrategy`].
///
/// # Example
///
/// ```rust
/// use waypoint::retry::{RetryExecutor, RetryStrategy};
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("{0}")]
/// struct ApiError(String);
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let executor = RetryExecutor::new(RetryStrategy::no_retry()).unwrap();
///
/// let value = executor
///     .run(|attempt| async move { Ok::<_, ApiError>(attempt * 10) })
///     .await
///     .unwrap();
///
/// assert_eq!(value, 10);
/// # }
/// ```
#[derive(Clone)]
pub struct RetryExecutor {
    strategy: RetryStrategy,
    classifier: Classifier,
    cancel: CancellationToken,
}

impl fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("strategy", &self.strategy)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl RetryExecutor {
    /// Create an executor, rejecting invalid strategies.
    pub fn new(strategy: RetryStrategy) -> Result<Self, StrategyError> {
        strategy.validate()?;
        Ok(Self {
            strategy,
            classifier: default_classifier(),
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the transient-error heuristic.
    pub fn with_classifier<F>(mut self, classifier: F) -> Self
    where
        F: Fn(&(dyn Error + 'static)) -> bool + Send + Sync + 'static,
    {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Stop retrying once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn strategy(&self) -> &RetryStrategy {
        &self.strategy
    }

    /// Run `op` until it succeeds or the strategy gives up.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        E: Error + Send + Sync + 'static,
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let classifier = Arc::clone(&self.classifier);
        let outcome = run_attempts(
            self.strategy.max_attempts,
            &self.strategy,
            &self.cancel,
            |failure: &Failure<E>| match failure {
                Failure::Op(err) => classifier(err as &(dyn Error + 'static)),
                Failure::Panicked(_) => false,
            },
            |attempt| {
                AssertUnwindSafe(op(attempt)).catch_unwind().map(|caught| match caught {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(err)) => Err(Failure::Op(err)),
                    Err(payload) => Err(Failure::Panicked(panic_message(payload))),
                })
            },
        )
        .await;

        match outcome {
            Ok((value, _)) => Ok(value),
            Err(LoopError::Failed {
                attempts,
                error: Failure::Panicked(message),
                ..
            }) => Err(RetryError::Panicked {
                attempt: attempts,
                message,
            }),
            Err(LoopError::Failed {
                error: Failure::Op(err),
                retryable: false,
                ..
            }) => Err(RetryError::Permanent(err)),
            Err(LoopError::Failed {
                attempts,
                error: Failure::Op(err),
                retryable: true,
            }) => Err(RetryError::Exhausted {
                attempts,
                source: err,
            }),
            Err(LoopError::Cancelled { attempts, last }) => Err(RetryError::Cancelled {
                attempts,
                last: last.and_then(Failure::into_op),
            }),
        }
    }
}

enum Failure<E> {
    Op(E),
    Panicked(String),
}

impl<E> Failure<E> {
    fn into_op(self) -> Option<E> {
        match self {
            Self::Op(err) => Some(err),
            Self::Panicked(_) => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Op(err) => err.fmt(f),
            Self::Panicked(message) => write!(f, "panicked: {message}"),
        }
    }
}
