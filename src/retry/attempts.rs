//! The attempt loop shared by the retry executor and the workflow engine.

use super::backoff::Backoff;
use std::fmt::Display;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Why the loop stopped without a success.
#[derive(Debug)]
pub(crate) enum LoopError<E> {
    Failed {
        attempts: usize,
        error: E,
        retryable: bool,
    },
    Cancelled {
        attempts: usize,
        last: Option<E>,
    },
}

/// Run `op` until it succeeds, returns a non-retryable error, exhausts
/// `max_attempts`, or `cancel` fires. Returns the value and the number of
/// attempts used.
pub(crate) async fn run_attempts<T, E, F, Fut, R>(
    max_attempts: usize,
    backoff: &dyn Backoff,
    cancel: &CancellationToken,
    mut retryable: R,
    mut op: F,
) -> Result<(T, usize), LoopError<E>>
where
    E: Display,
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: FnMut(&E) -> bool,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(LoopError::Cancelled {
                attempts: attempt,
                last: None,
            });
        }

        attempt += 1;
        debug!(attempt, max_attempts, "starting attempt");

        let error = match op(attempt).await {
            Ok(value) => return Ok((value, attempt)),
            Err(error) => error,
        };

        let retry = retryable(&error);
        if !retry || attempt >= max_attempts {
            return Err(LoopError::Failed {
                attempts: attempt,
                error,
                retryable: retry,
            });
        }

        let delay = backoff.delay_after(attempt);
        warn!(attempt, max_attempts, ?delay, %error, "attempt failed, backing off");

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(LoopError::Cancelled {
                    attempts: attempt,
                    last: Some(error),
                });
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::LinearBackoff;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn stops_at_first_success() {
        let backoff = LinearBackoff::new(Duration::from_millis(10));
        let cancel = CancellationToken::new();

        let result: Result<(u32, usize), LoopError<String>> =
            run_attempts(5, &backoff, &cancel, |_| true, |attempt| async move {
                if attempt < 3 {
                    Err(format!("fail {attempt}"))
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), (42, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_stops_immediately() {
        let backoff = LinearBackoff::default();
        let cancel = CancellationToken::new();

        let result: Result<((), usize), LoopError<String>> =
            run_attempts(5, &backoff, &cancel, |_| false, |_| async {
                Err("nope".to_string())
            })
            .await;

        match result {
            Err(LoopError::Failed {
                attempts,
                retryable,
                ..
            }) => {
                assert_eq!(attempts, 1);
                assert!(!retryable);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_runs_once() {
        let backoff = LinearBackoff::default();
        let cancel = CancellationToken::new();
        let mut calls = 0;

        let _: Result<((), usize), LoopError<String>> =
            run_attempts(0, &backoff, &cancel, |_| true, |_| {
                calls += 1;
                async { Err("x".to_string()) }
            })
            .await;

        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_backoff() {
        let backoff = LinearBackoff::new(Duration::from_secs(3600));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let result: Result<((), usize), LoopError<String>> =
            run_attempts(3, &backoff, &cancel, |_| true, |_| async {
                Err("timeout".to_string())
            })
            .await;

        match result {
            Err(LoopError::Cancelled { attempts, last }) => {
                assert_eq!(attempts, 1);
                assert_eq!(last.as_deref(), Some("timeout"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
