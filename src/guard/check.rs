//! Named checks evaluated by the guard evaluator.

use crate::core::unwind::catch_panic;
use crate::core::Guard;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// One failed check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    /// Name of the check that failed
    pub check: String,
    pub message: String,
    /// How long the caller should wait before trying again, if known
    pub retry_after: Option<Duration>,
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.check, self.message)
    }
}

type CheckFn<S> = Box<dyn Fn(&S) -> Result<(), String> + Send + Sync>;

/// A named precondition over a state snapshot.
///
/// # Example
///
/// ```rust
/// use waypoint::guard::GuardCheck;
/// use std::time::Duration;
///
/// struct Account { balance: i64, frozen: bool }
///
/// let funded = GuardCheck::new("funded", |a: &Account| a.balance > 0, "balance is empty");
/// let active = GuardCheck::validate("active", |a: &Account| {
///     if a.frozen { Err("account is frozen".to_string()) } else { Ok(()) }
/// })
/// .retry_after(Duration::from_secs(60));
///
/// assert_eq!(funded.name(), "funded");
/// assert_eq!(active.name(), "active");
/// ```
pub struct GuardCheck<S> {
    name: String,
    check: CheckFn<S>,
    retry_after: Option<Duration>,
}

impl<S: 'static> GuardCheck<S> {
    /// A check that fails with `message` when `predicate` is false.
    pub fn new<F>(name: impl Into<String>, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Self::from_guard(name, Guard::new(predicate), message)
    }

    /// Wrap an existing [`Guard`].
    pub fn from_guard(name: impl Into<String>, guard: Guard<S>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            name: name.into(),
            check: Box::new(move |state| {
                if guard.check(state) {
                    Ok(())
                } else {
                    Err(message.clone())
                }
            }),
            retry_after: None,
        }
    }

    /// A check that produces its own failure message.
    pub fn validate<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&S) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Box::new(check),
            retry_after: None,
        }
    }

    /// Attach a retry hint reported when this check fails.
    pub fn retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }
}

impl<S> GuardCheck<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the check, reporting a panic as a failure.
    pub(crate) fn run(&self, state: &S) -> Validation<(), NonEmptyVec<CheckFailure>> {
        let outcome = match catch_panic(|| (self.check)(state)) {
            Ok(result) => result,
            Err(panic) => Err(format!("check panicked: {panic}")),
        };

        match outcome {
            Ok(()) => Validation::success(()),
            Err(message) => Validation::fail(CheckFailure {
                check: self.name.clone(),
                message,
                retry_after: self.retry_after,
            }),
        }
    }
}

impl<S> fmt::Debug for GuardCheck<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardCheck")
            .field("name", &self.name)
            .field("retry_after", &self.retry_after)
            .finish_non_exhaustive()
    }
}
