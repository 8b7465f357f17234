//! Guard predicates.
//!
//! Guards are pure boolean functions. The state machine uses them to gate
//! individual transitions, the guard evaluator wraps them into named checks
//! and the decision selector uses them as candidate predicates.

use super::unwind::catch_panic;
use std::fmt;
use std::sync::Arc;

/// Pure predicate over a value of type `T`.
///
/// # Example
///
/// ```rust
/// use waypoint::core::Guard;
///
/// let positive = Guard::new(|n: &i64| *n > 0);
///
/// assert!(positive.check(&3));
/// assert!(!positive.check(&-1));
/// ```
pub struct Guard<T: ?Sized> {
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: ?Sized> Guard<T> {
    /// Create a guard from a predicate function.
    ///
    /// The predicate should be deterministic and free of side effects.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the predicate.
    pub fn check(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    /// Evaluate the predicate, turning a panic into an error message.
    pub fn try_check(&self, value: &T) -> Result<bool, String> {
        catch_panic(|| (self.predicate)(value))
    }
}

impl<T: ?Sized> Clone for Guard<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
