//! Choosing among typed candidates.

mod candidate;
mod selector;

pub use candidate::{Candidate, Decision, DecisionSource};
pub use selector::{DecisionError, DecisionSelector, DEFAULT_DECISION_TIMEOUT, FALLBACK_CONFIDENCE};
