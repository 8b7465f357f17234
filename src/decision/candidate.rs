//! Decision candidates and results.

use crate::core::Guard;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One option a [`DecisionSelector`](super::DecisionSelector) can pick.
pub struct Candidate<T, C> {
    pub value: T,
    pub description: String,
    predicate: Option<Guard<C>>,
}

impl<T, C> Candidate<T, C> {
    /// A candidate without a predicate; it can only be chosen by the
    /// collaborator or the fallback.
    pub fn new(value: T, description: impl Into<String>) -> Self {
        Self {
            value,
            description: description.into(),
            predicate: None,
        }
    }

    /// Select this candidate deterministically when `predicate` holds.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Guard::new(predicate));
        self
    }

    pub fn with_guard(mut self, guard: Guard<C>) -> Self {
        self.predicate = Some(guard);
        self
    }

    pub(crate) fn predicate(&self) -> Option<&Guard<C>> {
        self.predicate.as_ref()
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Candidate<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("value", &self.value)
            .field("description", &self.description)
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}

/// How a decision was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// A candidate predicate matched
    Predicate,
    /// The collaborator chose
    Inference,
    /// Neither produced a usable answer; the first candidate was taken
    Fallback,
}

/// The selected candidate and supporting detail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub selected_index: usize,
    /// In `[0, 1]`
    pub confidence: f64,
    pub explanation: String,
    /// Other acceptable indexes, most preferred first
    pub alternatives: Vec<usize>,
    pub source: DecisionSource,
}

impl Decision {
    /// Borrow the chosen value out of the candidate list it was made from.
    pub fn selected<'a, T, C>(&self, candidates: &'a [Candidate<T, C>]) -> Option<&'a T> {
        candidates.get(self.selected_index).map(|c| &c.value)
    }
}
