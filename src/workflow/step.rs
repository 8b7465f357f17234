//! Workflow steps.

use super::error::StepError;
use super::state::SharedState;
use crate::builder::BuildError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use stillwater::effect::BoxedEffect;

/// Factory producing a fresh effect for each attempt of a step.
pub type StepAction<Env> =
    Arc<dyn Fn(SharedState) -> BoxedEffect<(), StepError, Env> + Send + Sync>;

/// Lifecycle of a step within one execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Executing,
    Completed,
    Failed,
    Compensated,
}

/// A named unit of work with an optional compensating action.
pub struct Step<Env> {
    pub(crate) name: String,
    pub(crate) execute: StepAction<Env>,
    pub(crate) compensate: Option<StepAction<Env>>,
    pub(crate) can_retry: bool,
    pub(crate) max_retries: usize,
    pub(crate) dependencies: Vec<String>,
}

impl<Env> Step<Env> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn has_compensation(&self) -> bool {
        self.compensate.is_some()
    }

    /// Attempts the engine will make before giving up.
    pub fn max_attempts(&self) -> usize {
        if self.can_retry {
            self.max_retries
        } else {
            1
        }
    }
}

impl<Env> fmt::Debug for Step<Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("compensate", &self.compensate.is_some())
            .field("can_retry", &self.can_retry)
            .field("max_retries", &self.max_retries)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Builder for a [`Step`].
///
/// Steps run once by default. `retries(n)` allows up to `n` attempts in
/// total.
pub struct StepBuilder<Env> {
    name: String,
    execute: StepAction<Env>,
    compensate: Option<StepAction<Env>>,
    can_retry: bool,
    max_retries: usize,
    dependencies: Vec<String>,
}

impl<Env> StepBuilder<Env> {
    pub fn new<F>(name: impl Into<String>, execute: F) -> Self
    where
        F: Fn(SharedState) -> BoxedEffect<(), StepError, Env> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            execute: Arc::new(execute),
            compensate: None,
            can_retry: false,
            max_retries: 1,
            dependencies: Vec::new(),
        }
    }

    /// Action that undoes this step if a later step fails.
    pub fn compensate<F>(mut self, compensate: F) -> Self
    where
        F: Fn(SharedState) -> BoxedEffect<(), StepError, Env> + Send + Sync + 'static,
    {
        self.compensate = Some(Arc::new(compensate));
        self
    }

    /// Allow up to `max_attempts` attempts.
    pub fn retries(mut self, max_attempts: usize) -> Self {
        self.can_retry = true;
        self.max_retries = max_attempts;
        self
    }

    pub fn can_retry(mut self, can_retry: bool) -> Self {
        self.can_retry = can_retry;
        self
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Require `step` to have completed before this one runs.
    ///
    /// Naming the same step twice has no further effect.
    pub fn depends_on(mut self, step: impl Into<String>) -> Self {
        let step = step.into();
        if !self.dependencies.contains(&step) {
            self.dependencies.push(step);
        }
        self
    }

    pub fn build(self) -> Result<Step<Env>, BuildError> {
        if self.can_retry && self.max_retries == 0 {
            return Err(BuildError::ZeroRetries { step: self.name });
        }
        Ok(Step {
            name: self.name,
            execute: self.execute,
            compensate: self.compensate,
            can_retry: self.can_retry,
            max_retries: self.max_retries,
            dependencies: self.dependencies,
        })
    }
}
