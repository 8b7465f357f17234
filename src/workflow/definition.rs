//! Workflow definitions.

use super::engine::{WorkflowEngine, WorkflowReport};
use super::error::WorkflowError;
use super::state::SharedState;
use super::step::{Step, StepStatus};
use crate::builder::BuildError;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ordered steps plus the state they share.
///
/// Steps always run in the order they were added. Dependencies are checked,
/// never used for reordering.
///
/// A workflow runs one execution at a time: a second `run` on the same
/// workflow waits until the first has finished, so the status table always
/// describes a single execution.
pub struct Workflow<Env> {
    pub(crate) name: String,
    pub(crate) steps: Vec<Step<Env>>,
    state: SharedState,
    statuses: Mutex<HashMap<String, StepStatus>>,
    pub(crate) run_lock: tokio::sync::Mutex<()>,
}

impl<Env> Workflow<Env> {
    pub fn builder(name: impl Into<String>) -> WorkflowBuilder<Env> {
        WorkflowBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step<Env>] {
        &self.steps
    }

    /// Handle to the shared state map.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn status(&self, step: &str) -> Option<StepStatus> {
        self.statuses().get(step).copied()
    }

    /// Status of every step in declared order.
    pub fn step_statuses(&self) -> Vec<(String, StepStatus)> {
        let statuses = self.statuses();
        self.steps
            .iter()
            .map(|step| {
                let status = statuses.get(&step.name).copied().unwrap_or(StepStatus::Pending);
                (step.name.clone(), status)
            })
            .collect()
    }

    pub(crate) fn set_status(&self, step: &str, status: StepStatus) {
        self.statuses().insert(step.to_string(), status);
    }

    pub(crate) fn reset_statuses(&self) {
        let mut statuses = self.statuses();
        for step in &self.steps {
            statuses.insert(step.name.clone(), StepStatus::Pending);
        }
    }

    fn statuses(&self) -> MutexGuard<'_, HashMap<String, StepStatus>> {
        self.statuses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<Env> Workflow<Env>
where
    Env: Clone + Send + Sync + 'static,
{
    /// Run with a default [`WorkflowEngine`].
    pub async fn execute(&self, env: &Env) -> Result<WorkflowReport, WorkflowError> {
        WorkflowEngine::new().run(self, env).await
    }
}

impl<Env> std::fmt::Debug for Workflow<Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Workflow`].
pub struct WorkflowBuilder<Env> {
    name: String,
    steps: Vec<Step<Env>>,
    state: SharedState,
}

impl<Env> WorkflowBuilder<Env> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            state: SharedState::new(),
        }
    }

    pub fn step(mut self, step: Step<Env>) -> Self {
        self.steps.push(step);
        self
    }

    /// Seed the shared state before the first run.
    pub fn with_state(mut self, state: SharedState) -> Self {
        self.state = state;
        self
    }

    /// Build the workflow, rejecting duplicate step names.
    ///
    /// A workflow with no steps builds, but fails when executed.
    pub fn build(self) -> Result<Workflow<Env>, BuildError> {
        let mut names = HashSet::new();
        for step in &self.steps {
            if !names.insert(step.name.as_str()) {
                return Err(BuildError::DuplicateStep(step.name.clone()));
            }
        }

        let statuses = self
            .steps
            .iter()
            .map(|step| (step.name.clone(), StepStatus::Pending))
            .collect();

        Ok(Workflow {
            name: self.name,
            steps: self.steps,
            state: self.state,
            statuses: Mutex::new(statuses),
            run_lock: tokio::sync::Mutex::new(()),
        })
    }
}
