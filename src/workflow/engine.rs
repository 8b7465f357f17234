//! Sequential workflow execution with retry and compensation.

use super::definition::Workflow;
use super::error::{StepError, WorkflowError};
use super::step::{Step, StepAction, StepStatus};
use crate::core::unwind::panic_message;
use crate::retry::{run_attempts, Backoff, LinearBackoff, LoopError};
use futures_util::FutureExt;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use stillwater::effect::Effect;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Outcome of a successful execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorkflowReport {
    pub workflow: String,
    /// Step names in completion order
    pub completed: Vec<String>,
    /// Attempts used per step
    pub attempts: HashMap<String, usize>,
}

/// Runs workflows step by step.
///
/// Between attempts of a retrying step the engine sleeps according to its
/// [`Backoff`], [`LinearBackoff`] with a one second unit by default. When a
/// step fails for good, or a dependency is missing, or the engine is
/// cancelled, every step completed so far is compensated in reverse order.
///
/// # Example
///
/// ```rust
/// use stillwater::prelude::*;
/// use waypoint::workflow::{StepBuilder, StepError, Workflow, WorkflowEngine};
///
/// # #[tokio::main]
/// # async fn main() {
/// let workflow = Workflow::builder("greeting")
///     .step(
///         StepBuilder::new("hello", |state| {
///             from_fn(move |_: &()| {
///                 state.set("greeting", "hello");
///                 Ok::<_, StepError>(())
///             })
///             .boxed()
///         })
///         .build()
///         .unwrap(),
///     )
///     .build()
///     .unwrap();
///
/// let report = WorkflowEngine::new().run(&workflow, &()).await.unwrap();
///
/// assert_eq!(report.completed, vec!["hello".to_string()]);
/// assert_eq!(workflow.state().get("greeting"), Some("hello".into()));
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct WorkflowEngine {
    backoff: Arc<dyn Backoff>,
    cancel: CancellationToken,
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowEngine {
    pub fn new() -> Self {
        Self {
            backoff: Arc::new(LinearBackoff::default()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_backoff(mut self, backoff: impl Backoff + 'static) -> Self {
        self.backoff = Arc::new(backoff);
        self
    }

    /// Stop between steps or during a backoff sleep once `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[instrument(skip_all, fields(workflow = %workflow.name()))]
    pub async fn run<Env>(
        &self,
        workflow: &Workflow<Env>,
        env: &Env,
    ) -> Result<WorkflowReport, WorkflowError>
    where
        Env: Clone + Send + Sync + 'static,
    {
        if workflow.steps().is_empty() {
            return Err(WorkflowError::Empty);
        }

        let _running = workflow.run_lock.lock().await;
        workflow.reset_statuses();
        info!(steps = workflow.steps().len(), "workflow started");

        let mut completed: Vec<&Step<Env>> = Vec::new();
        let mut done: HashSet<&str> = HashSet::new();
        let mut attempts = HashMap::new();

        for step in workflow.steps() {
            if self.cancel.is_cancelled() {
                warn!(step = step.name(), "workflow cancelled before step");
                self.compensate(workflow, &completed, env).await;
                return Err(WorkflowError::Cancelled {
                    step: step.name().to_string(),
                });
            }

            let missing: Vec<String> = step
                .dependencies()
                .iter()
                .filter(|dep| !done.contains(dep.as_str()))
                .cloned()
                .collect();
            if !missing.is_empty() {
                warn!(step = step.name(), ?missing, "step dependencies not met");
                workflow.set_status(step.name(), StepStatus::Failed);
                self.compensate(workflow, &completed, env).await;
                return Err(WorkflowError::DependencyNotMet {
                    step: step.name().to_string(),
                    missing,
                });
            }

            workflow.set_status(step.name(), StepStatus::Executing);
            debug!(step = step.name(), max_attempts = step.max_attempts(), "step started");

            let outcome = run_attempts(
                step.max_attempts(),
                self.backoff.as_ref(),
                &self.cancel,
                |_: &StepError| true,
                |_attempt| run_action(&step.execute, workflow, env),
            )
            .await;

            match outcome {
                Ok(((), used)) => {
                    debug!(step = step.name(), attempts = used, "step completed");
                    workflow.set_status(step.name(), StepStatus::Completed);
                    attempts.insert(step.name().to_string(), used);
                    done.insert(step.name());
                    completed.push(step);
                }
                Err(LoopError::Failed {
                    attempts: used,
                    error,
                    ..
                }) => {
                    warn!(step = step.name(), attempts = used, %error, "step failed");
                    workflow.set_status(step.name(), StepStatus::Failed);
                    self.compensate(workflow, &completed, env).await;
                    return Err(WorkflowError::StepFailed {
                        step: step.name().to_string(),
                        attempts: used,
                        source: error,
                    });
                }
                Err(LoopError::Cancelled { attempts: used, .. }) => {
                    warn!(step = step.name(), attempts = used, "workflow cancelled during step");
                    workflow.set_status(step.name(), StepStatus::Failed);
                    self.compensate(workflow, &completed, env).await;
                    return Err(WorkflowError::Cancelled {
                        step: step.name().to_string(),
                    });
                }
            }
        }

        info!(steps = completed.len(), "workflow completed");
        Ok(WorkflowReport {
            workflow: workflow.name().to_string(),
            completed: completed.iter().map(|s| s.name().to_string()).collect(),
            attempts,
        })
    }

    /// Undo `completed` in reverse order. Failures are logged and skipped.
    async fn compensate<Env>(&self, workflow: &Workflow<Env>, completed: &[&Step<Env>], env: &Env)
    where
        Env: Clone + Send + Sync + 'static,
    {
        for step in completed.iter().rev() {
            let Some(compensate) = &step.compensate else {
                continue;
            };
            debug!(step = step.name(), "compensating step");
            match run_action(compensate, workflow, env).await {
                Ok(()) => workflow.set_status(step.name(), StepStatus::Compensated),
                Err(error) => warn!(step = step.name(), %error, "compensation failed"),
            }
        }
    }
}

/// Build and run a fresh effect, turning a panic into a step error.
async fn run_action<Env>(
    action: &StepAction<Env>,
    workflow: &Workflow<Env>,
    env: &Env,
) -> Result<(), StepError>
where
    Env: Clone + Send + Sync + 'static,
{
    let state = workflow.state().clone();
    AssertUnwindSafe(async move { action(state).run(env).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(StepError::Panicked(panic_message(payload))))
}
