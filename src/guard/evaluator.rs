//! Guard evaluation with optional collaborator suggestions.

use super::check::{CheckFailure, GuardCheck};
use crate::inference::{call_bounded, CallOptions, InferenceRequest, SharedInference};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stillwater::validation::Validation;
use tracing::{debug, warn};

/// Default bound for the suggestion call.
pub const DEFAULT_SUGGESTION_TIMEOUT: Duration = Duration::from_secs(5);

const SUGGESTION_SYSTEM_PROMPT: &str = "You help an automated process recover from failed \
preconditions. Reply with one short, actionable suggestion per line and nothing else.";

/// Outcome of evaluating a set of checks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GuardResult {
    pub can_proceed: bool,
    /// Failures in the order the checks were declared
    pub failed_checks: Vec<CheckFailure>,
    /// Best-effort hints from the collaborator
    pub suggestions: Vec<String>,
    /// Longest retry hint among the failed checks
    pub retry_after: Option<Duration>,
}

impl GuardResult {
    /// Failure messages only, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.failed_checks
            .iter()
            .map(|f| f.message.as_str())
            .collect()
    }
}

/// Evaluates every check against a state snapshot.
///
/// Evaluation never short-circuits: all checks run and all failures are
/// reported. When a collaborator is configured and something failed, one
/// bounded call asks it for suggestions; any failure of that call leaves the
/// suggestion list empty.
#[derive(Clone)]
pub struct GuardEvaluator {
    inference: Option<SharedInference>,
    options: CallOptions,
}

impl Default for GuardEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardEvaluator {
    /// Evaluator without a collaborator.
    pub fn new() -> Self {
        Self {
            inference: None,
            options: CallOptions::quick_text(DEFAULT_SUGGESTION_TIMEOUT),
        }
    }

    /// Ask `client` for suggestions whenever a check fails.
    pub fn with_inference(mut self, client: SharedInference) -> Self {
        self.inference = Some(client);
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// Run all checks without contacting the collaborator.
    pub fn check<S>(&self, state: &S, checks: &[GuardCheck<S>]) -> GuardResult {
        let validations: Vec<_> = checks.iter().map(|check| check.run(state)).collect();

        let failed_checks: Vec<CheckFailure> = match Validation::all_vec(validations).map(|_| ()) {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        };

        let retry_after = failed_checks.iter().filter_map(|f| f.retry_after).max();
        debug!(
            checks = checks.len(),
            failed = failed_checks.len(),
            "guard checks evaluated"
        );

        GuardResult {
            can_proceed: failed_checks.is_empty(),
            failed_checks,
            suggestions: Vec::new(),
            retry_after,
        }
    }

    /// Run all checks and, if any failed, gather suggestions.
    pub async fn evaluate<S>(&self, state: &S, checks: &[GuardCheck<S>]) -> GuardResult {
        let mut result = self.check(state, checks);
        if !result.can_proceed {
            result.suggestions = self.suggest(&result.failed_checks).await;
        }
        result
    }

    async fn suggest(&self, failures: &[CheckFailure]) -> Vec<String> {
        let Some(client) = &self.inference else {
            return Vec::new();
        };

        let listing = failures
            .iter()
            .map(|f| format!("- {f}"))
            .collect::<Vec<_>>()
            .join("\n");
        let request = InferenceRequest {
            system: SUGGESTION_SYSTEM_PROMPT.to_string(),
            prompt: format!("These checks failed:\n{listing}\n\nHow can they be resolved?"),
            options: self.options.clone(),
        };

        match call_bounded(client.as_ref(), request).await {
            Ok(reply) => split_suggestions(&reply),
            Err(err) => {
                warn!(error = %err, "guard suggestions unavailable");
                Vec::new()
            }
        }
    }
}

/// Split a free-text reply into one suggestion per non-empty line,
/// dropping list markers.
fn split_suggestions(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.trim_start_matches(['-', '*', '•']).trim_start();
            let digits = line.trim_start_matches(|c: char| c.is_ascii_digit());
            if digits.len() < line.len() && (digits.starts_with('.') || digits.starts_with(')')) {
                digits[1..].trim_start()
            } else {
                line
            }
        })
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
