//! Candidate selection by predicate, then by collaborator, then by fallback.

use super::candidate::{Candidate, Decision, DecisionSource};
use crate::inference::{
    call_bounded, CallOptions, InferenceError, InferenceRequest, SharedInference,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Confidence reported when the first candidate is taken by default.
pub const FALLBACK_CONFIDENCE: f64 = 0.1;

/// Confidence assumed when the collaborator omits one.
const UNSTATED_CONFIDENCE: f64 = 0.5;

/// Default bound for the selection call.
pub const DEFAULT_DECISION_TIMEOUT: Duration = Duration::from_secs(15);

const DECISION_SYSTEM_PROMPT: &str = "You choose the most appropriate option for an automated \
process. Respond with JSON only, shaped as {\"selected\": <option index>, \"explanation\": \
<string>, \"confidence\": <number between 0 and 1>, \"alternatives\": [<option index>, ...]}.";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DecisionError {
    #[error("no candidates to choose from")]
    NoCandidates,
}

#[derive(Debug, Deserialize)]
struct RawDecision {
    selected: i64,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    alternatives: Option<Vec<i64>>,
}

/// Picks one of several typed candidates.
///
/// Predicates are tried in declared order and the first match wins with
/// confidence 1.0. Without a match, the collaborator is asked once. Any
/// failure of that call, or an out-of-range answer, selects index 0 with
/// [`FALLBACK_CONFIDENCE`].
#[derive(Clone)]
pub struct DecisionSelector {
    inference: Option<SharedInference>,
    options: CallOptions,
}

impl Default for DecisionSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionSelector {
    pub fn new() -> Self {
        Self {
            inference: None,
            options: CallOptions::structured(DEFAULT_DECISION_TIMEOUT),
        }
    }

    pub fn with_inference(mut self, client: SharedInference) -> Self {
        self.inference = Some(client);
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// Choose among `candidates` given `context`.
    pub async fn decide<T, C>(
        &self,
        context: &C,
        candidates: &[Candidate<T, C>],
    ) -> Result<Decision, DecisionError>
    where
        C: Serialize,
    {
        if candidates.is_empty() {
            return Err(DecisionError::NoCandidates);
        }

        if let Some(index) = first_match(context, candidates) {
            debug!(index, "decision made by predicate");
            return Ok(Decision {
                selected_index: index,
                confidence: 1.0,
                explanation: format!(
                    "option {index} ({}) matched its predicate",
                    candidates[index].description
                ),
                alternatives: Vec::new(),
                source: DecisionSource::Predicate,
            });
        }

        let Some(client) = &self.inference else {
            return Ok(fallback("no predicate matched and no collaborator is configured"));
        };

        let request = InferenceRequest {
            system: DECISION_SYSTEM_PROMPT.to_string(),
            prompt: render_prompt(context, candidates),
            options: self.options.clone(),
        };

        let parsed = call_bounded(client.as_ref(), request)
            .await
            .and_then(|reply| parse_reply(&reply));

        match parsed {
            Ok(raw) => Ok(interpret(raw, candidates.len())),
            Err(err) => {
                warn!(error = %err, "decision collaborator unavailable");
                Ok(fallback(&err.to_string()))
            }
        }
    }
}

fn first_match<T, C>(context: &C, candidates: &[Candidate<T, C>]) -> Option<usize> {
    candidates.iter().position(|candidate| {
        let Some(predicate) = candidate.predicate() else {
            return false;
        };
        match predicate.try_check(context) {
            Ok(matched) => matched,
            Err(message) => {
                warn!(candidate = %candidate.description, %message, "candidate predicate panicked");
                false
            }
        }
    })
}

fn render_prompt<T, C: Serialize>(context: &C, candidates: &[Candidate<T, C>]) -> String {
    let context = serde_json::to_string_pretty(context).unwrap_or_else(|_| "{}".to_string());
    let options = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{i}. {}", c.description))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Context:\n{context}\n\nOptions:\n{options}")
}

/// Parse the collaborator's JSON, tolerating surrounding prose or fences.
///
/// Every `{` is tried as the start of the object; the first one that
/// deserializes wins.
fn parse_reply(reply: &str) -> Result<RawDecision, InferenceError> {
    let mut last_error = None;
    for (start, _) in reply.match_indices('{') {
        let mut objects =
            serde_json::Deserializer::from_str(&reply[start..]).into_iter::<RawDecision>();
        match objects.next() {
            Some(Ok(raw)) => return Ok(raw),
            Some(Err(err)) => last_error = Some(err.to_string()),
            None => {}
        }
    }
    Err(InferenceError::Malformed(
        last_error.unwrap_or_else(|| "no JSON object in reply".to_string()),
    ))
}

fn interpret(raw: RawDecision, count: usize) -> Decision {
    let Some(selected) = to_index(raw.selected, count) else {
        warn!(selected = raw.selected, count, "collaborator chose an invalid option");
        return fallback(&format!(
            "collaborator selected option {} which does not exist",
            raw.selected
        ));
    };

    let confidence = raw
        .confidence
        .filter(|c| c.is_finite())
        .unwrap_or(UNSTATED_CONFIDENCE)
        .clamp(0.0, 1.0);

    let mut alternatives = Vec::new();
    for index in raw
        .alternatives
        .unwrap_or_default()
        .into_iter()
        .filter_map(|i| to_index(i, count))
    {
        if index != selected && !alternatives.contains(&index) {
            alternatives.push(index);
        }
    }

    Decision {
        selected_index: selected,
        confidence,
        explanation: raw.explanation.unwrap_or_default(),
        alternatives,
        source: DecisionSource::Inference,
    }
}

fn to_index(raw: i64, count: usize) -> Option<usize> {
    usize::try_from(raw).ok().filter(|i| *i < count)
}

fn fallback(reason: &str) -> Decision {
    Decision {
        selected_index: 0,
        confidence: FALLBACK_CONFIDENCE,
        explanation: format!("fell back to the first option: {reason}"),
        alternatives: Vec::new(),
        source: DecisionSource::Fallback,
    }
}
