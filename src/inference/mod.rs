//! The inference collaborator.
//!
//! Guard evaluation and decision selection can escalate to an external
//! text-generation service. This crate never talks to a concrete backend;
//! callers inject an [`InferenceClient`] implementation.

mod error;

pub use error::InferenceError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Quality/speed trade-off requested from the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Fast,
    Balanced,
    Quality,
}

/// Shape of the reply the caller expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    Json,
}

/// Per-call options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallOptions {
    /// Hard bound on the call, enforced by this crate
    pub timeout: Duration,
    pub tier: Tier,
    pub format: ResponseFormat,
}

impl CallOptions {
    /// Short, fast-tier plain-text call.
    pub fn quick_text(timeout: Duration) -> Self {
        Self {
            timeout,
            tier: Tier::Fast,
            format: ResponseFormat::Text,
        }
    }

    /// Balanced-tier JSON call.
    pub fn structured(timeout: Duration) -> Self {
        Self {
            timeout,
            tier: Tier::Balanced,
            format: ResponseFormat::Json,
        }
    }
}

/// A single request to the collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub system: String,
    pub prompt: String,
    pub options: CallOptions,
}

/// External text-generation capability.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Produce a reply to `request`.
    ///
    /// Implementations may ignore `options.timeout`; callers in this crate
    /// enforce it themselves.
    async fn generate(&self, request: InferenceRequest) -> Result<String, InferenceError>;
}

/// Shared handle to a collaborator.
pub type SharedInference = Arc<dyn InferenceClient>;

/// Issue `request`, failing with [`InferenceError::Timeout`] once
/// `request.options.timeout` elapses.
pub async fn call_bounded(
    client: &dyn InferenceClient,
    request: InferenceRequest,
) -> Result<String, InferenceError> {
    let limit = request.options.timeout;
    let tier = request.options.tier;
    debug!(?tier, ?limit, "calling inference collaborator");

    match tokio::time::timeout(limit, client.generate(request)).await {
        Ok(reply) => reply,
        Err(_) => Err(InferenceError::Timeout(limit)),
    }
}
