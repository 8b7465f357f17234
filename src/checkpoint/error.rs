//! Checkpoint error types.

use thiserror::Error;

/// Errors that can occur while saving or restoring a machine snapshot
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Snapshot is internally inconsistent
    #[error("Checkpoint validation failed: {0}")]
    ValidationFailed(String),
}
