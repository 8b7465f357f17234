//! Snapshots of a state machine's position.
//!
//! A snapshot holds the current state and the full transition history. It
//! does not hold hooks or the transition table; those are code and are
//! re-registered by whoever rebuilds the machine before calling
//! [`StateMachine::restore`](crate::machine::StateMachine::restore).

use crate::core::{State, StateHistory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for the snapshot format
pub const CHECKPOINT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct MachineSnapshot<S: State> {
    pub version: u32,
    pub id: Uuid,
    pub taken_at: DateTime<Utc>,
    pub current: S,
    pub history: StateHistory<S>,
}

impl<S: State> MachineSnapshot<S> {
    /// Snapshot the position described by `history`.
    pub fn capture(history: &StateHistory<S>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            current: history.current().clone(),
            history: history.clone(),
        }
    }

    /// Check the version and that the history chain ends at `current`.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        if !self.history.is_contiguous() {
            return Err(CheckpointError::ValidationFailed(
                "history transitions do not form a chain".to_string(),
            ));
        }
        if self.history.current() != &self.current {
            return Err(CheckpointError::ValidationFailed(format!(
                "current state '{}' does not match history tail '{}'",
                self.current.name(),
                self.history.current().name()
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateTransition;
    use crate::state_enum;

    state_enum! {
        enum Stage {
            Draft,
            Review,
            Published,
        }
        final: [Published]
    }

    fn history() -> StateHistory<Stage> {
        StateHistory::new(Stage::Draft)
            .record(StateTransition {
                from: Stage::Draft,
                to: Stage::Review,
                event: "Submit".to_string(),
                timestamp: Utc::now(),
            })
            .record(StateTransition {
                from: Stage::Review,
                to: Stage::Published,
                event: "Approve".to_string(),
                timestamp: Utc::now(),
            })
    }

    #[test]
    fn capture_takes_current_from_history() {
        let snapshot = MachineSnapshot::capture(&history());

        assert_eq!(snapshot.version, CHECKPOINT_VERSION);
        assert_eq!(snapshot.current, Stage::Published);
        assert_eq!(snapshot.history.len(), 3);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn json_round_trip_preserves_snapshot() {
        let snapshot = MachineSnapshot::capture(&history());

        let restored = MachineSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(restored, snapshot);
    }

    #[test]
    fn binary_round_trip_preserves_snapshot() {
        let snapshot = MachineSnapshot::capture(&history());

        let restored = MachineSnapshot::<Stage>::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();

        assert_eq!(restored.id, snapshot.id);
        assert_eq!(restored.history.path(), snapshot.history.path());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut snapshot = MachineSnapshot::capture(&history());
        snapshot.version = 99;

        assert!(matches!(
            snapshot.validate(),
            Err(CheckpointError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn rejects_mismatched_current_state() {
        let mut snapshot = MachineSnapshot::capture(&history());
        snapshot.current = Stage::Draft;

        assert!(matches!(
            snapshot.validate(),
            Err(CheckpointError::ValidationFailed(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_deserialization_error() {
        assert!(matches!(
            MachineSnapshot::<Stage>::from_json("{ not json"),
            Err(CheckpointError::DeserializationFailed(_))
        ));
    }
}
