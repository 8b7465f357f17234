//! Core State trait for state machine states.
//!
//! States are plain values. The machine keys its transition table on them,
//! so they must be hashable as well as comparable.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// All methods are pure. A state is a value describing where a machine
/// currently is; hooks and transitions are attached to it by the machine.
///
/// # Required Traits
///
/// - `Clone`: states are copied into history records
/// - `Eq` + `Hash`: states key the transition and hook tables
/// - `Debug`: diagnostics and error messages
/// - `Serialize` + `Deserialize`: snapshots
///
/// # Example
///
/// ```rust
/// use waypoint::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum OrderState {
///     Draft,
///     Paid,
///     Shipped,
///     Cancelled,
/// }
///
/// impl State for OrderState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Draft => "Draft",
///             Self::Paid => "Paid",
///             Self::Shipped => "Shipped",
///             Self::Cancelled => "Cancelled",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Shipped | Self::Cancelled)
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Cancelled)
///     }
/// }
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Check if this is an error state.
    ///
    /// Error states are usually also final, but this is not enforced.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Initial,
        Processing,
        Complete,
        Failed,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Initial => "Initial",
                Self::Processing => "Processing",
                Self::Complete => "Complete",
                Self::Failed => "Failed",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Complete | Self::Failed)
        }

        fn is_error(&self) -> bool {
            matches!(self, Self::Failed)
        }
    }

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(TestState::Initial.name(), "Initial");
        assert_eq!(TestState::Processing.name(), "Processing");
        assert_eq!(TestState::Complete.name(), "Complete");
        assert_eq!(TestState::Failed.name(), "Failed");
    }

    #[test]
    fn final_and_error_flags() {
        assert!(!TestState::Initial.is_final());
        assert!(TestState::Complete.is_final());
        assert!(!TestState::Complete.is_error());
        assert!(TestState::Failed.is_final());
        assert!(TestState::Failed.is_error());
    }

    #[test]
    fn states_can_key_a_hash_set() {
        let mut seen = HashSet::new();
        seen.insert(TestState::Initial);
        seen.insert(TestState::Initial);
        seen.insert(TestState::Processing);

        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&TestState::Processing));
    }

    #[test]
    fn state_serializes_correctly() {
        let state = TestState::Initial;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: TestState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
