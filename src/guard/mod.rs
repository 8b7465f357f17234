//! Guard evaluation: accumulate every failed precondition instead of
//! stopping at the first one.
//!
//! # Example
//!
//! ```rust
//! use waypoint::guard::{GuardCheck, GuardEvaluator};
//!
//! struct Order { items: usize, paid: bool }
//!
//! let checks = vec![
//!     GuardCheck::new("has_items", |o: &Order| o.items > 0, "order is empty"),
//!     GuardCheck::new("paid", |o: &Order| o.paid, "order is unpaid"),
//! ];
//!
//! let result = GuardEvaluator::new().check(&Order { items: 0, paid: false }, &checks);
//!
//! assert!(!result.can_proceed);
//! assert_eq!(result.messages(), vec!["order is empty", "order is unpaid"]);
//! ```

mod check;
mod evaluator;

pub use check::{CheckFailure, GuardCheck};
pub use evaluator::{GuardEvaluator, GuardResult, DEFAULT_SUGGESTION_TIMEOUT};
