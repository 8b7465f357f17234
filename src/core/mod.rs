//! Core types shared by every component.
//!
//! - State definitions via the `State` trait
//! - Guard predicates
//! - History of visited states
//!
//! Nothing in this module performs I/O.

mod guard;
mod history;
mod state;
pub(crate) mod unwind;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::State;
