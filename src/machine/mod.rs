//! Typed finite-state machines.
//!
//! [`StateMachine`] is a plain value driven through `&mut self`.
//! [`MachineHandle`] wraps one in a background task so it can be shared
//! between concurrent callers.

mod error;
mod event;
mod handle;
#[allow(clippy::module_inception)]
mod machine;

pub use error::{HookError, MachineError};
pub use event::Event;
pub use handle::{MachineHandle, DEFAULT_MAILBOX_CAPACITY};
pub use machine::{Hook, StateHooks, StateMachine};
