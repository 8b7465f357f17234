//! Retrying fallible operations.
//!
//! - [`RetryStrategy`]: validated exponential backoff configuration
//! - [`LinearBackoff`]: fixed-step growth, the workflow engine's default
//! - [`Backoff`]: the delay policy trait both of the above implement
//! - [`RetryExecutor`]: runs an async operation under a strategy, retrying
//!   only errors the classifier considers transient

mod attempts;
mod backoff;
mod classify;
mod error;
mod executor;

pub(crate) use attempts::{run_attempts, LoopError};
pub use backoff::{Backoff, LinearBackoff, RetryStrategy, RetryStrategyBuilder};
pub use classify::{is_transient, is_transient_message, Classifier};
pub use error::{RetryError, StrategyError};
pub use executor::RetryExecutor;
