//! Waypoint: procedural control flow for async Rust
//!
//! Waypoint collects the pieces that keep a multi-step process on track:
//!
//! - **Machines**: typed finite-state machines keyed by state and event kind,
//!   with transactional enter/exit hooks, history and snapshots
//! - **Workflows**: ordered steps with dependency checks, per-step retry and
//!   saga-style compensation in reverse order
//! - **Retry**: exponential backoff with transient-error classification and
//!   cancellation
//! - **Guards and decisions**: accumulating checks and predicate-based
//!   selection, optionally escalating to an injected [`InferenceClient`]
//!
//! Step bodies are stillwater effects run against the caller's environment.
//! The library emits `tracing` events and installs no subscriber.
//!
//! # Example
//!
//! ```rust
//! use waypoint::builder::StateMachineBuilder;
//! use waypoint::machine::Event;
//! use waypoint::state_enum;
//!
//! state_enum! {
//!     enum Order {
//!         Placed,
//!         Paid,
//!         Shipped,
//!     }
//!     final: [Shipped]
//! }
//!
//! enum OrderEvent {
//!     Pay { amount_cents: u64 },
//!     Ship,
//! }
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash)]
//! enum OrderEventKind {
//!     Pay,
//!     Ship,
//! }
//!
//! impl Event for OrderEvent {
//!     type Kind = OrderEventKind;
//!
//!     fn kind(&self) -> OrderEventKind {
//!         match self {
//!             Self::Pay { .. } => OrderEventKind::Pay,
//!             Self::Ship => OrderEventKind::Ship,
//!         }
//!     }
//! }
//!
//! let mut machine = StateMachineBuilder::<Order, OrderEvent>::new()
//!     .initial(Order::Placed)
//!     .transition(Order::Placed, OrderEventKind::Pay, Order::Paid)
//!     .transition(Order::Paid, OrderEventKind::Ship, Order::Shipped)
//!     .build()
//!     .unwrap();
//!
//! machine.transition(&OrderEvent::Pay { amount_cents: 1999 }).unwrap();
//! machine.transition(&OrderEvent::Ship).unwrap();
//!
//! assert!(machine.is_final());
//! assert_eq!(machine.history().len(), 3);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod decision;
pub mod guard;
pub mod inference;
pub mod machine;
pub mod retry;
pub mod workflow;

// Re-export commonly used types
pub use core::{Guard, State, StateHistory, StateTransition};
pub use inference::InferenceClient;
