//! Events that drive a state machine.

use std::fmt::Debug;
use std::hash::Hash;

/// An input to a [`StateMachine`](super::StateMachine).
///
/// Events are usually enums whose variants carry payload. Routing only
/// looks at [`Event::kind`], so two events of the same kind are
/// indistinguishable to the transition table regardless of their payload.
///
/// # Example
///
/// ```rust
/// use waypoint::machine::Event;
///
/// enum DoorEvent {
///     Open,
///     Close,
///     Lock { code: u32 },
/// }
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// enum DoorEventKind {
///     Open,
///     Close,
///     Lock,
/// }
///
/// impl Event for DoorEvent {
///     type Kind = DoorEventKind;
///
///     fn kind(&self) -> DoorEventKind {
///         match self {
///             Self::Open => DoorEventKind::Open,
///             Self::Close => DoorEventKind::Close,
///             Self::Lock { .. } => DoorEventKind::Lock,
///         }
///     }
/// }
///
/// assert_eq!(DoorEvent::Lock { code: 1 }.kind(), DoorEvent::Lock { code: 2 }.kind());
/// ```
pub trait Event: Send + 'static {
    /// Payload-free discriminant used as the routing key
    type Kind: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}
