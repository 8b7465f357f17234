//! Declaring simple state enums.

/// Declare a fieldless enum and implement [`State`](crate::core::State) for it.
///
/// The enum derives everything `State` requires, so it can be used as a
/// transition table key and stored in snapshots.
///
/// # Example
///
/// ```
/// use waypoint::core::State;
/// use waypoint::state_enum;
///
/// state_enum! {
///     pub enum OrderState {
///         Placed,
///         Paid,
///         Shipped,
///         Cancelled,
///     }
///     final: [Shipped, Cancelled]
///     error: [Cancelled]
/// }
///
/// assert_eq!(OrderState::Paid.name(), "Paid");
/// assert!(OrderState::Cancelled.is_error());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
        $(error: [$($error:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    _ => false,
                }
            }

            fn is_error(&self) -> bool {
                match self {
                    $($(Self::$error => true,)*)?
                    _ => false,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::State;
    use std::collections::HashSet;

    state_enum! {
        enum Phase {
            Queued,
            Running,
            Succeeded,
            Aborted,
        }
        final: [Succeeded, Aborted]
        error: [Aborted]
    }

    #[test]
    fn generates_names_and_flags() {
        assert_eq!(Phase::Queued.name(), "Queued");
        assert!(!Phase::Running.is_final());
        assert!(Phase::Succeeded.is_final());
        assert!(!Phase::Succeeded.is_error());
        assert!(Phase::Aborted.is_final());
        assert!(Phase::Aborted.is_error());
    }

    #[test]
    fn generated_enum_is_hashable() {
        let set: HashSet<Phase> = [Phase::Queued, Phase::Queued, Phase::Running]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn flags_are_optional() {
        state_enum! {
            pub enum Toggle {
                On,
                Off,
            }
        }

        assert!(!Toggle::On.is_final());
        assert!(!Toggle::Off.is_error());
    }
}
