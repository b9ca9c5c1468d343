use crate::InitState;

/// Events emitted by a singleton during access.
///
/// These events are passed to the tracing callback set via `set_trace_callback`
/// and mirrored to the `tracing` subscriber at TRACE level.
///
/// # Examples
///
/// ```rust
/// use lazy_singleton::SingletonEvent;
///
/// let event = SingletonEvent::Construct { type_name: "i32", ok: true };
/// assert_eq!(event.to_string(), "construct { type_name: i32, ok: true }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingletonEvent {
    /// The construction routine ran. Emitted once per singleton, to the caller that ran it.
    Construct {
        /// The type name of the singleton (e.g., "i32", "lazy_singleton::logger::Logger")
        type_name: &'static str,
        /// Whether construction produced a value
        ok: bool,
    },

    /// The instance was requested.
    Get {
        /// The type name that was requested
        type_name: &'static str,
        /// Whether an instance was returned (false when construction failed)
        ok: bool,
    },

    /// The init guard was inspected without constructing.
    Peek {
        /// The type name that was inspected
        type_name: &'static str,
        /// The observed state
        state: InitState,
    },
}

impl std::fmt::Display for SingletonEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SingletonEvent::Construct { type_name, ok } => {
                write!(f, "construct {{ type_name: {}, ok: {} }}", type_name, ok)
            }
            SingletonEvent::Get { type_name, ok } => {
                write!(f, "get {{ type_name: {}, ok: {} }}", type_name, ok)
            }
            SingletonEvent::Peek { type_name, state } => {
                write!(f, "peek {{ type_name: {}, state: {} }}", type_name, state)
            }
        }
    }
}
