//! # Listener Records
//!
//! Registration state kept per listener: the callback, its priority, the
//! once flag, and the [`ListenerId`] handed back for removal. Closures have
//! no identity in Rust, so removal goes through the id rather than through
//! callback equality.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Payload delivered to listeners. Event producers own the payload; listeners
/// only borrow it for the duration of the dispatch.
pub type EventPayload = Value;

/// Error a listener may surface. Dispatch logs it and moves on.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared callback invoked on every matching emit.
pub(crate) type Callback = Arc<dyn Fn(&EventPayload) -> Result<(), ListenerError> + Send + Sync>;

/// Opaque handle identifying one registration. Ids are unique per bus and
/// never reused, so a stale id after removal is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Options applied at registration time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Remove the listener after its first dispatch.
    pub once: bool,
    /// Higher priorities run earlier. Default 0; negatives run last.
    pub priority: i32,
}

impl ListenerOptions {
    #[must_use]
    pub fn once() -> Self {
        Self {
            once: true,
            priority: 0,
        }
    }

    #[must_use]
    pub fn priority(priority: i32) -> Self {
        Self {
            once: false,
            priority,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[derive(Clone)]
pub(crate) struct ListenerRecord {
    pub(crate) id: ListenerId,
    pub(crate) callback: Callback,
    pub(crate) once: bool,
    pub(crate) priority: i32,
}

impl fmt::Debug for ListenerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("id", &self.id)
            .field("once", &self.once)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
