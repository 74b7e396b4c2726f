//! # Event Bus Core
//!
//! Listener table and synchronous dispatch. One `RwLock` guards the table;
//! it is never held while listener callbacks run.

use crate::listener::{Callback, EventPayload, ListenerError, ListenerId, ListenerOptions, ListenerRecord};
use crate::DEFAULT_MAX_LISTENERS;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

struct BusInner {
    listeners: HashMap<String, Vec<ListenerRecord>>,
    next_id: u64,
    max_listeners: usize,
}

/// Synchronous in-process event bus.
///
/// All methods take `&self`; the bus is safe to share behind an `Arc` or to
/// embed directly in a manager.
pub struct EventBus {
    inner: RwLock<BusInner>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_listeners(DEFAULT_MAX_LISTENERS)
    }

    /// Bus with a custom advisory cap per event name.
    #[must_use]
    pub fn with_max_listeners(max_listeners: usize) -> Self {
        Self {
            inner: RwLock::new(BusInner {
                listeners: HashMap::new(),
                next_id: 0,
                max_listeners,
            }),
        }
    }

    /// Register a listener with default options.
    pub fn on(
        &self,
        event: impl Into<String>,
        callback: impl Fn(&EventPayload) -> Result<(), ListenerError> + Send + Sync + 'static,
    ) -> ListenerId {
        self.on_with(event, callback, ListenerOptions::default())
    }

    /// Register a listener that is removed after its first dispatch.
    pub fn once(
        &self,
        event: impl Into<String>,
        callback: impl Fn(&EventPayload) -> Result<(), ListenerError> + Send + Sync + 'static,
    ) -> ListenerId {
        self.on_with(event, callback, ListenerOptions::once())
    }

    /// Register a listener with explicit options.
    ///
    /// Listeners are kept sorted by descending priority; a tie keeps
    /// registration order. Exceeding the per-event cap logs a leak warning
    /// but the registration still succeeds.
    pub fn on_with(
        &self,
        event: impl Into<String>,
        callback: impl Fn(&EventPayload) -> Result<(), ListenerError> + Send + Sync + 'static,
        options: ListenerOptions,
    ) -> ListenerId {
        let event = event.into();
        let callback: Callback = Arc::new(callback);
        let mut inner = self.inner.write();

        let id = ListenerId(inner.next_id);
        inner.next_id += 1;

        let record = ListenerRecord {
            id,
            callback,
            once: options.once,
            priority: options.priority,
        };

        let cap = inner.max_listeners;
        let records = inner.listeners.entry(event.clone()).or_default();
        let position = records.partition_point(|existing| existing.priority >= options.priority);
        records.insert(position, record);

        if records.len() > cap {
            warn!(
                event = %event,
                listeners = records.len(),
                cap,
                "listener count exceeds cap; possible listener leak"
            );
        }
        debug!(event = %event, id = ?id, priority = options.priority, once = options.once, "listener registered");
        id
    }

    /// Remove one listener by id. Returns whether it was found.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        let mut inner = self.inner.write();
        let Some(records) = inner.listeners.get_mut(event) else {
            return false;
        };
        let before = records.len();
        records.retain(|record| record.id != id);
        let removed = records.len() < before;
        if records.is_empty() {
            inner.listeners.remove(event);
        }
        removed
    }

    /// Remove every listener for an event. Returns how many were removed.
    pub fn off_all(&self, event: &str) -> usize {
        let mut inner = self.inner.write();
        inner
            .listeners
            .remove(event)
            .map(|records| records.len())
            .unwrap_or(0)
    }

    /// Dispatch an event to every registered listener, in priority order.
    ///
    /// Returns whether any listener existed when dispatch started. Listener
    /// failures are logged and do not stop the remaining listeners.
    pub fn emit(&self, event: &str, payload: &EventPayload) -> bool {
        let snapshot: Vec<ListenerRecord> = {
            let inner = self.inner.read();
            match inner.listeners.get(event) {
                Some(records) if !records.is_empty() => records.clone(),
                _ => return false,
            }
        };

        let mut fired_once: Vec<ListenerId> = Vec::new();
        for record in &snapshot {
            if let Err(error) = (record.callback)(payload) {
                warn!(
                    event = %event,
                    id = ?record.id,
                    error = %error,
                    "listener failed during dispatch"
                );
            }
            if record.once {
                fired_once.push(record.id);
            }
        }

        if !fired_once.is_empty() {
            let mut inner = self.inner.write();
            let now_empty = match inner.listeners.get_mut(event) {
                Some(records) => {
                    records.retain(|record| !fired_once.contains(&record.id));
                    records.is_empty()
                }
                None => false,
            };
            if now_empty {
                inner.listeners.remove(event);
            }
        }
        true
    }

    /// Listeners currently registered for one event.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .read()
            .listeners
            .get(event)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Listeners across all events.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.inner.read().listeners.values().map(Vec::len).sum()
    }

    /// Event names with at least one listener.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.inner.read().listeners.keys().cloned().collect()
    }

    /// Drop every listener for every event.
    pub fn clear(&self) {
        self.inner.write().listeners.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("EventBus")
            .field("events", &inner.listeners.len())
            .field(
                "listeners",
                &inner.listeners.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}
