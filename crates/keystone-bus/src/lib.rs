//! # Keystone Event Bus
//!
//! In-process publish/subscribe for manager lifecycles. Unlike a streaming
//! bus, dispatch here is synchronous: `emit` invokes every matching listener
//! before it returns, in priority order, so lifecycle observers see events in
//! the order the kernel produced them.
//!
//! ## Dispatch contract
//!
//! - Listeners run in descending priority; equal priorities keep
//!   registration order.
//! - Dispatch walks a snapshot of the listener list. Listeners added or
//!   removed during dispatch take effect from the next emit.
//! - A failing listener is logged and isolated; remaining listeners still run.
//! - Once-listeners fire at most once and are removed after the dispatch in
//!   which they fired.

pub mod bus;
pub mod listener;

pub use bus::EventBus;
pub use listener::{EventPayload, ListenerError, ListenerId, ListenerOptions};

/// Listener count per event name above which a leak warning is logged.
/// Registration always succeeds; the cap is advisory.
pub const DEFAULT_MAX_LISTENERS: usize = 10;
