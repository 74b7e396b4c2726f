//! # Lifecycle Event Topics
//!
//! Names every manager publishes on its own bus. Payloads are JSON objects
//! that always carry a `module` field; the error-shaped topics additionally
//! carry the serialized classified error.

/// Setup started. Payload: `{ module }`.
pub const INITIALIZING: &str = "initializing";

/// Setup succeeded. Payload: `{ module }`.
pub const READY: &str = "ready";

/// Setup failed and the manager settled in the failed state.
/// Payload: the classified error.
pub const INIT_FAILED: &str = "init-failed";

/// A guarded operation failed. Payload: the classified error.
pub const ERROR: &str = "error";

/// A recoverable failure is about to be retried.
/// Payload: `{ module, method, attempt, retries, delay_ms }`.
pub const RETRY: &str = "retry";

/// The manager was torn down. Payload: `{ module }`.
pub const DESTROYED: &str = "destroyed";

/// Runtime options changed. Payload: the applied configuration.
pub const OPTIONS_UPDATED: &str = "options-updated";
