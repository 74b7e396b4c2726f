//! # Infrastructure Error Codes
//!
//! Well-known codes stamped on failures raised by the kernel itself, as
//! opposed to failures surfaced by module operations. Remedies for these are
//! seeded into every [`crate::ErrorClassifier`].

/// A guarded method was called on a destroyed manager.
pub const MANAGER_DESTROYED: &str = "MANAGER_DESTROYED";

/// Module setup failed; the manager settled in the failed state.
pub const INIT_FAILED: &str = "INIT_FAILED";

/// A guarded operation exceeded the configured deadline.
pub const OPERATION_TIMEOUT: &str = "OPERATION_TIMEOUT";

/// A module was registered under a name that is already taken.
pub const DUPLICATE_MODULE: &str = "DUPLICATE_MODULE";
