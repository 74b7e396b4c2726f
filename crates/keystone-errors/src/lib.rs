//! # Keystone Error Taxonomy
//!
//! Shared error model for every Keystone module: a closed set of error kinds,
//! a rich classified error carrying context and remediation hints, and a
//! message-based classifier that turns arbitrary failures into that shape.
//!
//! ## Design
//!
//! - Fallible operations return `Result<T, ClassifiedError>`; panics are
//!   reserved for programming-contract violations.
//! - Classification happens exactly once, at the boundary that first observes
//!   the failure. Errors that are already classified pass through with their
//!   kind intact and only gain missing context.
//! - Severity and recoverability are derived from the kind, never stored
//!   independently, so the two can never disagree.

pub mod classified;
pub mod classifier;
pub mod codes;
pub mod kind;

pub use classified::{BoxError, ClassifiedError, ErrorContext};
pub use classifier::ErrorClassifier;
pub use kind::{ErrorKind, Severity};
