//! # Error Kinds and Severity
//!
//! The closed taxonomy every Keystone failure is folded into. Severity and
//! recoverability are pure functions of the kind so the retry engine and the
//! logger can never disagree about how bad a failure is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller-side mistake: bad argument, unparseable input, out-of-range value.
    User,
    /// The runtime itself misbehaved or a capability is missing entirely.
    System,
    /// A remote endpoint or transport failed.
    Network,
    /// The operation was denied by a policy or permission check.
    Permission,
    /// The module was configured with invalid or conflicting settings.
    Config,
    /// The operation exceeded its deadline.
    Timeout,
    /// A payload failed schema or invariant validation.
    Validation,
    /// Nothing matched; the failure is unclassified.
    Unknown,
}

impl ErrorKind {
    /// Whether the retry engine may re-attempt an operation that failed
    /// with this kind.
    ///
    /// Network and timeout failures are transient by nature; user and config
    /// failures are retryable because the caller may fix the input between
    /// attempts. Permission, validation, and system failures will not change
    /// on a second try.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::User | Self::Config
        )
    }

    /// Severity implied by the kind.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::User | Self::Config => Severity::Low,
            Self::Network | Self::Timeout => Severity::Medium,
            Self::Permission | Self::Validation => Severity::High,
            Self::System | Self::Unknown => Severity::Critical,
        }
    }

    /// Default operator-facing message when the failing site supplied none.
    #[must_use]
    pub const fn default_user_message(self) -> &'static str {
        match self {
            Self::User => "The request was invalid. Check the provided input.",
            Self::System => "An internal error occurred. This is a bug in the runtime.",
            Self::Network => "A network request failed. Check connectivity and retry.",
            Self::Permission => "The operation was not permitted.",
            Self::Config => "The module is misconfigured. Review its settings.",
            Self::Timeout => "The operation took too long and was abandoned.",
            Self::Validation => "The data did not pass validation.",
            Self::Unknown => "An unexpected error occurred.",
        }
    }

    /// Fallback remedy for kinds that have a generally useful one.
    #[must_use]
    pub const fn default_remedy(self) -> Option<&'static str> {
        match self {
            Self::Network => Some("Verify the endpoint is reachable and retry the operation."),
            Self::Timeout => Some("Raise the timeout or investigate what is stalling the operation."),
            Self::Config => Some("Compare the module options against the documented defaults."),
            Self::User => Some("Correct the input named in the message and call again."),
            Self::Permission => Some("Request the missing permission before retrying."),
            Self::System | Self::Validation | Self::Unknown => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
            Self::Network => "network",
            Self::Permission => "permission",
            Self::Config => "config",
            Self::Timeout => "timeout",
            Self::Validation => "validation",
            Self::Unknown => "unknown",
        }
    }

    /// All kinds, in taxonomy order.
    #[must_use]
    pub const fn all() -> [ErrorKind; 8] {
        [
            Self::User,
            Self::System,
            Self::Network,
            Self::Permission,
            Self::Config,
            Self::Timeout,
            Self::Validation,
            Self::Unknown,
        ]
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How loudly a failure should be reported.
///
/// Ordered: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
