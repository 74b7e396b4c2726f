//! # Classified Errors
//!
//! [`ClassifiedError`] is the single error currency of the kernel: every
//! fallible operation surfaces one. It owns its message and context, derives
//! severity and recoverability from its [`ErrorKind`], and may reference the
//! original failure as a shared cause without owning it exclusively.

use crate::kind::{ErrorKind, Severity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Boxed error type accepted at module boundaries before classification.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Milliseconds since the Unix epoch.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Where a failure was observed: owning module, method, and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Name of the module that observed the failure.
    pub module: String,
    /// Method or operation that was executing.
    pub method: String,
    /// Capture time, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Optional sanitized snapshot of the inputs involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

impl ErrorContext {
    #[must_use]
    pub fn new(module: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            method: method.into(),
            timestamp_ms: now_ms(),
            input: None,
        }
    }

    #[must_use]
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    /// An empty context, for errors created before any boundary is known.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new("", "")
    }

    pub(crate) fn is_placeholder(&self) -> bool {
        self.module.is_empty() && self.method.is_empty()
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::unknown()
    }
}

/// A fully classified failure.
///
/// Construction through [`ClassifiedError::new`] derives `severity` and
/// `recoverable` from the kind; the builder methods only fill in the
/// descriptive fields. The original failure, when available, is kept as a
/// shared cause and surfaced through [`StdError::source`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedError {
    /// Unique identity of this failure instance.
    pub id: Uuid,
    /// Taxonomy kind.
    pub kind: ErrorKind,
    /// Severity derived from the kind.
    pub severity: Severity,
    /// Whether the retry engine may re-attempt, derived from the kind.
    pub recoverable: bool,
    /// Developer-facing message.
    pub message: String,
    /// Operator-facing message, safe to show outside logs.
    pub user_message: String,
    /// Stable machine-readable code, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Suggested remediation steps, most specific first.
    pub solutions: Vec<String>,
    /// Where and when the failure was observed.
    pub context: ErrorContext,
    #[serde(skip)]
    source: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl ClassifiedError {
    /// Create an error of the given kind with derived severity and
    /// recoverability and an empty context.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            severity: kind.severity(),
            recoverable: kind.is_recoverable(),
            message: message.into(),
            user_message: kind.default_user_message().to_string(),
            code: None,
            solutions: Vec::new(),
            context: ErrorContext::unknown(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_user_message(mut self, user_message: impl Into<String>) -> Self {
        self.user_message = user_message.into();
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: Value) -> Self {
        self.context.input = Some(input);
        self
    }

    #[must_use]
    pub fn with_solutions(mut self, solutions: Vec<String>) -> Self {
        self.solutions = solutions;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<Arc<dyn StdError + Send + Sync + 'static>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Fill context from `fallback` where this error has none, without
    /// overwriting anything the failing site already recorded.
    #[must_use]
    pub fn or_context(mut self, fallback: ErrorContext) -> Self {
        if self.context.is_placeholder() {
            let input = self.context.input.take();
            self.context = fallback;
            if input.is_some() {
                self.context.input = input;
            }
        }
        self
    }

    /// Serialize for event payloads and structured logs. The cause chain is
    /// not serialized; only the classified shape travels.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl StdError for ClassifiedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.source {
            Some(source) => Some(&**source),
            None => None,
        }
    }
}
