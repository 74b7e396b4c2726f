//! # Error Classifier
//!
//! Folds arbitrary failures into the [`ErrorKind`] taxonomy. Classification
//! is message-based: an ordered rule table of lowercase substrings, first
//! match wins. Already-classified errors pass through untouched apart from
//! gaining missing context, so wrapping an operation twice never reclassifies
//! its failure.

use crate::classified::{BoxError, ClassifiedError, ErrorContext};
use crate::codes;
use crate::kind::{ErrorKind, Severity};
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Substring rules in precedence order. Earlier entries win, so a message
/// like "connection timed out" classifies as network, not timeout.
const RULES: &[(ErrorKind, &[&str])] = &[
    (
        ErrorKind::Network,
        &["network", "fetch", "connection", "unreachable", "offline"],
    ),
    (ErrorKind::Timeout, &["timeout", "timed out", "deadline"]),
    (
        ErrorKind::Permission,
        &["permission", "denied", "not allowed", "forbidden"],
    ),
    (
        ErrorKind::System,
        &["not supported", "unsupported", "not implemented", "unavailable"],
    ),
    (ErrorKind::Config, &["config", "invalid", "missing option"]),
    (
        ErrorKind::User,
        &["parse", "type mismatch", "out of range", "bad input"],
    ),
];

/// Message-based classifier with a remedy table.
///
/// [`ErrorKind::Validation`] never appears in the rule table; validators
/// construct it explicitly when a payload fails a schema check.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    remedies: HashMap<String, String>,
}

impl ErrorClassifier {
    /// Classifier seeded with remedies for the kernel's own error codes.
    #[must_use]
    pub fn new() -> Self {
        let mut remedies = HashMap::new();
        remedies.insert(
            codes::MANAGER_DESTROYED.to_string(),
            "Construct a fresh manager; destroyed instances cannot be revived.".to_string(),
        );
        remedies.insert(
            codes::INIT_FAILED.to_string(),
            "Inspect the underlying cause, fix it, and construct a new instance.".to_string(),
        );
        remedies.insert(
            codes::OPERATION_TIMEOUT.to_string(),
            "Raise timeout_ms in the manager options or check for a stalled dependency.".to_string(),
        );
        remedies.insert(
            codes::DUPLICATE_MODULE.to_string(),
            "Pick a unique module name or deregister the existing one first.".to_string(),
        );
        Self { remedies }
    }

    /// Register a remedy for a specific error code, replacing any previous one.
    pub fn register_remedy(&mut self, code: impl Into<String>, remedy: impl Into<String>) {
        self.remedies.insert(code.into(), remedy.into());
    }

    /// Builder form of [`Self::register_remedy`].
    #[must_use]
    pub fn with_remedy(mut self, code: impl Into<String>, remedy: impl Into<String>) -> Self {
        self.register_remedy(code, remedy);
        self
    }

    /// Classify a failure observed at a module boundary.
    ///
    /// A [`ClassifiedError`] passes through with its kind and payload intact;
    /// it only gains `context` where it had none, and solutions if it carried
    /// none. Any other error is folded through the rule table and kept as the
    /// cause of the returned error.
    #[must_use]
    pub fn classify(&self, error: BoxError, context: ErrorContext) -> ClassifiedError {
        match error.downcast::<ClassifiedError>() {
            Ok(classified) => {
                let mut classified = (*classified).or_context(context);
                if classified.solutions.is_empty() {
                    classified.solutions =
                        self.solutions_for(classified.kind, classified.code.as_deref());
                }
                classified
            }
            Err(other) => {
                let message = other.to_string();
                let kind = Self::kind_of_message(&message);
                let solutions = self.solutions_for(kind, None);
                ClassifiedError::new(kind, message)
                    .with_context(context)
                    .with_solutions(solutions)
                    .with_source(other)
            }
        }
    }

    /// Classify and log at a level chosen by the derived severity.
    #[must_use]
    pub fn handle(&self, error: BoxError, context: ErrorContext) -> ClassifiedError {
        let classified = self.classify(error, context);
        match classified.severity {
            Severity::Low => debug!(
                module = %classified.context.module,
                method = %classified.context.method,
                kind = %classified.kind,
                code = ?classified.code,
                "{}", classified.message
            ),
            Severity::Medium => warn!(
                module = %classified.context.module,
                method = %classified.context.method,
                kind = %classified.kind,
                code = ?classified.code,
                "{}", classified.message
            ),
            Severity::High | Severity::Critical => error!(
                module = %classified.context.module,
                method = %classified.context.method,
                kind = %classified.kind,
                code = ?classified.code,
                "{}", classified.message
            ),
        }
        classified
    }

    /// Recoverability without full classification. Used by the retry engine
    /// to decide whether another attempt is worthwhile.
    #[must_use]
    pub fn is_recoverable(&self, error: &BoxError) -> bool {
        if let Some(classified) = error.downcast_ref::<ClassifiedError>() {
            return classified.recoverable;
        }
        Self::kind_of_message(&error.to_string()).is_recoverable()
    }

    /// Remedies for a failure: the code-specific remedy when one is
    /// registered, otherwise the kind's default, otherwise nothing.
    #[must_use]
    pub fn solutions_for(&self, kind: ErrorKind, code: Option<&str>) -> Vec<String> {
        if let Some(remedy) = code.and_then(|code| self.remedies.get(code)) {
            return vec![remedy.clone()];
        }
        match kind.default_remedy() {
            Some(remedy) => vec![remedy.to_string()],
            None => Vec::new(),
        }
    }

    /// Fold a message through the rule table.
    #[must_use]
    pub fn kind_of_message(message: &str) -> ErrorKind {
        let haystack = message.to_lowercase();
        for (kind, needles) in RULES {
            if needles.iter().any(|needle| haystack.contains(needle)) {
                return *kind;
            }
        }
        ErrorKind::Unknown
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}
