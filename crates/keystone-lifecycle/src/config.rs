//! # Manager Configuration
//!
//! Fixed defaults, a partial options struct for callers, and the merge of
//! the two. Cache enablement is the one knob that is construction-only;
//! everything else may be updated on a live manager.

use serde::{Deserialize, Serialize};

/// Deadline applied to each attempt of a guarded operation.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Retries after the first failed attempt of a guarded operation.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default lifetime for cached probe results: five minutes.
pub const DEFAULT_CACHE_TTL_MS: u64 = 300_000;

/// First retry delay; doubles per attempt.
pub const RETRY_BASE_DELAY_MS: u64 = 1_000;

/// Ceiling on the exponential retry delay.
pub const RETRY_MAX_DELAY_MS: u64 = 5_000;

/// Effective manager configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Verbose diagnostics for this manager.
    pub debug: bool,
    /// Per-attempt deadline for guarded operations.
    pub timeout_ms: u64,
    /// Retry budget after the first attempt.
    pub retries: u32,
    /// Whether the probe cache exists at all. Fixed at construction.
    pub cache: bool,
    /// Default TTL for cached values.
    pub cache_ttl_ms: u64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: DEFAULT_RETRIES,
            cache: true,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }
}

impl ManagerConfig {
    /// Overlay the set fields of `options` onto this configuration.
    pub fn apply(&mut self, options: &ManagerOptions) {
        if let Some(debug) = options.debug {
            self.debug = debug;
        }
        if let Some(timeout_ms) = options.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(retries) = options.retries {
            self.retries = retries;
        }
        if let Some(cache) = options.cache {
            self.cache = cache;
        }
        if let Some(cache_ttl_ms) = options.cache_ttl_ms {
            self.cache_ttl_ms = cache_ttl_ms;
        }
    }

    /// Defaults with `options` applied on top.
    #[must_use]
    pub fn merged(options: &ManagerOptions) -> Self {
        let mut config = Self::default();
        config.apply(options);
        config
    }
}

/// Caller-supplied overrides. Unset fields keep the defaults of whatever
/// configuration they are applied to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerOptions {
    pub debug: Option<bool>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
    pub cache: Option<bool>,
    pub cache_ttl_ms: Option<u64>,
}

impl ManagerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    #[must_use]
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn cache_ttl_ms(mut self, cache_ttl_ms: u64) -> Self {
        self.cache_ttl_ms = Some(cache_ttl_ms);
        self
    }
}
