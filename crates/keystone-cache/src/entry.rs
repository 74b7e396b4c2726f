//! # Cache Entries
//!
//! One stored value plus the metadata that expiry and eviction read:
//! absolute expiry instant, creation time, and access bookkeeping.

use crate::time::TimestampMs;

#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    pub(crate) value: V,
    /// Absolute instant the entry dies. An entry is expired at this exact
    /// instant, so a zero TTL produces an entry that is born dead.
    pub(crate) expire_at_ms: TimestampMs,
    pub(crate) created_at_ms: TimestampMs,
    pub(crate) access_count: u64,
    /// Updated on every read or touch; eviction removes the minimum.
    pub(crate) last_accessed_ms: TimestampMs,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, now_ms: TimestampMs, ttl_ms: u64) -> Self {
        Self {
            value,
            expire_at_ms: now_ms.saturating_add(ttl_ms),
            created_at_ms: now_ms,
            access_count: 0,
            last_accessed_ms: now_ms,
        }
    }

    pub(crate) fn is_expired(&self, now_ms: TimestampMs) -> bool {
        now_ms >= self.expire_at_ms
    }

    pub(crate) fn record_access(&mut self, now_ms: TimestampMs) {
        self.access_count += 1;
        self.last_accessed_ms = now_ms;
    }
}
