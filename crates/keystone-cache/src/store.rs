//! # TTL Store
//!
//! The cache proper. Plain `&mut self` methods; callers that need sharing
//! wrap it in `Arc<RwLock<_>>` and the sweeper does the same.
//!
//! ## Expiry and eviction
//!
//! Expiry is lazy: `get`, `contains`, and `touch` drop a dead entry the
//! moment they see one, and [`TtlCache::sweep`] collects the rest in bulk.
//! Eviction is immediate: inserting a new key into a full store removes the
//! entry with the oldest `last_accessed` first.

use crate::entry::CacheEntry;
use crate::time::{SystemTimeSource, TimeSource};
use crate::{DEFAULT_MAX_SIZE, DEFAULT_SWEEP_INTERVAL_MS, DEFAULT_TTL_MS};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// Store tuning. `max_size` of zero disables the capacity bound entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub max_size: usize,
    pub default_ttl_ms: u64,
    pub sweep_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl_ms: DEFAULT_TTL_MS,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }
}

/// Point-in-time view of store health.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub len: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Hits over total lookups; zero when nothing was looked up yet.
    pub hit_rate: f64,
    /// Entries already past expiry that no read or sweep has dropped yet.
    pub expired_unswept: usize,
}

/// TTL cache with LRU eviction.
pub struct TtlCache<K, V> {
    config: CacheConfig,
    clock: Arc<dyn TimeSource>,
    entries: HashMap<K, CacheEntry<V>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    /// Store reading time from the given source instead of the wall clock.
    #[must_use]
    pub fn with_time_source(config: CacheConfig, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            config,
            clock,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Insert with the configured default TTL.
    pub fn insert(&mut self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.config.default_ttl_ms);
    }

    /// Insert with an explicit TTL. Overwriting an existing key never
    /// evicts; only a new key entering a full store does.
    pub fn insert_with_ttl(&mut self, key: K, value: V, ttl_ms: u64) {
        let now = self.clock.now_ms();
        if self.config.max_size > 0
            && !self.entries.contains_key(&key)
            && self.entries.len() >= self.config.max_size
        {
            self.evict_lru();
        }
        self.entries
            .insert(key, CacheEntry::new(value, now, ttl_ms));
    }

    /// Insert a batch under one TTL (the default when `None`).
    pub fn insert_many(&mut self, pairs: impl IntoIterator<Item = (K, V)>, ttl_ms: Option<u64>) {
        let ttl = ttl_ms.unwrap_or(self.config.default_ttl_ms);
        for (key, value) in pairs {
            self.insert_with_ttl(key, value, ttl);
        }
    }

    /// Look up a live entry, bumping its access metadata. An expired entry
    /// is dropped on contact and reported as a miss.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_ms();
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.misses += 1;
                return None;
            }
        };
        if expired {
            self.entries.remove(key);
            self.misses += 1;
            return None;
        }
        self.hits += 1;
        self.entries.get_mut(key).map(|entry| {
            entry.record_access(now);
            &entry.value
        })
    }

    /// Batch lookup; order mirrors `keys`.
    pub fn get_many(&mut self, keys: &[K]) -> Vec<Option<V>>
    where
        V: Clone,
    {
        keys.iter().map(|key| self.get(key).cloned()).collect()
    }

    /// Liveness check with the same lazy-expiry behavior as [`Self::get`],
    /// but without touching access metadata or the hit/miss counters.
    pub fn contains<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_ms();
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => return false,
        };
        if expired {
            self.entries.remove(key);
            return false;
        }
        true
    }

    /// Extend a live entry's expiry from now, leaving the value alone.
    /// Returns false if the key is absent or already expired.
    pub fn touch<Q>(&mut self, key: &Q, ttl_ms: Option<u64>) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_ms();
        let ttl = ttl_ms.unwrap_or(self.config.default_ttl_ms);
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => return false,
        };
        if expired {
            self.entries.remove(key);
            return false;
        }
        if let Some(entry) = self.entries.get_mut(key) {
            entry.expire_at_ms = now.saturating_add(ttl);
            entry.record_access(now);
            true
        } else {
            false
        }
    }

    /// Return the live value for `key`, or build, store, and return one.
    /// A hit bumps access metadata; a fresh insert starts clean.
    pub fn get_or_insert_with<F>(&mut self, key: K, ttl_ms: Option<u64>, factory: F) -> &V
    where
        F: FnOnce() -> V,
    {
        let now = self.clock.now_ms();
        let ttl = ttl_ms.unwrap_or(self.config.default_ttl_ms);

        let expired = self
            .entries
            .get(&key)
            .map(|entry| entry.is_expired(now))
            .unwrap_or(false);
        if expired {
            self.entries.remove(&key);
        }

        let is_miss = !self.entries.contains_key(&key);
        if is_miss {
            self.misses += 1;
            if self.config.max_size > 0 && self.entries.len() >= self.config.max_size {
                self.evict_lru();
            }
        } else {
            self.hits += 1;
        }

        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| CacheEntry::new(factory(), now, ttl));
        if !is_miss {
            entry.record_access(now);
        }
        &entry.value
    }

    /// Remove an entry regardless of expiry, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Remove a batch; returns how many keys were present.
    pub fn remove_many(&mut self, keys: &[K]) -> usize {
        keys.iter()
            .filter(|key| self.entries.remove(*key).is_some())
            .count()
    }

    /// Drop every expired entry. Returns how many were dropped.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let swept = before - self.entries.len();
        if swept > 0 {
            debug!(swept, remaining = self.entries.len(), "swept expired entries");
        }
        swept
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entry count including expired-but-unswept entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All stored keys, expired or not, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_ms();
        let expired_unswept = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(now))
            .count();
        let lookups = self.hits + self.misses;
        CacheStats {
            len: self.entries.len(),
            max_size: self.config.max_size,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
            expired_unswept,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Change the TTL applied to future inserts that name none.
    pub fn set_default_ttl(&mut self, ttl_ms: u64) {
        self.config.default_ttl_ms = ttl_ms;
    }

    fn evict_lru(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed_ms)
            .map(|(key, _)| key.clone());
        if let Some(key) = victim {
            self.entries.remove(&key);
            self.evictions += 1;
            debug!(
                remaining = self.entries.len(),
                "evicted least recently used entry"
            );
        }
    }
}
