//! # Keystone Cache
//!
//! Key/value store with per-entry TTL, least-recently-used eviction at a
//! fixed capacity, and lazy expiry: reads drop dead entries on contact, and
//! a periodic sweep collects whatever reads never touched.
//!
//! ## Time
//!
//! The store never reads the wall clock directly. All expiry decisions go
//! through a [`TimeSource`], so tests drive the clock by hand and production
//! uses [`SystemTimeSource`].

mod entry;

pub mod store;
pub mod sweeper;
pub mod time;

pub use store::{CacheConfig, CacheStats, TtlCache};
pub use sweeper::spawn_sweeper;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource, TimestampMs};

/// Capacity used when none is configured.
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Entry lifetime used when an insert names no TTL: five minutes.
pub const DEFAULT_TTL_MS: u64 = 300_000;

/// How often the background sweeper wakes up: once a minute.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 60_000;
