//! # Background Sweeper
//!
//! Periodic task that calls [`TtlCache::sweep`] on a shared store. The
//! returned handle is the only way to stop it; owners abort it during
//! teardown.

use crate::store::TtlCache;
use parking_lot::RwLock;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Spawn a task that sweeps `cache` every `period`.
///
/// The first sweep happens one full period after spawn, not immediately.
/// A zero period is clamped to one millisecond. Must be called from within
/// a tokio runtime.
pub fn spawn_sweeper<K, V>(
    cache: Arc<RwLock<TtlCache<K, V>>>,
    period: Duration,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let period = period.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so the cadence is
        // one full period between sweeps.
        ticker.tick().await;
        debug!(period_ms = period.as_millis() as u64, "cache sweeper started");
        loop {
            ticker.tick().await;
            cache.write().sweep();
        }
    })
}
