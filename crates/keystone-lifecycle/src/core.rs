//! # Manager Core
//!
//! The state every Keystone module embeds: lifecycle state, merged
//! configuration, its event bus, its classifier, and the optional probe
//! cache. The core owns the single-flight initialization cell and the
//! guarded execution path; the [`crate::Module`] trait wires a module's
//! `setup`/`teardown` into it.
//!
//! ## Concurrency
//!
//! Every method takes `&self`. Interior state sits behind short-lived
//! `parking_lot` locks that are never held across an await point or while
//! listener callbacks run.

use crate::config::{ManagerConfig, ManagerOptions, RETRY_BASE_DELAY_MS, RETRY_MAX_DELAY_MS};
use crate::state::ManagerState;
use crate::topics;
use keystone_bus::{EventBus, EventPayload, ListenerError, ListenerId, ListenerOptions};
use keystone_cache::{spawn_sweeper, CacheConfig, CacheStats, TtlCache};
use keystone_errors::{codes, BoxError, ClassifiedError, ErrorClassifier, ErrorContext, ErrorKind};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Probe cache shared between a core and its background sweeper.
pub type SharedCache = Arc<RwLock<TtlCache<String, Value>>>;

/// Exponential backoff for retry `attempt` (zero-based): base delay doubled
/// per attempt, capped at [`RETRY_MAX_DELAY_MS`].
#[must_use]
pub fn retry_delay(attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt);
    let delay_ms = RETRY_BASE_DELAY_MS
        .saturating_mul(factor)
        .min(RETRY_MAX_DELAY_MS);
    Duration::from_millis(delay_ms)
}

/// Point-in-time snapshot of a manager, cheap enough for health endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ManagerStatus {
    pub module: String,
    pub state: ManagerState,
    pub initialized: bool,
    pub initializing: bool,
    pub destroyed: bool,
    pub listener_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<usize>,
}

/// Kernel state embedded by every module.
pub struct ManagerCore {
    module: String,
    config: RwLock<ManagerConfig>,
    state: RwLock<ManagerState>,
    bus: EventBus,
    classifier: ErrorClassifier,
    cache: Option<SharedCache>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    init_cell: OnceCell<Result<(), ClassifiedError>>,
}

impl ManagerCore {
    /// Core with the global defaults overlaid by `options`.
    ///
    /// Construction is cheap and synchronous: no background work starts
    /// until [`Self::run_init`] is driven by the owning module.
    #[must_use]
    pub fn new(module: impl Into<String>, options: ManagerOptions) -> Self {
        Self::with_config(module, ManagerConfig::default(), options)
    }

    /// Core with module-specific defaults, then `options` overlaid.
    #[must_use]
    pub fn with_config(
        module: impl Into<String>,
        mut config: ManagerConfig,
        options: ManagerOptions,
    ) -> Self {
        config.apply(&options);
        let module = module.into();
        let cache = config.cache.then(|| {
            Arc::new(RwLock::new(TtlCache::new(CacheConfig {
                default_ttl_ms: config.cache_ttl_ms,
                ..CacheConfig::default()
            })))
        });
        debug!(module = %module, ?config, "manager core constructed");
        Self {
            module,
            config: RwLock::new(config),
            state: RwLock::new(ManagerState::Created),
            bus: EventBus::new(),
            classifier: ErrorClassifier::new(),
            cache,
            sweeper: Mutex::new(None),
            init_cell: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn state(&self) -> ManagerState {
        *self.state.read()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state() == ManagerState::Ready
    }

    #[must_use]
    pub fn is_initializing(&self) -> bool {
        self.state() == ManagerState::Initializing
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state() == ManagerState::Failed
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state() == ManagerState::Destroyed
    }

    /// Copy of the effective configuration.
    #[must_use]
    pub fn config(&self) -> ManagerConfig {
        self.config.read().clone()
    }

    #[must_use]
    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Apply runtime option changes and publish `options-updated`.
    ///
    /// Cache enablement is fixed at construction; a differing `cache` field
    /// is ignored with a warning. A new `cache_ttl_ms` applies to future
    /// inserts, not to entries already stored.
    pub fn update_options(&self, options: &ManagerOptions) {
        let applied = {
            let mut config = self.config.write();
            if let Some(cache) = options.cache {
                if cache != config.cache {
                    warn!(
                        module = %self.module,
                        "cache enablement is fixed at construction; ignoring change"
                    );
                }
            }
            let mut runtime = *options;
            runtime.cache = None;
            config.apply(&runtime);
            config.clone()
        };
        if let (Some(cache), Some(ttl_ms)) = (&self.cache, options.cache_ttl_ms) {
            cache.write().set_default_ttl(ttl_ms);
        }
        debug!(module = %self.module, "options updated");
        self.emit(
            topics::OPTIONS_UPDATED,
            &json!({
                "module": self.module,
                "debug": applied.debug,
                "timeout_ms": applied.timeout_ms,
                "retries": applied.retries,
                "cache_ttl_ms": applied.cache_ttl_ms,
            }),
        );
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Fail with a destroyed-manager error if this core was torn down.
    pub fn guard_active(&self, method: &str) -> Result<(), ClassifiedError> {
        if self.is_destroyed() {
            return Err(self.destroyed_error(method));
        }
        Ok(())
    }

    /// Run `setup` exactly once, no matter how many callers race here.
    ///
    /// The first caller drives the transition Created → Initializing →
    /// Ready/Failed; everyone else awaits the same outcome. The settled
    /// result is sticky: once failed, every later call re-raises the same
    /// classified error without re-running setup.
    pub async fn run_init<F>(&self, setup: F) -> Result<(), ClassifiedError>
    where
        F: Future<Output = Result<(), BoxError>>,
    {
        self.guard_active("initialize")?;
        let result = self
            .init_cell
            .get_or_init(|| async move {
                self.set_state(ManagerState::Initializing);
                info!(module = %self.module, "initializing");
                self.emit(topics::INITIALIZING, &json!({ "module": self.module }));
                match setup.await {
                    Ok(()) => {
                        self.set_state(ManagerState::Ready);
                        self.start_sweeper();
                        info!(module = %self.module, "ready");
                        self.emit(topics::READY, &json!({ "module": self.module }));
                        Ok(())
                    }
                    Err(error) => {
                        let mut classified = self.classifier.handle(
                            error,
                            ErrorContext::new(self.module.clone(), "initialize"),
                        );
                        if classified.code.is_none() {
                            classified.solutions = self
                                .classifier
                                .solutions_for(classified.kind, Some(codes::INIT_FAILED));
                            classified = classified.with_code(codes::INIT_FAILED);
                        }
                        self.set_state(ManagerState::Failed);
                        self.emit(topics::INIT_FAILED, &classified.to_payload());
                        Err(classified)
                    }
                }
            })
            .await;
        result.clone()
    }

    pub(crate) fn begin_destroy(&self) -> bool {
        let mut state = self.state.write();
        if *state == ManagerState::Destroyed {
            return false;
        }
        let from = *state;
        *state = ManagerState::Destroyed;
        drop(state);
        debug!(module = %self.module, from = %from, "destroying");
        true
    }

    pub(crate) fn finish_destroy(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }
        self.clear_cache();
        self.emit(topics::DESTROYED, &json!({ "module": self.module }));
        self.bus.clear();
        info!(module = %self.module, "destroyed");
    }

    // ------------------------------------------------------------------
    // Guarded execution
    // ------------------------------------------------------------------

    /// Run `op` under the configured deadline and retry budget.
    pub async fn execute<T, F, Fut>(&self, method: &str, op: F) -> Result<T, ClassifiedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BoxError>>,
    {
        let retries = self.config.read().retries;
        self.execute_with_retries(method, retries, op).await
    }

    /// Run `op` with an explicit retry budget.
    ///
    /// Each attempt gets the full configured deadline; an attempt that
    /// exceeds it is cancelled by drop and surfaces as a timeout-kind
    /// failure, which is itself retryable. Only recoverable failures are
    /// retried, with exponential backoff per [`retry_delay`]. The final
    /// failure is returned classified; intermediate failures are published
    /// on the `error` topic as they happen.
    pub async fn execute_with_retries<T, F, Fut>(
        &self,
        method: &str,
        max_retries: u32,
        mut op: F,
    ) -> Result<T, ClassifiedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BoxError>>,
    {
        let timeout_ms = self.config.read().timeout_ms;
        let deadline = Duration::from_millis(timeout_ms);
        let mut attempt: u32 = 0;
        loop {
            self.guard_active(method)?;
            let outcome = match tokio::time::timeout(deadline, op()).await {
                Ok(result) => result,
                Err(_) => Err(Box::new(self.timeout_error(method, timeout_ms)) as BoxError),
            };
            match outcome {
                Ok(value) => return Ok(value),
                Err(error) => {
                    let classified = self.handle_error(error, method);
                    if classified.recoverable && attempt < max_retries {
                        let delay = retry_delay(attempt);
                        attempt += 1;
                        warn!(
                            module = %self.module,
                            method,
                            attempt,
                            max_retries,
                            delay_ms = delay.as_millis() as u64,
                            kind = %classified.kind,
                            "retrying after recoverable failure"
                        );
                        self.emit(
                            topics::RETRY,
                            &json!({
                                "module": self.module,
                                "method": method,
                                "attempt": attempt,
                                "retries": max_retries,
                                "delay_ms": delay.as_millis() as u64,
                            }),
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(classified);
                }
            }
        }
    }

    /// Classify a failure at this manager's boundary, log it, and publish
    /// it on the `error` topic.
    pub fn handle_error(&self, error: BoxError, method: &str) -> ClassifiedError {
        let classified = self
            .classifier
            .handle(error, ErrorContext::new(self.module.clone(), method));
        self.emit(topics::ERROR, &classified.to_payload());
        classified
    }

    // ------------------------------------------------------------------
    // Probe cache
    // ------------------------------------------------------------------

    /// The shared cache, when caching was enabled at construction.
    #[must_use]
    pub fn cache(&self) -> Option<&SharedCache> {
        self.cache.as_ref()
    }

    /// Read through the cache, computing and storing on a miss.
    ///
    /// Concurrent callers with the same key are not deduplicated; both may
    /// compute and the later insert wins. The compute failure path is
    /// classified and published like any guarded failure, but not retried.
    pub async fn cached_or_compute<F, Fut>(
        &self,
        key: &str,
        ttl_ms: Option<u64>,
        compute: F,
    ) -> Result<Value, ClassifiedError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, BoxError>>,
    {
        self.guard_active("cached_or_compute")?;
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.write().get(key) {
                return Ok(hit.clone());
            }
        }
        let value = match compute().await {
            Ok(value) => value,
            Err(error) => return Err(self.handle_error(error, "cached_or_compute")),
        };
        if let Some(cache) = &self.cache {
            let mut store = cache.write();
            match ttl_ms {
                Some(ttl) => store.insert_with_ttl(key.to_string(), value.clone(), ttl),
                None => store.insert(key.to_string(), value.clone()),
            }
        }
        Ok(value)
    }

    /// Drop one cached key. False when caching is off or the key is absent.
    pub fn invalidate(&self, key: &str) -> bool {
        match &self.cache {
            Some(cache) => cache.write().remove(key).is_some(),
            None => false,
        }
    }

    /// Drop every cached value.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.write().clear();
        }
    }

    #[must_use]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.read().stats())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn on(
        &self,
        event: impl Into<String>,
        callback: impl Fn(&EventPayload) -> Result<(), ListenerError> + Send + Sync + 'static,
    ) -> ListenerId {
        self.bus.on(event, callback)
    }

    pub fn on_with(
        &self,
        event: impl Into<String>,
        callback: impl Fn(&EventPayload) -> Result<(), ListenerError> + Send + Sync + 'static,
        options: ListenerOptions,
    ) -> ListenerId {
        self.bus.on_with(event, callback, options)
    }

    pub fn once(
        &self,
        event: impl Into<String>,
        callback: impl Fn(&EventPayload) -> Result<(), ListenerError> + Send + Sync + 'static,
    ) -> ListenerId {
        self.bus.once(event, callback)
    }

    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        self.bus.off(event, id)
    }

    pub fn off_all(&self, event: &str) -> usize {
        self.bus.off_all(event)
    }

    pub fn emit(&self, event: &str, payload: &EventPayload) -> bool {
        self.bus.emit(event, payload)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn status(&self) -> ManagerStatus {
        let state = self.state();
        ManagerStatus {
            module: self.module.clone(),
            state,
            initialized: state == ManagerState::Ready,
            initializing: state == ManagerState::Initializing,
            destroyed: state == ManagerState::Destroyed,
            listener_count: self.bus.total_listeners(),
            cache_size: self.cache.as_ref().map(|cache| cache.read().len()),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn set_state(&self, next: ManagerState) {
        let mut state = self.state.write();
        let current = *state;
        if current == next {
            return;
        }
        if !current.can_transition_to(next) {
            drop(state);
            warn!(
                module = %self.module,
                from = %current,
                to = %next,
                "ignoring invalid state transition"
            );
            return;
        }
        *state = next;
        drop(state);
        debug!(module = %self.module, from = %current, to = %next, "state transition");
    }

    fn start_sweeper(&self) {
        let Some(cache) = &self.cache else { return };
        if self.is_destroyed() {
            return;
        }
        let period = Duration::from_millis(cache.read().config().sweep_interval_ms);
        let mut slot = self.sweeper.lock();
        if slot.is_some() {
            return;
        }
        *slot = Some(spawn_sweeper(Arc::clone(cache), period));
    }

    fn destroyed_error(&self, method: &str) -> ClassifiedError {
        ClassifiedError::new(
            ErrorKind::System,
            format!("{} manager has been destroyed", self.module),
        )
        .with_code(codes::MANAGER_DESTROYED)
        .with_user_message("This feature manager was shut down. Create a new instance.")
        .with_solutions(
            self.classifier
                .solutions_for(ErrorKind::System, Some(codes::MANAGER_DESTROYED)),
        )
        .with_context(ErrorContext::new(self.module.clone(), method))
    }

    fn timeout_error(&self, method: &str, timeout_ms: u64) -> ClassifiedError {
        ClassifiedError::new(
            ErrorKind::Timeout,
            format!("{method} timed out after {timeout_ms}ms"),
        )
        .with_code(codes::OPERATION_TIMEOUT)
        .with_context(ErrorContext::new(self.module.clone(), method))
    }
}

impl fmt::Debug for ManagerCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerCore")
            .field("module", &self.module)
            .field("state", &self.state())
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}
