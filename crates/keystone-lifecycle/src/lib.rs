//! # Keystone Lifecycle
//!
//! The kernel of the runtime: a reusable manager core that gives every
//! module the same lifecycle, eventing, caching, and error discipline.
//!
//! ## Shape
//!
//! A module embeds a [`ManagerCore`] and implements the [`Module`] trait.
//! The core owns the state machine (`created → initializing → ready |
//! failed → destroyed`), a [`keystone_bus::EventBus`] for lifecycle and
//! domain events, an optional TTL cache, and an
//! [`keystone_errors::ErrorClassifier`] so every failure leaves the module
//! as a [`ClassifiedError`].
//!
//! ## Guarantees
//!
//! - Construction is synchronous and cheap; no runtime is required until
//!   the first `ready()` call.
//! - Initialization is single-flight: concurrent callers share one setup
//!   run, and its outcome (success or failure) is settled permanently.
//! - `destroy()` is idempotent and wins exactly once; afterwards every
//!   operation is refused with [`keystone_errors::codes::MANAGER_DESTROYED`].
//! - Retryable operations back off on the fixed `1s, 2s, 4s, 5s, 5s...`
//!   schedule and honor per-attempt timeouts.
//!
//! ## Example
//!
//! ```ignore
//! struct Capability {
//!     core: ManagerCore,
//! }
//!
//! #[async_trait]
//! impl Module for Capability {
//!     fn core(&self) -> &ManagerCore {
//!         &self.core
//!     }
//!
//!     async fn setup(&self) -> Result<(), BoxError> {
//!         // acquire handles, warm caches
//!         Ok(())
//!     }
//! }
//! ```

pub mod config;
pub mod core;
pub mod module;
pub mod registry;
pub mod state;
pub mod topics;

pub use config::{
    ManagerConfig, ManagerOptions, DEFAULT_CACHE_TTL_MS, DEFAULT_RETRIES, DEFAULT_TIMEOUT_MS,
    RETRY_BASE_DELAY_MS, RETRY_MAX_DELAY_MS,
};
pub use core::{retry_delay, ManagerCore, ManagerStatus, SharedCache};
pub use module::{spawn_initialize, Module};
pub use registry::ModuleRegistry;
pub use state::ManagerState;

// Error types travel with the lifecycle API, so re-export the currency.
pub use keystone_errors::{BoxError, ClassifiedError, ErrorContext, ErrorKind};
