//! # Module Trait
//!
//! The contract a feature manager implements. A module embeds a
//! [`ManagerCore`] and supplies `setup`/`teardown`; the provided methods
//! wire those into the core's single-flight initialization, guarded
//! execution, and teardown paths.
//!
//! Modules are constructed cheaply and synchronously. Initialization is a
//! separate step: either awaited explicitly through [`Module::ready`] or
//! driven in the background via [`spawn_initialize`], and every guarded
//! entry point awaits readiness before doing work.

use crate::core::{ManagerCore, ManagerStatus};
use async_trait::async_trait;
use keystone_errors::{BoxError, ClassifiedError};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::warn;

#[async_trait]
pub trait Module: Send + Sync {
    /// The kernel core this module embeds.
    fn core(&self) -> &ManagerCore;

    /// Module-specific setup. Runs at most once per instance, on the first
    /// caller through [`Module::ready`].
    async fn setup(&self) -> Result<(), BoxError>;

    /// Module-specific teardown, run by [`Module::destroy`] before the core
    /// is torn down. The default does nothing.
    async fn teardown(&self) -> Result<(), BoxError> {
        Ok(())
    }

    fn name(&self) -> &str {
        self.core().module()
    }

    /// Await readiness, running [`Module::setup`] if nobody has yet.
    ///
    /// Concurrent callers join the same in-flight setup. A settled failure
    /// is re-raised as-is; a destroyed module fails fast.
    async fn ready(&self) -> Result<(), ClassifiedError> {
        self.core().run_init(self.setup()).await
    }

    /// Explicit alias for [`Module::ready`], for call sites that read
    /// better as an imperative step.
    async fn initialize(&self) -> Result<(), ClassifiedError> {
        self.ready().await
    }

    /// Await readiness, then run `op` under the configured deadline and
    /// retry budget.
    async fn guarded<T, F, Fut>(&self, method: &str, op: F) -> Result<T, ClassifiedError>
    where
        Self: Sized,
        T: Send,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, BoxError>> + Send,
    {
        self.ready().await?;
        self.core().execute(method, op).await
    }

    /// Tear the module down. Idempotent: only the first caller runs
    /// [`Module::teardown`] and the core cleanup; later calls return
    /// immediately. A teardown failure is logged, never raised, so destroy
    /// always completes.
    async fn destroy(&self) {
        let core = self.core();
        if !core.begin_destroy() {
            return;
        }
        if let Err(error) = self.teardown().await {
            warn!(module = %core.module(), error = %error, "teardown failed during destroy");
        }
        core.finish_destroy();
    }

    fn status(&self) -> ManagerStatus {
        self.core().status()
    }
}

/// Construct-then-initialize helper: spawns [`Module::ready`] on the
/// runtime and hands back the instance together with a readiness handle.
/// The module is usable immediately; guarded calls made before setup
/// finishes simply join the in-flight initialization.
pub fn spawn_initialize<M>(module: Arc<M>) -> (Arc<M>, JoinHandle<Result<(), ClassifiedError>>)
where
    M: Module + ?Sized + 'static,
{
    let task = {
        let module = Arc::clone(&module);
        tokio::spawn(async move { module.ready().await })
    };
    (module, task)
}
