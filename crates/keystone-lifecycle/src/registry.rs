//! # Module Registry
//!
//! Optional composition layer for hosts that run several modules as one
//! unit: registration by name, bulk initialization in registration order,
//! bulk teardown in reverse, and aggregate health.
//!
//! The registry holds `Arc<dyn Module>`, so heterogeneous modules live in
//! one table. It snapshots the table before any await, never holding its
//! lock across module calls.

use crate::core::ManagerStatus;
use crate::module::Module;
use keystone_errors::{codes, ClassifiedError, ErrorClassifier, ErrorKind};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name-keyed table of modules, ordered by registration.
pub struct ModuleRegistry {
    modules: RwLock<Vec<(String, Arc<dyn Module>)>>,
    classifier: ErrorClassifier,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(Vec::new()),
            classifier: ErrorClassifier::new(),
        }
    }

    /// Add a module under a unique name. Names are the teardown and lookup
    /// keys, so a duplicate is refused rather than silently replaced.
    pub fn register(
        &self,
        name: impl Into<String>,
        module: Arc<dyn Module>,
    ) -> Result<(), ClassifiedError> {
        let name = name.into();
        let mut modules = self.modules.write();
        if modules.iter().any(|(existing, _)| *existing == name) {
            return Err(ClassifiedError::new(
                ErrorKind::Validation,
                format!("module '{name}' is already registered"),
            )
            .with_code(codes::DUPLICATE_MODULE)
            .with_solutions(
                self.classifier
                    .solutions_for(ErrorKind::Validation, Some(codes::DUPLICATE_MODULE)),
            ));
        }
        debug!(module = %name, "module registered");
        modules.push((name, module));
        Ok(())
    }

    /// Remove a module from the table without destroying it.
    pub fn deregister(&self, name: &str) -> Option<Arc<dyn Module>> {
        let mut modules = self.modules.write();
        let index = modules.iter().position(|(existing, _)| existing == name)?;
        let (_, module) = modules.remove(index);
        debug!(module = %name, "module deregistered");
        Some(module)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules
            .read()
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, module)| Arc::clone(module))
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.modules
            .read()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }

    /// Initialize every module in registration order.
    ///
    /// One failing module does not stop the rest; all failures are
    /// collected and returned together.
    pub async fn ready_all(&self) -> Result<(), Vec<ClassifiedError>> {
        let snapshot: Vec<(String, Arc<dyn Module>)> = self.modules.read().clone();
        let total = snapshot.len();
        let mut failures = Vec::new();

        for (name, module) in snapshot {
            if let Err(error) = module.ready().await {
                warn!(module = %name, error = %error, "module failed to initialize");
                failures.push(error);
            }
        }

        if failures.is_empty() {
            info!(modules = total, "all modules ready");
            Ok(())
        } else {
            Err(failures)
        }
    }

    /// Destroy every module in reverse registration order, so later
    /// modules that depend on earlier ones go down first.
    pub async fn destroy_all(&self) {
        let snapshot: Vec<(String, Arc<dyn Module>)> = self.modules.read().clone();
        for (name, module) in snapshot.into_iter().rev() {
            debug!(module = %name, "destroying module");
            module.destroy().await;
        }
        info!("all modules destroyed");
    }

    /// Status snapshot for every module, in registration order.
    #[must_use]
    pub fn status_all(&self) -> Vec<ManagerStatus> {
        self.modules
            .read()
            .iter()
            .map(|(_, module)| module.status())
            .collect()
    }

    /// True when every registered module is ready.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.modules
            .read()
            .iter()
            .all(|(_, module)| module.core().is_ready())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
