//! # Multi-Module Host Flows
//!
//! A host process owning several modules through one [`ModuleRegistry`]:
//! bring-up, aggregate health, partial failure, and teardown.
//!
//! ## Flows Tested:
//!
//! 1. **Bring-up / teardown**: every module sets up once and tears down once
//! 2. **Partial failure**: one broken module is reported, the rest stay ready
//! 3. **Naming**: duplicate registration is refused with a stable code
//! 4. **Heterogeneity**: different module types share one registry

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use keystone_errors::codes;
    use keystone_lifecycle::{
        BoxError, ClassifiedError, ErrorKind, ManagerCore, ManagerOptions, Module,
        ModuleRegistry,
    };

    use crate::support::{init_quiet_telemetry, CapabilityProbe};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Second module type for heterogeneity tests: counts guarded ticks.
    struct CounterModule {
        core: ManagerCore,
        ticks: AtomicU32,
    }

    impl CounterModule {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                core: ManagerCore::new(name, ManagerOptions::default()),
                ticks: AtomicU32::new(0),
            })
        }

        async fn tick(&self) -> Result<u32, ClassifiedError> {
            self.guarded("tick", || async {
                Ok::<_, BoxError>(self.ticks.fetch_add(1, Ordering::SeqCst) + 1)
            })
            .await
        }
    }

    #[async_trait]
    impl Module for CounterModule {
        fn core(&self) -> &ManagerCore {
            &self.core
        }

        async fn setup(&self) -> Result<(), BoxError> {
            Ok(())
        }
    }

    // =============================================================================
    // HOST FLOWS
    // =============================================================================

    /// Full host lifecycle: register, bring up, check health, tear down.
    #[tokio::test]
    async fn test_host_bring_up_and_teardown() {
        init_quiet_telemetry();
        let registry = ModuleRegistry::new();
        let clipboard = CapabilityProbe::new("clipboard", ManagerOptions::default());
        let storage = CapabilityProbe::new("storage", ManagerOptions::default());
        let camera = CapabilityProbe::new("camera", ManagerOptions::default());

        registry.register("clipboard", clipboard.clone()).expect("unique");
        registry.register("storage", storage.clone()).expect("unique");
        registry.register("camera", camera.clone()).expect("unique");
        assert!(!registry.is_healthy(), "nothing is ready yet");

        registry.ready_all().await.expect("all modules come up");
        assert!(registry.is_healthy());
        let statuses = registry.status_all();
        assert_eq!(statuses.len(), 3);
        assert!(statuses.iter().all(|status| status.initialized));

        registry.destroy_all().await;
        assert!(!registry.is_healthy());
        for probe in [&clipboard, &storage, &camera] {
            assert_eq!(probe.setup_count(), 1);
            assert_eq!(probe.teardown_count(), 1);
            assert!(probe.core().is_destroyed());
        }
    }

    /// One broken module is reported by name; the others still come up.
    #[tokio::test]
    async fn test_partial_failure_leaves_others_ready() {
        init_quiet_telemetry();
        let registry = ModuleRegistry::new();
        let good = CapabilityProbe::new("clipboard", ManagerOptions::default());
        let bad = CapabilityProbe::failing("gpu", ManagerOptions::default());

        registry.register("clipboard", good.clone()).expect("unique");
        registry.register("gpu", bad.clone()).expect("unique");

        let failures = registry.ready_all().await.expect_err("gpu fails");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].context.module, "gpu");
        assert_eq!(failures[0].kind, ErrorKind::Network);

        assert!(good.core().is_ready());
        assert!(bad.core().is_failed());
        assert!(!registry.is_healthy());
    }

    /// Names are teardown keys; a duplicate is refused with a stable code.
    #[tokio::test]
    async fn test_duplicate_name_is_refused() {
        init_quiet_telemetry();
        let registry = ModuleRegistry::new();
        registry
            .register("clipboard", CapabilityProbe::new("clipboard", ManagerOptions::default()))
            .expect("first registration");

        let error = registry
            .register("clipboard", CapabilityProbe::new("clipboard", ManagerOptions::default()))
            .expect_err("duplicate");

        assert_eq!(error.kind, ErrorKind::Validation);
        assert_eq!(error.code.as_deref(), Some(codes::DUPLICATE_MODULE));
        assert_eq!(registry.len(), 1);
    }

    /// Modules of different concrete types share one registry and one
    /// bring-up call.
    #[tokio::test]
    async fn test_heterogeneous_modules_share_one_registry() {
        init_quiet_telemetry();
        let registry = ModuleRegistry::new();
        let probe = CapabilityProbe::new("clipboard", ManagerOptions::default());
        let counter = CounterModule::new("counter");

        registry.register("clipboard", probe.clone()).expect("unique");
        registry.register("counter", counter.clone()).expect("unique");

        registry.ready_all().await.expect("both come up");
        assert_eq!(registry.names(), vec!["clipboard".to_string(), "counter".to_string()]);
        assert_eq!(counter.tick().await.expect("guarded op"), 1);
        assert_eq!(counter.tick().await.expect("guarded op"), 2);

        let fetched = registry.get("counter").expect("registered");
        assert_eq!(fetched.name(), "counter");
        assert!(fetched.core().is_ready());
    }
}
