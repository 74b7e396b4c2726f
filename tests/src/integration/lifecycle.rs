//! # Lifecycle Integration Flows
//!
//! Drives a module through its whole life the way a host would: construct,
//! await readiness (possibly from several places at once), observe the
//! state events, tear down.
//!
//! ## Flows Tested:
//!
//! 1. **Single-flight init**: concurrent `ready()` callers share one setup run
//! 2. **Settled failure**: a failed setup re-raises the same classified error
//! 3. **State events**: `initializing` / `ready` / `destroyed` in order
//! 4. **Idempotent destroy**: teardown runs once, later calls are no-ops
//! 5. **Destroyed guard**: every entry point fails fast after destroy

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use keystone_errors::codes;
    use keystone_lifecycle::{
        spawn_initialize, ErrorKind, ManagerOptions, ManagerState, Module,
    };
    use keystone_lifecycle::topics;

    use crate::support::{event_log, init_quiet_telemetry, record_into, CapabilityProbe};

    // =============================================================================
    // INITIALIZATION
    // =============================================================================

    /// Concurrent ready() callers all await the same setup run.
    #[tokio::test]
    async fn test_concurrent_ready_runs_setup_once() {
        init_quiet_telemetry();
        let probe = CapabilityProbe::new("clipboard", ManagerOptions::default());

        // Act: three callers race into initialization
        let (a, b, c) = tokio::join!(probe.ready(), probe.ready(), probe.ready());

        // Assert: one setup, everyone sees success
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(probe.setup_count(), 1, "setup must be single-flight");
        assert!(probe.core().is_ready());
    }

    /// Spawned background initialization resolves and leaves the module ready.
    #[tokio::test]
    async fn test_spawn_initialize_resolves_in_background() {
        init_quiet_telemetry();
        let (probe, handle) =
            spawn_initialize(CapabilityProbe::new("storage", ManagerOptions::default()));

        handle
            .await
            .expect("init task must not panic")
            .expect("setup succeeds");
        assert!(probe.core().is_ready());
        assert_eq!(probe.setup_count(), 1);
    }

    /// A failed setup settles: later callers get the identical classified
    /// error without setup running again.
    #[tokio::test]
    async fn test_failed_setup_is_settled_and_sticky() {
        init_quiet_telemetry();
        let probe = CapabilityProbe::failing("gpu", ManagerOptions::default());

        let first = probe.ready().await.expect_err("setup fails");
        let second = probe.ready().await.expect_err("still failed");

        assert_eq!(probe.setup_count(), 1, "failure must not re-run setup");
        assert_eq!(first.id, second.id, "the settled error is re-raised verbatim");
        assert_eq!(first.kind, ErrorKind::Network, "message-driven classification");
        assert_eq!(first.context.module, "gpu");
        assert_eq!(first.context.method, "initialize");
        assert!(probe.core().is_failed());
    }

    /// Guarded operations re-raise the settled init failure too.
    #[tokio::test]
    async fn test_guarded_op_reraises_settled_failure() {
        init_quiet_telemetry();
        let probe = CapabilityProbe::failing("gpu", ManagerOptions::default());

        let init_err = probe.ready().await.expect_err("setup fails");
        let op_err = probe
            .guarded("read", || async { Ok::<_, keystone_lifecycle::BoxError>(7) })
            .await
            .expect_err("guarded must surface init failure");

        assert_eq!(op_err.id, init_err.id);
        assert_eq!(probe.setup_count(), 1);
    }

    // =============================================================================
    // STATE EVENTS
    // =============================================================================

    /// The bus sees initializing, ready, destroyed in that order, and is
    /// cleared afterwards.
    #[tokio::test]
    async fn test_lifecycle_events_in_order() {
        init_quiet_telemetry();
        let probe = CapabilityProbe::new("clipboard", ManagerOptions::default());
        let log = event_log();
        probe.core().on(topics::INITIALIZING, record_into(&log, "initializing"));
        probe.core().on(topics::READY, record_into(&log, "ready"));
        probe.core().on(topics::DESTROYED, record_into(&log, "destroyed"));

        probe.ready().await.expect("setup succeeds");
        probe.destroy().await;

        assert_eq!(*log.lock(), vec!["initializing", "ready", "destroyed"]);
        assert_eq!(
            probe.core().bus().total_listeners(),
            0,
            "destroy must clear listeners"
        );
    }

    /// Status snapshots track the lifecycle.
    #[tokio::test]
    async fn test_status_tracks_lifecycle() {
        init_quiet_telemetry();
        let probe = CapabilityProbe::new("clipboard", ManagerOptions::default());

        let created = probe.status();
        assert_eq!(created.state, ManagerState::Created);
        assert!(!created.initialized && !created.destroyed);
        assert_eq!(created.cache_size, Some(0));

        probe.ready().await.expect("setup succeeds");
        let ready = probe.status();
        assert!(ready.initialized);
        assert_eq!(ready.state, ManagerState::Ready);
        assert_eq!(ready.module, "clipboard");

        probe.destroy().await;
        let destroyed = probe.status();
        assert!(destroyed.destroyed && !destroyed.initialized);
    }

    // =============================================================================
    // DESTROY
    // =============================================================================

    /// Destroy is idempotent: one teardown, one destroyed event.
    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        init_quiet_telemetry();
        let probe = CapabilityProbe::new("clipboard", ManagerOptions::default());
        probe.ready().await.expect("setup succeeds");

        let log = event_log();
        probe.core().on(topics::DESTROYED, record_into(&log, "destroyed"));

        tokio::join!(probe.destroy(), probe.destroy());
        probe.destroy().await;

        assert_eq!(probe.teardown_count(), 1, "teardown must run exactly once");
        assert_eq!(log.lock().len(), 1, "destroyed event fires exactly once");
    }

    /// Destroy without prior init still tears down and settles the state.
    #[tokio::test]
    async fn test_destroy_without_init() {
        init_quiet_telemetry();
        let probe = CapabilityProbe::new("clipboard", ManagerOptions::default());

        probe.destroy().await;

        assert_eq!(probe.setup_count(), 0);
        assert_eq!(probe.teardown_count(), 1);
        assert!(probe.core().is_destroyed());
    }

    /// After destroy, both ready() and guarded ops refuse with the
    /// destroyed-manager contract error.
    #[tokio::test]
    async fn test_post_destroy_operations_are_refused() {
        init_quiet_telemetry();
        let probe = CapabilityProbe::new("clipboard", ManagerOptions::default());
        probe.ready().await.expect("setup succeeds");
        probe.destroy().await;

        let ready_err = probe.ready().await.expect_err("destroyed manager");
        let op_err = probe
            .guarded("read", || async { Ok::<_, keystone_lifecycle::BoxError>(1) })
            .await
            .expect_err("destroyed manager");

        for error in [ready_err, op_err] {
            assert_eq!(error.kind, ErrorKind::System);
            assert_eq!(error.code.as_deref(), Some(codes::MANAGER_DESTROYED));
            assert!(!error.recoverable, "contract violations are fatal");
        }
    }

    /// A destroy landing mid-initialization wins: the module ends up
    /// destroyed and guarded entry points stay closed.
    #[tokio::test(start_paused = true)]
    async fn test_destroy_during_init_wins() {
        init_quiet_telemetry();
        let probe = CapabilityProbe::slow(
            "camera",
            ManagerOptions::default(),
            Duration::from_millis(50),
        );

        let init = tokio::spawn({
            let probe = Arc::clone(&probe);
            async move { probe.ready().await }
        });
        tokio::task::yield_now().await;
        assert!(probe.core().is_initializing());

        probe.destroy().await;
        let _ = init.await.expect("init task must not panic");

        assert_eq!(probe.core().state(), ManagerState::Destroyed);
        assert!(probe
            .guarded("read", || async { Ok::<_, keystone_lifecycle::BoxError>(1) })
            .await
            .is_err());
    }
}
