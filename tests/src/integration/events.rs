//! # Event Flows
//!
//! The bus as a host sees it through a manager: domain events out of a
//! module, lifecycle notifications in order, and the dispatch guarantees
//! (priority, once, isolation) observed from the listening side.
//!
//! ## Flows Tested:
//!
//! 1. **Priority dispatch**: descending priority, registration order on ties
//! 2. **Once**: a once-listener sees exactly one emit
//! 3. **Isolation**: one failing listener never starves the others
//! 4. **Removal**: by id and by event name
//! 5. **Domain events**: module-emitted payloads reach host listeners intact

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use keystone_bus::ListenerOptions;
    use keystone_lifecycle::topics;
    use keystone_lifecycle::{ManagerCore, ManagerOptions, Module};
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use crate::support::{event_log, init_quiet_telemetry, record_into, CapabilityProbe};

    fn bare_core() -> ManagerCore {
        ManagerCore::new("clipboard", ManagerOptions::new().cache(false))
    }

    // =============================================================================
    // DISPATCH GUARANTEES
    // =============================================================================

    /// Listeners run in descending priority; equal priorities keep their
    /// registration order.
    #[test]
    fn test_priority_order_with_stable_ties() {
        init_quiet_telemetry();
        let core = bare_core();
        let log = event_log();

        core.on("changed", record_into(&log, "default-0"));
        core.on_with("changed", record_into(&log, "high-10a"), ListenerOptions::priority(10));
        core.on_with("changed", record_into(&log, "low-neg5"), ListenerOptions::priority(-5));
        core.on_with("changed", record_into(&log, "high-10b"), ListenerOptions::priority(10));
        core.on_with("changed", record_into(&log, "mid-1"), ListenerOptions::priority(1));

        assert!(core.emit("changed", &json!({})));

        assert_eq!(
            *log.lock(),
            vec!["high-10a", "high-10b", "mid-1", "default-0", "low-neg5"]
        );
    }

    /// Across three emits, a once-listener fires on the first only;
    /// persistent ones keep firing.
    #[test]
    fn test_once_listener_fires_exactly_once() {
        init_quiet_telemetry();
        let core = bare_core();
        let log = event_log();

        core.once("changed", record_into(&log, "once"));
        core.on("changed", record_into(&log, "always"));

        core.emit("changed", &json!({}));
        core.emit("changed", &json!({}));
        core.emit("changed", &json!({}));

        assert_eq!(*log.lock(), vec!["once", "always", "always", "always"]);
        assert_eq!(core.bus().listener_count("changed"), 1);
    }

    /// A listener that errors is logged and skipped; the rest of the
    /// dispatch still happens.
    #[test]
    fn test_failing_listener_is_isolated() {
        init_quiet_telemetry();
        let core = bare_core();
        let log = event_log();

        core.on_with(
            "changed",
            |_payload| Err("listener exploded".into()),
            ListenerOptions::priority(100),
        );
        core.on("changed", record_into(&log, "survivor"));

        assert!(core.emit("changed", &json!({})), "dispatch still counts");
        core.emit("changed", &json!({}));

        assert_eq!(*log.lock(), vec!["survivor", "survivor"]);
    }

    /// Removal by id affects that registration only; off_all drains the
    /// event.
    #[test]
    fn test_removal_by_id_and_by_event() {
        init_quiet_telemetry();
        let core = bare_core();
        let log = event_log();

        let first = core.on("changed", record_into(&log, "first"));
        core.on("changed", record_into(&log, "second"));

        assert!(core.off("changed", first));
        assert!(!core.off("changed", first), "id is gone");
        core.emit("changed", &json!({}));
        assert_eq!(*log.lock(), vec!["second"]);

        assert_eq!(core.off_all("changed"), 1);
        assert!(!core.emit("changed", &json!({})), "nobody listening");
    }

    /// The listener cap is advisory: the twelfth listener registers and
    /// still gets dispatched.
    #[test]
    fn test_listener_cap_is_advisory() {
        init_quiet_telemetry();
        let core = bare_core();
        let log = event_log();

        for _ in 0..12 {
            core.on("changed", record_into(&log, "hit"));
        }
        core.emit("changed", &json!({}));

        assert_eq!(core.bus().listener_count("changed"), 12);
        assert_eq!(log.lock().len(), 12);
    }

    // =============================================================================
    // HOST-FACING EVENTS
    // =============================================================================

    /// A module's domain events reach host listeners with the payload
    /// intact.
    #[tokio::test]
    async fn test_domain_events_reach_host_listeners() {
        init_quiet_telemetry();
        let probe = CapabilityProbe::new("clipboard", ManagerOptions::default());
        probe.ready().await.expect("setup succeeds");

        let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        probe.core().on("clipboard:changed", {
            let seen = Arc::clone(&seen);
            move |payload| {
                seen.lock().push(payload.clone());
                Ok(())
            }
        });

        probe
            .core()
            .emit("clipboard:changed", &json!({ "format": "text/plain", "bytes": 42 }));

        let events = seen.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["format"], "text/plain");
        assert_eq!(events[0]["bytes"], 42);
    }

    /// Runtime option changes are announced with the effective values.
    #[test]
    fn test_options_updated_event_carries_config() {
        init_quiet_telemetry();
        let core = bare_core();
        let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        core.on(topics::OPTIONS_UPDATED, {
            let seen = Arc::clone(&seen);
            move |payload| {
                seen.lock().push(payload.clone());
                Ok(())
            }
        });

        core.update_options(&ManagerOptions::new().timeout_ms(5_000).retries(7));

        let events = seen.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["timeout_ms"], 5_000);
        assert_eq!(events[0]["retries"], 7);
        assert_eq!(events[0]["module"], "clipboard");
    }
}
