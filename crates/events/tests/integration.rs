//! Integration tests for events

#[cfg(test)]
mod tests {
    use cbnode_errors::PlatformError;
    use cbnode_events::*;
    use cbnode_types::ProvisionPhase;
    use std::time::Duration;

    #[tokio::test]
    async fn test_event_sender_ext() {
        let (tx, mut rx) = channel();

        tx.emit_warning_with_context("stray --checksum", "using defaults");
        tx.emit_debug("test debug");
        tx.emit_phase_completed(ProvisionPhase::Tuning, Duration::from_millis(1500));

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(
            event1.event,
            AppEvent::General(GeneralEvent::Warning { context: Some(_), .. })
        ));
        assert_eq!(event1.meta.level, EventLevel::Warn);

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(event2.event, AppEvent::General(GeneralEvent::DebugLog { .. })));
        assert_eq!(event2.meta.level, EventLevel::Debug);

        let event3 = rx.recv().await.unwrap();
        assert!(matches!(
            event3.event,
            AppEvent::Provision(ProvisionEvent::PhaseCompleted {
                phase: ProvisionPhase::Tuning,
                duration_ms: 1500
            })
        ));
    }

    #[tokio::test]
    async fn test_phase_failure_carries_error_details() {
        let (tx, mut rx) = channel();
        let err = PlatformError::UnsupportedPlatform {
            os_id: "fedora".into(),
            version_id: "39".into(),
        };
        tx.emit_phase_failed(ProvisionPhase::Validating, &err);

        let message = rx.recv().await.unwrap();
        let AppEvent::Provision(ProvisionEvent::PhaseFailed { phase, failure }) = message.event
        else {
            panic!("expected a phase failure");
        };
        assert_eq!(phase, ProvisionPhase::Validating);
        assert_eq!(failure.code.as_deref(), Some("platform.unsupported"));
        assert!(failure.message.contains("fedora 39"));
        assert!(!failure.retryable);
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_duration_millis_saturates() {
        assert_eq!(duration_millis(Duration::from_millis(42)), 42);
        assert_eq!(duration_millis(Duration::MAX), u64::MAX);
    }
}
