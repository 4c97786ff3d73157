#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in the provisioner
//!
//! Library crates never print. Everything a user should see travels as a
//! typed event over an unbounded channel to the CLI, which renders it and
//! forwards it to `tracing`.

pub mod meta;
pub use meta::{EventLevel, EventMessage, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, DownloadEvent, FailureContext, GeneralEvent, PlatformEvent, ProvisionEvent,
};

use cbnode_errors::UserFacingError;
use cbnode_types::ProvisionPhase;
use tokio::sync::mpsc::UnboundedSender;

/// Type alias for the event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implemented by the raw `EventSender` and by any context struct that may
/// or may not carry one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Receiver gone means nobody is listening; the pipeline keeps going.
            let _ = sender.send(EventMessage::from_event(event));
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit a warning event with context
    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }

    fn emit_phase_started(&self, phase: ProvisionPhase) {
        self.emit(AppEvent::Provision(ProvisionEvent::PhaseStarted { phase }));
    }

    fn emit_phase_completed(&self, phase: ProvisionPhase, duration: std::time::Duration) {
        self.emit(AppEvent::Provision(ProvisionEvent::PhaseCompleted {
            phase,
            duration_ms: duration_millis(duration),
        }));
    }

    fn emit_phase_failed<E: UserFacingError + ?Sized>(&self, phase: ProvisionPhase, error: &E) {
        self.emit(AppEvent::Provision(ProvisionEvent::PhaseFailed {
            phase,
            failure: FailureContext::from_error(error),
        }));
    }

    /// Emit a download started event
    fn emit_download_started(&self, url: impl Into<String>, total_bytes: Option<u64>) {
        self.emit(AppEvent::Download(DownloadEvent::Started {
            url: url.into(),
            total_bytes,
        }));
    }

    /// Emit a download completed event
    fn emit_download_completed(
        &self,
        url: impl Into<String>,
        path: impl Into<String>,
        bytes_downloaded: u64,
        duration: std::time::Duration,
    ) {
        self.emit(AppEvent::Download(DownloadEvent::Completed {
            url: url.into(),
            path: path.into(),
            bytes_downloaded,
            duration_ms: duration_millis(duration),
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

/// Saturating conversion used for every `duration_ms` field.
#[must_use]
pub fn duration_millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_wraps_events_with_metadata() {
        let (tx, mut rx) = channel();
        tx.emit_phase_started(ProvisionPhase::Verifying);
        tx.emit_warning("heads up");

        let first = rx.recv().await.unwrap();
        assert_eq!(first.meta.source, EventSource::PROVISION);
        assert_eq!(first.meta.level, EventLevel::Info);
        assert!(matches!(
            first.event,
            AppEvent::Provision(ProvisionEvent::PhaseStarted {
                phase: ProvisionPhase::Verifying
            })
        ));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.meta.level, EventLevel::Warn);
    }

    #[test]
    fn emitting_without_receiver_is_silent() {
        let (tx, rx) = channel();
        drop(rx);
        tx.emit_warning("nobody listens");
    }
}
