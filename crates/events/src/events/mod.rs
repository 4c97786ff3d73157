use serde::{Deserialize, Serialize};

use crate::EventSource;
use cbnode_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code from the error taxonomy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod download;
pub mod general;
pub mod platform;
pub mod provision;

pub use download::*;
pub use general::*;
pub use platform::*;
pub use provision::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, configuration)
    General(GeneralEvent),

    /// Pipeline phases and their outcomes
    Provision(ProvisionEvent),

    /// Package download
    Download(DownloadEvent),

    /// Host commands, file changes and OS detection
    Platform(PlatformEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Provision(_) => EventSource::PROVISION,
            Self::Download(_) => EventSource::DOWNLOAD,
            Self::Platform(_) => EventSource::PLATFORM,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::Provision(ProvisionEvent::PhaseFailed { .. })
            | Self::Download(DownloadEvent::Failed { .. })
            | Self::Platform(PlatformEvent::ProcessExecutionFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Platform(
                PlatformEvent::ProcessExecutionCompleted { .. }
                | PlatformEvent::FilesystemOperationCompleted { .. },
            ) => Level::DEBUG,

            _ => Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbnode_errors::NetworkError;
    use cbnode_types::ProvisionPhase;

    #[test]
    fn failures_log_at_error_level() {
        let failure = FailureContext::from_error(&NetworkError::HttpError {
            status: 404,
            message: "Not Found".into(),
        });
        assert_eq!(failure.code.as_deref(), Some("network.http_error"));
        assert!(failure.hint.is_some());

        let event = AppEvent::Provision(ProvisionEvent::PhaseFailed {
            phase: ProvisionPhase::Downloading,
            failure,
        });
        assert_eq!(event.log_level(), tracing::Level::ERROR);
        assert_eq!(event.event_source(), EventSource::PROVISION);
    }

    #[test]
    fn serializes_with_domain_tag() {
        let event = AppEvent::Download(DownloadEvent::Started {
            url: "https://example.invalid/pkg.deb".into(),
            total_bytes: Some(10),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "download");
        assert_eq!(json["event"]["type"], "Started");
    }
}
