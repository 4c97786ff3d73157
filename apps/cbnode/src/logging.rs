//! Structured logging integration for events
//!
//! Every event that reaches the CLI is also recorded through `tracing`, with
//! its domain fields broken out so JSON debug logs can be filtered.

use cbnode_events::{
    AppEvent, DownloadEvent, EventMessage, GeneralEvent, PlatformEvent, ProvisionEvent,
};
use tracing::{debug, error, info, warn};

/// Log an event at its level with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let source = meta.source.as_str();
    let event_id = meta.event_id;

    match &message.event {
        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message, context } => {
                warn!(source, %event_id, context = ?context, "{message}");
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(source, %event_id, context = ?context, "{message}");
            }
            GeneralEvent::ConfigurationLoaded { source: config } => {
                info!(source, %event_id, config = %config, "Configuration loaded");
            }
        },

        AppEvent::Provision(event) => match event {
            ProvisionEvent::PhaseStarted { phase } => {
                info!(source, %event_id, phase = %phase, "Phase started");
            }
            ProvisionEvent::PhaseCompleted { phase, duration_ms } => {
                info!(source, %event_id, phase = %phase, duration_ms, "Phase completed");
            }
            ProvisionEvent::PhaseFailed { phase, failure } => {
                error!(
                    source,
                    %event_id,
                    phase = %phase,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    retryable = failure.retryable,
                    "Phase failed"
                );
            }
            ProvisionEvent::RequestResolved {
                edition,
                version,
                checksum_type,
                defaulted,
            } => {
                info!(
                    source,
                    %event_id,
                    edition = %edition,
                    version = %version,
                    checksum_type = %checksum_type,
                    defaulted,
                    "Install request resolved"
                );
            }
            ProvisionEvent::ProfileSelected { profile, artifact } => {
                info!(source, %event_id, profile = %profile, artifact = %artifact, "Profile selected");
            }
            ProvisionEvent::ChecksumVerified { algorithm, digest } => {
                info!(source, %event_id, algorithm = %algorithm, digest = %digest, "Checksum verified");
            }
            ProvisionEvent::SwappinessApplied {
                path,
                value,
                changed,
            } => {
                info!(source, %event_id, path = %path, value, changed, "Swappiness applied");
            }
            ProvisionEvent::FileStaged {
                source: from,
                destination,
            } => {
                info!(source, %event_id, from = %from, destination = %destination, "File staged");
            }
            ProvisionEvent::Completed {
                profile,
                duration_ms,
            } => {
                info!(source, %event_id, profile = %profile, duration_ms, "Provisioning completed");
            }
        },

        AppEvent::Download(event) => match event {
            DownloadEvent::Started { url, total_bytes } => {
                info!(source, %event_id, url = %url, total_bytes = ?total_bytes, "Download started");
            }
            DownloadEvent::Completed {
                url,
                path,
                bytes_downloaded,
                duration_ms,
            } => {
                info!(
                    source,
                    %event_id,
                    url = %url,
                    path = %path,
                    bytes_downloaded,
                    duration_ms,
                    "Download completed"
                );
            }
            DownloadEvent::Failed { url, failure } => {
                error!(
                    source,
                    %event_id,
                    url = %url,
                    code = ?failure.code,
                    message = %failure.message,
                    retryable = failure.retryable,
                    "Download failed"
                );
            }
        },

        AppEvent::Platform(event) => match event {
            PlatformEvent::ProcessExecutionStarted {
                command,
                privileged,
            } => {
                info!(source, %event_id, command = %command, privileged, "Process started");
            }
            PlatformEvent::ProcessExecutionCompleted {
                command,
                duration_ms,
            } => {
                debug!(source, %event_id, command = %command, duration_ms, "Process completed");
            }
            PlatformEvent::ProcessExecutionFailed {
                command,
                exit_code,
                error_message,
                duration_ms,
            } => {
                error!(
                    source,
                    %event_id,
                    command = %command,
                    exit_code = ?exit_code,
                    error = %error_message,
                    duration_ms,
                    "Process failed"
                );
            }
            PlatformEvent::FilesystemOperationCompleted {
                operation,
                paths_affected,
            } => {
                debug!(source, %event_id, operation = %operation, paths = ?paths_affected, "Filesystem operation completed");
            }
            PlatformEvent::HostDetected {
                os_id,
                version_id,
                pretty_name,
            } => {
                info!(
                    source,
                    %event_id,
                    os_id = %os_id,
                    version_id = %version_id,
                    pretty_name = ?pretty_name,
                    "Host detected"
                );
            }
        },
    }
}
