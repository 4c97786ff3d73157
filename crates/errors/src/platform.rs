//! Platform-specific operation errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors that can occur while inspecting or changing the host
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("required command not found: {command}")]
    CommandNotFound { command: String },

    #[error("unsupported platform: {os_id} {version_id}")]
    UnsupportedPlatform { os_id: String, version_id: String },

    #[error("failed to detect host platform from {path}: {message}")]
    DetectionFailed { path: String, message: String },

    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command failed with {}: {command}{}", exit_label(.exit_code), stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("filesystem operation failed: {operation} - {message}")]
    FilesystemOperationFailed { operation: String, message: String },

    #[error("permission denied: {operation} - {message}")]
    PermissionDenied { operation: String, message: String },
}

#[allow(clippy::ref_option)]
fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{trimmed}")
    }
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandNotFound { .. } => {
                Some("Install the missing tool or make sure it is on PATH, then rerun.")
            }
            Self::UnsupportedPlatform { .. } => {
                Some("Only Ubuntu 16.04, Ubuntu 18.04 and Amazon Linux 2 are supported.")
            }
            Self::DetectionFailed { .. } => {
                Some("Check that /etc/os-release exists or set host.os_release in the config.")
            }
            Self::PermissionDenied { .. } => {
                Some("Run as a user that can escalate privileges with the configured command.")
            }
            Self::CommandFailed { .. } => {
                Some("Inspect the command output above; the host may be left partially provisioned.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ProcessExecutionFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CommandNotFound { .. } => "platform.prerequisite_missing",
            Self::UnsupportedPlatform { .. } => "platform.unsupported",
            Self::DetectionFailed { .. } => "platform.detection_failed",
            Self::ProcessExecutionFailed { .. } => "platform.process_execution_failed",
            Self::CommandFailed { .. } => "platform.command_failed",
            Self::FilesystemOperationFailed { .. } => "platform.filesystem_operation_failed",
            Self::PermissionDenied { .. } => "platform.permission_denied",
        };
        Some(code)
    }
}
