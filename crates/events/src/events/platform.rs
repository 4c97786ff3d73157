//! Platform-specific operation events

use serde::{Deserialize, Serialize};

/// Platform operation events for tracking host commands and file changes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// Process execution started
    ProcessExecutionStarted {
        /// Command line being executed, without the escalation prefix
        command: String,
        /// Whether the command runs with escalated privileges
        privileged: bool,
    },

    /// Process exited with status zero
    ProcessExecutionCompleted {
        command: String,
        duration_ms: u64,
    },

    /// Process could not be spawned or exited non-zero
    ProcessExecutionFailed {
        command: String,
        exit_code: Option<i32>,
        error_message: String,
        duration_ms: u64,
    },

    /// A privileged filesystem change finished
    FilesystemOperationCompleted {
        /// Operation name (e.g. `replace_file`, `copy_tree`)
        operation: String,
        /// Paths affected by the operation
        paths_affected: Vec<String>,
    },

    /// Host operating system identified
    HostDetected {
        os_id: String,
        version_id: String,
        pretty_name: Option<String>,
    },
}
