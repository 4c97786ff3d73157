//! Report type definitions for a provisioning pass

use crate::InstallRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionPhase {
    ParsingArgs,
    Validating,
    Dispatching,
    Downloading,
    Verifying,
    InstallingPackage,
    Tuning,
    Staging,
    Done,
}

impl ProvisionPhase {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ParsingArgs => "parsing arguments",
            Self::Validating => "validating host",
            Self::Dispatching => "preparing package manager",
            Self::Downloading => "downloading package",
            Self::Verifying => "verifying checksum",
            Self::InstallingPackage => "installing package",
            Self::Tuning => "tuning system",
            Self::Staging => "staging companion files",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ProvisionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Completed phase with its wall-clock duration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: ProvisionPhase,
    pub duration_ms: u64,
}

/// Provisioning report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProvisionReport {
    /// Request that was executed
    pub request: InstallRequest,
    /// Name of the platform profile that handled the install
    pub platform: String,
    /// Package URL that was downloaded
    pub artifact_url: String,
    /// Whether the sysctl config had to be rewritten
    pub swappiness_changed: bool,
    /// Companion files placed on the host
    pub staged: Vec<String>,
    /// Phases in completion order
    pub phases: Vec<PhaseRecord>,
    /// Total execution time
    pub duration_ms: u64,
}
