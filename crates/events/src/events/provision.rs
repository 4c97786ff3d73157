//! Provisioning pipeline events

use cbnode_types::{ChecksumType, Edition, ProvisionPhase};
use serde::{Deserialize, Serialize};

use super::FailureContext;

/// High-level pipeline progress
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProvisionEvent {
    PhaseStarted {
        phase: ProvisionPhase,
    },

    PhaseCompleted {
        phase: ProvisionPhase,
        duration_ms: u64,
    },

    PhaseFailed {
        phase: ProvisionPhase,
        failure: FailureContext,
    },

    /// Parameters resolved against the defaults table
    RequestResolved {
        edition: Edition,
        version: String,
        checksum_type: ChecksumType,
        defaulted: bool,
    },

    /// Installer profile selected for the host
    ProfileSelected {
        profile: String,
        artifact: String,
    },

    /// Downloaded package matched its expected digest
    ChecksumVerified {
        algorithm: ChecksumType,
        digest: String,
    },

    /// Swappiness setting written (or already present)
    SwappinessApplied {
        path: String,
        value: u8,
        changed: bool,
    },

    /// Boot script or companion file placed on the host
    FileStaged {
        source: String,
        destination: String,
    },

    /// Provisioning finished successfully
    Completed {
        profile: String,
        duration_ms: u64,
    },
}
