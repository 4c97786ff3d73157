//! Resolved install request

use crate::{ChecksumType, Edition};
use serde::{Deserialize, Serialize};

/// Fully resolved parameters for one provisioning pass.
///
/// Produced once by the parameter resolver and immutable afterwards. When
/// `version` came from the defaults table, `checksum` and `checksum_type`
/// came from the same table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRequest {
    pub edition: Edition,
    pub version: String,
    pub checksum: String,
    pub checksum_type: ChecksumType,
    pub swappiness: u8,
    /// Whether version and checksum were taken from the defaults table
    pub defaulted: bool,
}
