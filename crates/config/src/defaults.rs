//! Default release table, keyed by edition and host class

use cbnode_types::{ChecksumType, Edition, HostClass};
use serde::{Deserialize, Serialize};

/// One row of the defaults table.
///
/// Version, checksum type and the per-host checksums form a consistent
/// triple; callers must never mix a row's checksum with another version.
/// The built-in rows carry no digests. They are supplied per site in the
/// `[defaults.<edition>]` table of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDefaults {
    pub version: String,
    pub checksum_type: ChecksumType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ubuntu_checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amazon_linux_checksum: Option<String>,
}

impl ReleaseDefaults {
    /// Configured digest for `host`, if any
    #[must_use]
    pub fn checksum_for(&self, host: HostClass) -> Option<&str> {
        match host {
            HostClass::Ubuntu => self.ubuntu_checksum.as_deref(),
            HostClass::AmazonLinux => self.amazon_linux_checksum.as_deref(),
        }
    }

    /// Config key holding the digest for `host`
    #[must_use]
    pub fn checksum_key(host: HostClass) -> &'static str {
        match host {
            HostClass::Ubuntu => "ubuntu_checksum",
            HostClass::AmazonLinux => "amazon_linux_checksum",
        }
    }
}

/// Defaults for both editions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_enterprise")]
    pub enterprise: ReleaseDefaults,
    #[serde(default = "default_community")]
    pub community: ReleaseDefaults,
}

impl DefaultsConfig {
    #[must_use]
    pub fn for_edition(&self, edition: Edition) -> &ReleaseDefaults {
        match edition {
            Edition::Enterprise => &self.enterprise,
            Edition::Community => &self.community,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            enterprise: default_enterprise(),
            community: default_community(),
        }
    }
}

fn default_enterprise() -> ReleaseDefaults {
    ReleaseDefaults {
        version: "6.0.1".to_string(),
        checksum_type: ChecksumType::Sha256,
        ubuntu_checksum: None,
        amazon_linux_checksum: None,
    }
}

fn default_community() -> ReleaseDefaults {
    ReleaseDefaults {
        version: "6.0.0".to_string(),
        checksum_type: ChecksumType::Md5,
        ubuntu_checksum: None,
        amazon_linux_checksum: None,
    }
}
