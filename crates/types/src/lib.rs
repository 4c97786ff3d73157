#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the Couchbase node provisioner
//!
//! This crate provides the small vocabulary shared by every other crate:
//! product editions, checksum algorithms, host classification, the resolved
//! install request and the report produced by a provisioning pass.

pub mod reports;
pub mod request;

pub use reports::{PhaseRecord, ProvisionPhase, ProvisionReport};
pub use request::InstallRequest;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Couchbase Server product edition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Enterprise,
    Community,
}

impl Edition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enterprise => "enterprise",
            Self::Community => "community",
        }
    }
}

impl Default for Edition {
    fn default() -> Self {
        Self::Enterprise
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Edition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enterprise" => Ok(Self::Enterprise),
            "community" => Ok(Self::Community),
            other => Err(format!(
                "unknown edition '{other}' (expected enterprise or community)"
            )),
        }
    }
}

impl clap::ValueEnum for Edition {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Enterprise, Self::Community]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Digest algorithm used to verify a downloaded package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumType {
    Sha256,
    Md5,
}

impl ChecksumType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Md5 => "md5",
        }
    }

    /// Length of the hex encoding of a digest of this type
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Md5 => 32,
        }
    }

    /// Whether `value` is a hex digest of this type, in either case
    #[must_use]
    pub fn is_digest(self, value: &str) -> bool {
        value.len() == self.hex_len() && value.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl fmt::Display for ChecksumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "md5" => Ok(Self::Md5),
            other => Err(format!(
                "unknown checksum type '{other}' (expected sha256 or md5)"
            )),
        }
    }
}

impl clap::ValueEnum for ChecksumType {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Sha256, Self::Md5]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Binary host classification used to pick default checksums.
///
/// Each installer profile reports its class; the defaults table has one
/// checksum column per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostClass {
    Ubuntu,
    AmazonLinux,
}

impl fmt::Display for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ubuntu => write!(f, "ubuntu"),
            Self::AmazonLinux => write!(f, "amazon-linux"),
        }
    }
}
