#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package checksums for download verification
//!
//! Couchbase publishes sha256 digests for enterprise packages and md5 digests
//! for community packages; both are computed here by streaming the file.

use cbnode_errors::{Error, IntegrityError};
use cbnode_types::ChecksumType;
use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// A computed or expected digest together with its algorithm
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum {
    algorithm: ChecksumType,
    bytes: Vec<u8>,
}

enum Hasher {
    Sha256(Sha256),
    Md5(Md5),
}

impl Hasher {
    fn new(algorithm: ChecksumType) -> Self {
        match algorithm {
            ChecksumType::Sha256 => Self::Sha256(Sha256::new()),
            ChecksumType::Md5 => Self::Md5(Md5::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Md5(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Md5(h) => h.finalize().to_vec(),
        }
    }
}

impl Checksum {
    #[must_use]
    pub fn algorithm(&self) -> ChecksumType {
        self.algorithm
    }

    /// Lower-case hex encoding
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Parse an expected digest; case and surrounding whitespace are ignored
    ///
    /// # Errors
    /// Returns an error if the input is not hexadecimal or has the wrong
    /// length for `algorithm`.
    pub fn from_hex(algorithm: ChecksumType, s: &str) -> Result<Self, Error> {
        let trimmed = s.trim();
        let invalid = |message: String| IntegrityError::InvalidExpectedDigest {
            algorithm: algorithm.to_string(),
            value: s.to_string(),
            message,
        };

        if trimmed.len() != algorithm.hex_len() {
            return Err(invalid(format!(
                "expected {} hex characters, got {}",
                algorithm.hex_len(),
                trimmed.len()
            ))
            .into());
        }

        let bytes = hex::decode(trimmed).map_err(|e| invalid(format!("invalid hex: {e}")))?;
        Ok(Self { algorithm, bytes })
    }

    /// Compute the checksum of a byte slice
    #[must_use]
    pub fn from_data(algorithm: ChecksumType, data: &[u8]) -> Self {
        let mut hasher = Hasher::new(algorithm);
        hasher.update(data);
        Self {
            algorithm,
            bytes: hasher.finalize(),
        }
    }

    /// Compute the checksum of a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub async fn hash_file(algorithm: ChecksumType, path: &Path) -> Result<Self, Error> {
        let unreadable = |e: std::io::Error| IntegrityError::UnreadableArtifact {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let mut file = File::open(path).await.map_err(unreadable)?;
        let mut hasher = Hasher::new(algorithm);
        let mut buffer = vec![0; CHUNK_SIZE];

        loop {
            let n = file.read(&mut buffer).await.map_err(unreadable)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(Self {
            algorithm,
            bytes: hasher.finalize(),
        })
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Verify a file against an expected hex digest
///
/// Comparison is case-insensitive. Returns the computed checksum on success.
///
/// # Errors
/// Returns `IntegrityError::InvalidExpectedDigest` for a malformed expected
/// value, `IntegrityError::UnreadableArtifact` if the file cannot be read and
/// `IntegrityError::ChecksumMismatch` if the digests differ.
pub async fn verify_file(
    path: &Path,
    expected: &str,
    algorithm: ChecksumType,
) -> Result<Checksum, Error> {
    let expected = Checksum::from_hex(algorithm, expected)?;
    let actual = Checksum::hash_file(algorithm, path).await?;

    if actual == expected {
        Ok(actual)
    } else {
        Err(IntegrityError::ChecksumMismatch {
            path: path.display().to_string(),
            algorithm: algorithm.to_string(),
            expected: expected.to_hex(),
            actual: actual.to_hex(),
        }
        .into())
    }
}
