//! Artifact integrity error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum IntegrityError {
    #[error("{algorithm} checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        algorithm: String,
        expected: String,
        actual: String,
    },

    #[error("invalid expected {algorithm} digest '{value}': {message}")]
    InvalidExpectedDigest {
        algorithm: String,
        value: String,
        message: String,
    },

    #[error("cannot read artifact {path}: {message}")]
    UnreadableArtifact { path: String, message: String },
}

impl UserFacingError for IntegrityError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ChecksumMismatch { .. } => Some(
                "The downloaded package does not match the expected checksum; confirm --checksum and --checksum-type for this version.",
            ),
            Self::InvalidExpectedDigest { .. } => {
                Some("Pass the checksum as a hex string of the right length for its type.")
            }
            Self::UnreadableArtifact { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ChecksumMismatch { .. } => "integrity.checksum_mismatch",
            Self::InvalidExpectedDigest { .. } => "integrity.invalid_expected_digest",
            Self::UnreadableArtifact { .. } => "integrity.unreadable_artifact",
        };
        Some(code)
    }
}
