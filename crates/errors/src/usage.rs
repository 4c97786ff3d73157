//! Command-line usage error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum UsageError {
    #[error("unrecognized option: {flag}")]
    UnknownFlag { flag: String },

    #[error("option {flag} requires a non-empty value")]
    MissingValue { flag: String },

    #[error("invalid value '{value}' for {flag}: expected one of {expected}")]
    InvalidChoice {
        flag: String,
        value: String,
        expected: String,
    },

    #[error("invalid value '{value}' for {flag}: {message}")]
    InvalidValue {
        flag: String,
        value: String,
        message: String,
    },

    #[error("--version {version} was given without {missing}")]
    UnverifiedVersion { version: String, missing: String },
}

impl UserFacingError for UsageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownFlag { .. } | Self::MissingValue { .. } => {
                Some("Run with --help to see the supported options.")
            }
            Self::InvalidChoice { .. } | Self::InvalidValue { .. } => {
                Some("Pass one of the accepted values listed in --help.")
            }
            Self::UnverifiedVersion { .. } => Some(
                "An explicit --version must come with --checksum and --checksum-type so the package can be verified.",
            ),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnknownFlag { .. } => "usage.unknown_flag",
            Self::MissingValue { .. } => "usage.missing_value",
            Self::InvalidChoice { .. } => "usage.invalid_choice",
            Self::InvalidValue { .. } => "usage.invalid_value",
            Self::UnverifiedVersion { .. } => "usage.unverified_version",
        };
        Some(code)
    }
}
