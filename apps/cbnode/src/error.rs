//! CLI error handling

use std::fmt;

use cbnode_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    Config(cbnode_errors::Error),
    /// Provisioning failed
    Ops(cbnode_errors::Error),
    /// I/O error while rendering output
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: {}", e.user_message())?;
                write_details(f, e)
            }
            CliError::Ops(e) => {
                write!(f, "{}", e.user_message())?;
                write_details(f, e)
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

fn write_details(f: &mut fmt::Formatter<'_>, e: &cbnode_errors::Error) -> fmt::Result {
    if let Some(code) = e.user_code() {
        write!(f, "\n  Code: {code}")?;
    }
    if let Some(hint) = e.user_hint() {
        write!(f, "\n  Hint: {hint}")?;
    }
    if e.is_retryable() {
        write!(f, "\n  Retry: safe to retry this operation.")?;
    }
    Ok(())
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) | CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<cbnode_errors::Error> for CliError {
    fn from(e: cbnode_errors::Error) -> Self {
        CliError::Ops(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
