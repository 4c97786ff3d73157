//! Host tool prerequisites

use cbnode_errors::Error;
use cbnode_platform::Platform;

/// Coreutils behind the privileged file operations
const FILE_TOOLS: &[&str] = &["install", "mv", "cp", "rm", "mkdir"];

/// Tools needed before the host has been identified
#[must_use]
pub fn base_tools(privilege_command: Option<&str>) -> Vec<&str> {
    privilege_command
        .into_iter()
        .chain(FILE_TOOLS.iter().copied())
        .collect()
}

/// Require every tool in `tools` to be on `PATH`
///
/// # Errors
///
/// Returns `PlatformError::CommandNotFound` for the first missing tool.
pub async fn check_tools(platform: &Platform, tools: &[&str]) -> Result<(), Error> {
    for tool in tools {
        let path = platform.which(tool).await?;
        tracing::debug!(tool, path = %path.display(), "found host tool");
    }
    Ok(())
}
