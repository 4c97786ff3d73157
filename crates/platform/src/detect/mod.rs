//! Host operating system detection

use cbnode_errors::PlatformError;
use std::path::Path;

/// Subset of `os-release(5)` used to pick an installer profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsRelease {
    /// Lower-case distribution id (`ubuntu`, `amzn`, …)
    pub id: String,
    /// Distribution version (`18.04`, `2`, …); empty when absent
    pub version_id: String,
    pub pretty_name: Option<String>,
}

impl OsRelease {
    /// Parse `os-release` content
    ///
    /// Unknown keys, comments and blank lines are skipped. A missing `ID`
    /// defaults to `linux`.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut id = None;
        let mut version_id = None;
        let mut pretty_name = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = unquote(value.trim());
            match key.trim() {
                "ID" => id = Some(value.to_ascii_lowercase()),
                "VERSION_ID" => version_id = Some(value),
                "PRETTY_NAME" => pretty_name = Some(value),
                _ => {}
            }
        }

        Self {
            id: id.unwrap_or_else(|| "linux".to_string()),
            version_id: version_id.unwrap_or_default(),
            pretty_name,
        }
    }

    /// Read and parse an `os-release` file
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::DetectionFailed` if the file cannot be read.
    pub async fn load(path: &Path) -> Result<Self, PlatformError> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| PlatformError::DetectionFailed {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
        Ok(Self::parse(&content))
    }
}

fn unquote(value: &str) -> String {
    let stripped = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    stripped.to_string()
}
