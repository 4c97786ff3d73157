#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for the provisioner
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded in [`constants`] and [`defaults`])
//! - Configuration file (`/etc/cbnode/config.toml` or `--config`)
//! - Environment variables
//!
//! The resulting [`Config`] is built once at startup and shared read-only.

pub mod constants;
pub mod sections;
pub mod defaults;

pub use sections::{DownloadConfig, HostConfig, PathConfig};
pub use defaults::{DefaultsConfig, ReleaseDefaults};

use cbnode_errors::{ConfigError, Error};
use cbnode_types::Edition;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

impl Config {
    /// Get the default config file path
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathBuf::from(constants::DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path();

        if fs::try_exists(&config_path).await.unwrap_or(false) {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using built-in defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an empty value.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Some(url) = env_value("CBNODE_BASE_URL")? {
            self.download.base_url = url;
        }

        // An empty value is meaningful here: it disables escalation.
        if let Ok(command) = std::env::var("CBNODE_PRIVILEGE_COMMAND") {
            self.host.privilege_command = command;
        }

        if let Some(path) = env_value("CBNODE_OS_RELEASE")? {
            self.host.os_release = PathBuf::from(path);
        }

        if let Some(path) = env_value("CBNODE_WORK_DIR")? {
            self.paths.work_dir = Some(PathBuf::from(path));
        }

        if let Some(path) = env_value("CBNODE_BUNDLE_DIR")? {
            self.paths.bundle_dir = Some(PathBuf::from(path));
        }

        Ok(())
    }

    /// Check invariants that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns an error for an unusable base URL, zero timeouts or a default
    /// checksum that does not fit its algorithm.
    pub fn validate(&self) -> Result<(), Error> {
        let base = self.download.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "download.base_url".to_string(),
                value: self.download.base_url.clone(),
            }
            .into());
        }

        if self.download.timeout_secs == 0 || self.download.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "download timeouts must be greater than zero".to_string(),
            }
            .into());
        }

        for edition in [Edition::Enterprise, Edition::Community] {
            let row = self.defaults.for_edition(edition);
            if row.version.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: format!("defaults.{edition}.version"),
                }
                .into());
            }
            for (host, digest) in [
                ("ubuntu_checksum", &row.ubuntu_checksum),
                ("amazon_linux_checksum", &row.amazon_linux_checksum),
            ] {
                let Some(digest) = digest else { continue };
                if !row.checksum_type.is_digest(digest) {
                    return Err(ConfigError::InvalidValue {
                        field: format!("defaults.{edition}.{host}"),
                        value: digest.clone(),
                    }
                    .into());
                }
            }
        }

        if self.paths.companion_scripts.is_empty() {
            return Err(ConfigError::MissingField {
                field: "paths.companion_scripts".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Directory that relative source paths resolve against
    ///
    /// # Errors
    ///
    /// Returns an error if no bundle directory is configured and the location
    /// of the running executable cannot be determined.
    pub fn bundle_dir(&self) -> Result<PathBuf, Error> {
        if let Some(dir) = &self.paths.bundle_dir {
            return Ok(dir.clone());
        }
        let exe = std::env::current_exe()?;
        exe.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::internal("executable has no parent directory"))
    }

    /// Resolve a source path against the bundle directory
    ///
    /// # Errors
    ///
    /// Propagates failures from [`Config::bundle_dir`].
    pub fn resolve_source(&self, path: &Path) -> Result<PathBuf, Error> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.bundle_dir()?.join(path))
        }
    }

    /// Directory that receives the downloaded package
    #[must_use]
    pub fn work_dir(&self) -> PathBuf {
        self.paths
            .work_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

fn env_value(var: &str) -> Result<Option<String>, Error> {
    match std::env::var(var) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue {
            field: var.to_string(),
            value,
        }
        .into()),
        Ok(value) => Ok(Some(value)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_short_default_digest() {
        let mut config = Config::default();
        config.defaults.community.ubuntu_checksum = Some("abc".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("defaults.community.ubuntu_checksum"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = Config::default();
        config.download.base_url = "ftp://mirror.invalid".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn absolute_sources_bypass_bundle_dir() {
        let config = Config::default();
        let resolved = config.resolve_source(Path::new("/srv/disable-thp")).unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/disable-thp"));
    }

    #[test]
    fn relative_sources_join_bundle_dir() {
        let mut config = Config::default();
        config.paths.bundle_dir = Some(PathBuf::from("/srv/bundle/install-couchbase-server"));
        let resolved = config
            .resolve_source(Path::new("../couchbase-commons"))
            .unwrap();
        assert_eq!(
            resolved,
            PathBuf::from("/srv/bundle/install-couchbase-server/../couchbase-commons")
        );
    }
}
