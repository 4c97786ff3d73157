//! Configuration sections

use crate::constants;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Package download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Host interaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_os_release")]
    pub os_release: PathBuf,
    /// Program used to escalate privileged commands; empty runs them directly
    #[serde(default = "default_privilege_command")]
    pub privilege_command: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl HostConfig {
    #[must_use]
    pub fn privilege_command(&self) -> Option<&str> {
        let trimmed = self.privilege_command.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            os_release: default_os_release(),
            privilege_command: default_privilege_command(),
            service_name: default_service_name(),
        }
    }
}

/// Source and destination paths
///
/// Relative sources resolve against `bundle_dir`, which defaults to the
/// directory holding the running executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub bundle_dir: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_sysctl_conf")]
    pub sysctl_conf: PathBuf,
    #[serde(default = "default_thp_script_source")]
    pub thp_script_source: PathBuf,
    #[serde(default = "default_thp_script_dest")]
    pub thp_script_dest: PathBuf,
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,
    #[serde(default = "default_companion_scripts")]
    pub companion_scripts: Vec<PathBuf>,
    #[serde(default = "default_commons_source")]
    pub commons_source: PathBuf,
    #[serde(default = "default_commons_dest")]
    pub commons_dest: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            bundle_dir: None,
            work_dir: None,
            log_dir: default_log_dir(),
            sysctl_conf: default_sysctl_conf(),
            thp_script_source: default_thp_script_source(),
            thp_script_dest: default_thp_script_dest(),
            bin_dir: default_bin_dir(),
            companion_scripts: default_companion_scripts(),
            commons_source: default_commons_source(),
            commons_dest: default_commons_dest(),
        }
    }
}

fn default_base_url() -> String {
    constants::PACKAGE_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    constants::DOWNLOAD_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    constants::CONNECT_TIMEOUT_SECS
}

fn default_os_release() -> PathBuf {
    PathBuf::from(constants::OS_RELEASE)
}

fn default_privilege_command() -> String {
    constants::PRIVILEGE_COMMAND.to_string()
}

fn default_service_name() -> String {
    constants::SERVICE_NAME.to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(constants::LOGS_DIR)
}

fn default_sysctl_conf() -> PathBuf {
    PathBuf::from(constants::SYSCTL_CONF)
}

fn default_thp_script_source() -> PathBuf {
    PathBuf::from(constants::THP_SCRIPT_SOURCE)
}

fn default_thp_script_dest() -> PathBuf {
    PathBuf::from(constants::THP_BOOT_SCRIPT)
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from(constants::COUCHBASE_BIN_DIR)
}

fn default_companion_scripts() -> Vec<PathBuf> {
    vec![
        PathBuf::from(constants::RUN_SERVER_SCRIPT_SOURCE),
        PathBuf::from(constants::RALLY_POINT_SCRIPT_SOURCE),
    ]
}

fn default_commons_source() -> PathBuf {
    PathBuf::from(constants::COMMONS_SOURCE)
}

fn default_commons_dest() -> PathBuf {
    PathBuf::from(constants::COMMONS_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_privilege_command_disables_escalation() {
        let mut host = HostConfig::default();
        assert_eq!(host.privilege_command(), Some("sudo"));
        host.privilege_command = "  ".into();
        assert_eq!(host.privilege_command(), None);
    }
}
