//! Built-in default locations and endpoints
//!
//! Every value here seeds a field of [`crate::Config`]; nothing reads these
//! constants directly at runtime.

pub const DEFAULT_CONFIG_PATH: &str = "/etc/cbnode/config.toml";

pub const OS_RELEASE: &str = "/etc/os-release";
pub const SYSCTL_CONF: &str = "/etc/sysctl.conf";
pub const THP_BOOT_SCRIPT: &str = "/etc/init.d/disable-thp";
pub const COUCHBASE_BIN_DIR: &str = "/opt/couchbase/bin";
pub const COMMONS_DIR: &str = "/opt/couchbase-commons";
pub const LOGS_DIR: &str = "/var/log/cbnode";

/// Bundle-relative sources
pub const THP_SCRIPT_SOURCE: &str = "disable-thp";
pub const RUN_SERVER_SCRIPT_SOURCE: &str = "../run-couchbase-server/run-couchbase-server";
pub const RALLY_POINT_SCRIPT_SOURCE: &str = "../couchbase-commons/couchbase-rally-point";
pub const COMMONS_SOURCE: &str = "../couchbase-commons";

pub const PACKAGE_BASE_URL: &str = "https://packages.couchbase.com/releases";
pub const SERVICE_NAME: &str = "couchbase-server";
pub const PRIVILEGE_COMMAND: &str = "sudo";

pub const DOWNLOAD_TIMEOUT_SECS: u64 = 600;
pub const CONNECT_TIMEOUT_SECS: u64 = 30;
