use cbnode_platform::{OsRelease, PlatformCommand};
use cbnode_types::{Edition, HostClass};
use std::path::Path;

use super::{package_install, PlatformProfile};

/// Amazon Linux 2 installing the `.rpm` package
#[derive(Debug, Clone, Default)]
pub struct AmazonLinuxProfile;

impl AmazonLinuxProfile {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PlatformProfile for AmazonLinuxProfile {
    fn name(&self) -> &str {
        "amzn2"
    }

    fn host_class(&self) -> HostClass {
        HostClass::AmazonLinux
    }

    fn matches(&self, os: &OsRelease) -> bool {
        os.id == "amzn" && os.version_id == "2"
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["yum", "rpm", "systemctl", "chkconfig"]
    }

    fn dependency_commands(&self) -> Vec<PlatformCommand> {
        let mut update = PlatformCommand::privileged("yum");
        update.args(["update", "-y"]);

        let mut install = PlatformCommand::privileged("yum");
        install.args(["install", "-y", "pkgconfig", "openssl", "jq"]);

        vec![update, install]
    }

    fn artifact_name(&self, edition: Edition, version: &str) -> String {
        format!("couchbase-server-{edition}-{version}-amzn2.x86_64.rpm")
    }

    fn install_command(&self, package: &Path) -> PlatformCommand {
        package_install("rpm", "-i", package)
    }

    fn register_boot_script_command(&self, script: &str) -> PlatformCommand {
        let mut cmd = PlatformCommand::privileged("chkconfig");
        cmd.args(["--add", script]);
        cmd
    }
}
