use cbnode_platform::{OsRelease, PlatformCommand};
use cbnode_types::{Edition, HostClass};
use std::path::Path;

use super::{package_install, PlatformProfile};

/// Ubuntu LTS release installing the `.deb` package with dpkg
#[derive(Debug, Clone)]
pub struct UbuntuProfile {
    release: String,
    name: String,
}

impl UbuntuProfile {
    #[must_use]
    pub fn new(release: &str) -> Self {
        Self {
            release: release.to_string(),
            name: format!("ubuntu{release}"),
        }
    }
}

impl PlatformProfile for UbuntuProfile {
    fn name(&self) -> &str {
        &self.name
    }

    fn host_class(&self) -> HostClass {
        HostClass::Ubuntu
    }

    fn matches(&self, os: &OsRelease) -> bool {
        os.id == "ubuntu" && os.version_id == self.release
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["apt-get", "dpkg", "systemctl", "update-rc.d"]
    }

    fn dependency_commands(&self) -> Vec<PlatformCommand> {
        let mut update = PlatformCommand::privileged("apt-get");
        update.env("DEBIAN_FRONTEND", "noninteractive").args(["update", "-y"]);

        let mut install = PlatformCommand::privileged("apt-get");
        install
            .env("DEBIAN_FRONTEND", "noninteractive")
            .args(["install", "-y", "python-httplib2", "jq"]);

        vec![update, install]
    }

    fn artifact_name(&self, edition: Edition, version: &str) -> String {
        format!(
            "couchbase-server-{edition}_{version}-ubuntu{}_amd64.deb",
            self.release
        )
    }

    fn install_command(&self, package: &Path) -> PlatformCommand {
        package_install("dpkg", "-i", package)
    }

    fn register_boot_script_command(&self, script: &str) -> PlatformCommand {
        let mut cmd = PlatformCommand::privileged("update-rc.d");
        cmd.args([script, "defaults"]);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_naming() {
        let profile = UbuntuProfile::new("18.04");
        assert_eq!(
            profile.artifact_name(Edition::Community, "6.0.0"),
            "couchbase-server-community_6.0.0-ubuntu18.04_amd64.deb"
        );
        assert_eq!(
            UbuntuProfile::new("16.04").artifact_name(Edition::Enterprise, "6.0.1"),
            "couchbase-server-enterprise_6.0.1-ubuntu16.04_amd64.deb"
        );
    }

    #[test]
    fn commands() {
        let profile = UbuntuProfile::new("18.04");
        let deps: Vec<String> = profile
            .dependency_commands()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            deps,
            [
                "DEBIAN_FRONTEND=noninteractive apt-get update -y",
                "DEBIAN_FRONTEND=noninteractive apt-get install -y python-httplib2 jq",
            ]
        );
        assert_eq!(
            profile.install_command(Path::new("/tmp/x.deb")).to_string(),
            "INSTALL_DONT_START_SERVER=1 dpkg -i /tmp/x.deb"
        );
        assert_eq!(
            profile.register_boot_script_command("disable-thp").to_string(),
            "update-rc.d disable-thp defaults"
        );
    }
}
