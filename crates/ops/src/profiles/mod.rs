//! Installer profiles, one per supported host
//!
//! A profile knows how its distribution names, fetches prerequisites for,
//! installs and registers Couchbase Server. Supporting another distribution
//! means adding a profile to [`ProfileRegistry::builtin`].

mod amazon_linux;
mod ubuntu;

pub use amazon_linux::AmazonLinuxProfile;
pub use ubuntu::UbuntuProfile;

use cbnode_errors::{Error, PlatformError};
use cbnode_platform::{OsRelease, PlatformCommand};
use cbnode_types::{Edition, HostClass};
use std::fmt;
use std::path::Path;

/// Environment variable honoured by the Couchbase package scripts
pub const DONT_START_ENV: &str = "INSTALL_DONT_START_SERVER";

/// Host-specific install strategy
pub trait PlatformProfile: fmt::Debug + Send + Sync {
    /// Short identifier, e.g. `ubuntu18.04`
    fn name(&self) -> &str;

    /// Column of the defaults table this host reads from
    fn host_class(&self) -> HostClass;

    fn matches(&self, os: &OsRelease) -> bool;

    /// Host tools the profile shells out to
    fn required_tools(&self) -> &'static [&'static str];

    /// Commands that refresh the package index and install prerequisites, in order
    fn dependency_commands(&self) -> Vec<PlatformCommand>;

    /// Package file name published for this host
    fn artifact_name(&self, edition: Edition, version: &str) -> String;

    /// Install the package without starting the server
    fn install_command(&self, package: &Path) -> PlatformCommand;

    /// Register an `/etc/init.d` script to run at boot
    fn register_boot_script_command(&self, script: &str) -> PlatformCommand;

    /// Remove the service's autostart registration
    fn disable_service_command(&self, service: &str) -> PlatformCommand {
        let mut cmd = PlatformCommand::privileged("systemctl");
        cmd.args(["disable", service]);
        cmd
    }
}

/// Ordered set of known profiles
#[derive(Debug)]
pub struct ProfileRegistry {
    profiles: Vec<Box<dyn PlatformProfile>>,
}

impl ProfileRegistry {
    #[must_use]
    pub fn new(profiles: Vec<Box<dyn PlatformProfile>>) -> Self {
        Self { profiles }
    }

    /// Ubuntu 16.04, Ubuntu 18.04 and Amazon Linux 2
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            Box::new(UbuntuProfile::new("16.04")),
            Box::new(UbuntuProfile::new("18.04")),
            Box::new(AmazonLinuxProfile::new()),
        ])
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name()).collect()
    }

    /// Pick the first profile matching `os`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::UnsupportedPlatform` when nothing matches.
    pub fn detect(&self, os: &OsRelease) -> Result<&dyn PlatformProfile, Error> {
        self.profiles
            .iter()
            .find(|p| p.matches(os))
            .map(Box::as_ref)
            .ok_or_else(|| {
                PlatformError::UnsupportedPlatform {
                    os_id: os.id.clone(),
                    version_id: os.version_id.clone(),
                }
                .into()
            })
    }
}

/// Privileged package install with server autostart suppressed
pub(crate) fn package_install(tool: &str, flag: &str, package: &Path) -> PlatformCommand {
    let mut cmd = PlatformCommand::privileged(tool);
    cmd.env(DONT_START_ENV, "1")
        .arg(flag)
        .arg(package.to_string_lossy());
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(id: &str, version: &str) -> OsRelease {
        OsRelease {
            id: id.to_string(),
            version_id: version.to_string(),
            pretty_name: None,
        }
    }

    #[test]
    fn detects_supported_hosts() {
        let registry = ProfileRegistry::builtin();
        assert_eq!(registry.detect(&os("ubuntu", "18.04")).unwrap().name(), "ubuntu18.04");
        assert_eq!(registry.detect(&os("ubuntu", "16.04")).unwrap().name(), "ubuntu16.04");
        let amzn = registry.detect(&os("amzn", "2")).unwrap();
        assert_eq!(amzn.name(), "amzn2");
        assert_eq!(amzn.host_class(), HostClass::AmazonLinux);
    }

    #[test]
    fn rejects_unknown_hosts() {
        let registry = ProfileRegistry::builtin();
        for (id, version) in [("ubuntu", "20.04"), ("amzn", "2018.03"), ("fedora", "39")] {
            let err = registry.detect(&os(id, version)).unwrap_err();
            assert!(
                matches!(err, Error::Platform(PlatformError::UnsupportedPlatform { .. })),
                "{id} {version}"
            );
        }
    }

    #[test]
    fn install_suppresses_autostart() {
        let registry = ProfileRegistry::builtin();
        for profile in &registry.profiles {
            let cmd = profile.install_command(Path::new("/tmp/pkg"));
            assert!(cmd.is_privileged());
            assert_eq!(cmd.get_env_vars(), &[(DONT_START_ENV.to_string(), "1".to_string())]);

            let disable = profile.disable_service_command("couchbase-server");
            assert_eq!(disable.to_string(), "systemctl disable couchbase-server");
        }
    }
}
