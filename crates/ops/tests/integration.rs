//! Integration tests for ops crate

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use cbnode_config::Config;
    use cbnode_errors::{
        ConfigError, Error, IntegrityError, PlatformError, UsageError, UserFacingError,
    };
    use cbnode_events::{channel, AppEvent, EventReceiver, ProvisionEvent};
    use cbnode_hash::Checksum;
    use cbnode_net::{NetClient, NetConfig};
    use cbnode_ops::*;
    use cbnode_platform::{
        CommandOutput, LinuxProcessOperations, Platform, PlatformCommand, PlatformContext,
        ProcessOperations,
    };
    use cbnode_types::{ChecksumType, Edition, ProvisionPhase};
    use httpmock::prelude::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    const UBUNTU_1804: &str = "NAME=\"Ubuntu\"\nVERSION_ID=\"18.04\"\nID=ubuntu\nPRETTY_NAME=\"Ubuntu 18.04.1 LTS\"\n";
    const AMAZON_LINUX_2: &str = "NAME=\"Amazon Linux\"\nVERSION=\"2\"\nID=\"amzn\"\nVERSION_ID=\"2\"\n";
    const FEDORA: &str = "NAME=Fedora\nID=fedora\nVERSION_ID=39\n";

    const PACKAGE: &[u8] = b"pretend this is a couchbase server package";

    /// Records every command. File commands run for real inside the test
    /// sandbox; package and service tools only report success.
    struct RecordingOps {
        commands: Mutex<Vec<PlatformCommand>>,
        fail_program: Option<&'static str>,
        real: LinuxProcessOperations,
    }

    impl RecordingOps {
        fn new(fail_program: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                commands: Mutex::new(Vec::new()),
                fail_program,
                real: LinuxProcessOperations::new(),
            })
        }

        fn lines(&self) -> Vec<String> {
            self.commands
                .lock()
                .unwrap()
                .iter()
                .map(ToString::to_string)
                .collect()
        }

        fn programs(&self) -> Vec<String> {
            self.commands
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.program().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl ProcessOperations for RecordingOps {
        async fn execute_command(
            &self,
            ctx: &PlatformContext,
            cmd: PlatformCommand,
        ) -> Result<CommandOutput, Error> {
            self.commands.lock().unwrap().push(cmd.clone());

            if self.fail_program == Some(cmd.program()) {
                return Ok(CommandOutput {
                    exit_code: Some(1),
                    stdout: Vec::new(),
                    stderr: b"simulated failure".to_vec(),
                });
            }

            match cmd.program() {
                "install" | "mv" | "cp" | "rm" | "mkdir" => self.real.execute_command(ctx, cmd).await,
                _ => Ok(CommandOutput {
                    exit_code: Some(0),
                    ..CommandOutput::default()
                }),
            }
        }

        async fn which(&self, program: &str) -> Result<PathBuf, Error> {
            Ok(Path::new("/usr/bin").join(program))
        }
    }

    /// Host filesystem laid out like an unpacked provisioning bundle
    struct Sandbox {
        root: TempDir,
        server: MockServer,
    }

    impl Sandbox {
        fn new(os_release: &str) -> Self {
            let root = tempfile::tempdir().unwrap();
            let p = root.path();

            for dir in [
                "etc/init.d",
                "work",
                "bundle/install-couchbase-server",
                "bundle/run-couchbase-server",
                "bundle/couchbase-commons/lib",
            ] {
                std::fs::create_dir_all(p.join(dir)).unwrap();
            }
            std::fs::write(p.join("etc/os-release"), os_release).unwrap();
            std::fs::write(p.join("etc/sysctl.conf"), "vm.swappiness = 60\n").unwrap();
            std::fs::write(
                p.join("bundle/install-couchbase-server/disable-thp"),
                "#!/bin/sh\n",
            )
            .unwrap();
            std::fs::write(
                p.join("bundle/run-couchbase-server/run-couchbase-server"),
                "#!/bin/sh\n",
            )
            .unwrap();
            std::fs::write(
                p.join("bundle/couchbase-commons/couchbase-rally-point"),
                "#!/bin/sh\n",
            )
            .unwrap();
            std::fs::write(p.join("bundle/couchbase-commons/lib/common.sh"), "x=1\n").unwrap();

            Self {
                root,
                server: MockServer::start(),
            }
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.root.path().join(rel)
        }

        fn config(&self) -> Config {
            let digest = Checksum::from_data(ChecksumType::Md5, PACKAGE).to_hex();
            let mut config = Config::default();
            config.download.base_url = self.server.url("/releases");
            config.host.os_release = self.path("etc/os-release");
            config.host.privilege_command = String::new();
            config.defaults.community.ubuntu_checksum = Some(digest.clone());
            config.defaults.community.amazon_linux_checksum = Some(digest);
            config.paths.bundle_dir = Some(self.path("bundle/install-couchbase-server"));
            config.paths.work_dir = Some(self.path("work"));
            config.paths.sysctl_conf = self.path("etc/sysctl.conf");
            config.paths.thp_script_dest = self.path("etc/init.d/disable-thp");
            config.paths.bin_dir = self.path("opt/couchbase/bin");
            config.paths.commons_dest = self.path("opt/couchbase-commons");
            config
        }

        fn context(&self, config: Config, ops: &Arc<RecordingOps>) -> (OpsCtx, EventReceiver) {
            let (tx, rx) = channel();
            let ctx = OpsContextBuilder::new()
                .with_config(config)
                .with_platform(Platform::new(ops.clone()))
                .with_net(NetClient::new(&NetConfig::default()).unwrap())
                .with_event_sender(tx)
                .build()
                .unwrap();
            (ctx, rx)
        }

        fn work_dir_is_empty(&self) -> bool {
            std::fs::read_dir(self.path("work")).unwrap().next().is_none()
        }
    }

    fn community(swappiness: u8) -> RequestArgs {
        RequestArgs {
            edition: Edition::Community,
            swappiness,
            ..RequestArgs::default()
        }
    }

    fn started_phases(rx: &mut EventReceiver) -> Vec<ProvisionPhase> {
        std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|m| match m.event {
                AppEvent::Provision(ProvisionEvent::PhaseStarted { phase }) => Some(phase),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_community_install_on_ubuntu() {
        let sandbox = Sandbox::new(UBUNTU_1804);
        let mock = sandbox.server.mock(|when, then| {
            when.method(GET)
                .path("/releases/6.0.0/couchbase-server-community_6.0.0-ubuntu18.04_amd64.deb");
            then.status(200).body(PACKAGE);
        });
        let ops = RecordingOps::new(None);
        let (ctx, mut rx) = sandbox.context(sandbox.config(), &ops);

        let report = provision(&ctx, &community(1)).await.unwrap();

        mock.assert();
        assert_eq!(report.platform, "ubuntu18.04");
        assert_eq!(report.request.version, "6.0.0");
        assert_eq!(report.request.checksum_type, ChecksumType::Md5);
        assert!(report.request.defaulted);
        assert!(report.swappiness_changed);
        assert_eq!(report.staged.len(), 3);

        assert_eq!(
            ops.programs(),
            [
                "apt-get", "apt-get", "dpkg", "systemctl", "install", "mv", "install",
                "update-rc.d", "install", "install", "rm", "mkdir", "cp",
            ]
        );
        let lines = ops.lines();
        assert!(lines[2].starts_with("INSTALL_DONT_START_SERVER=1 dpkg -i "));
        assert!(lines[2].ends_with("couchbase-server-community_6.0.0-ubuntu18.04_amd64.deb"));
        assert_eq!(lines[3], "systemctl disable couchbase-server");
        assert_eq!(lines[7], "update-rc.d disable-thp defaults");

        assert_eq!(
            std::fs::read_to_string(sandbox.path("etc/sysctl.conf")).unwrap(),
            "vm.swappiness = 1\n"
        );
        let thp = std::fs::metadata(sandbox.path("etc/init.d/disable-thp")).unwrap();
        assert_eq!(thp.permissions().mode() & 0o777, 0o755);
        assert!(sandbox.path("opt/couchbase/bin/run-couchbase-server").exists());
        assert!(sandbox.path("opt/couchbase/bin/couchbase-rally-point").exists());
        assert!(sandbox.path("opt/couchbase-commons/lib/common.sh").exists());
        assert!(sandbox.work_dir_is_empty());

        assert_eq!(
            started_phases(&mut rx),
            [
                ProvisionPhase::ParsingArgs,
                ProvisionPhase::Validating,
                ProvisionPhase::Dispatching,
                ProvisionPhase::Downloading,
                ProvisionPhase::Verifying,
                ProvisionPhase::InstallingPackage,
                ProvisionPhase::Tuning,
                ProvisionPhase::Staging,
                ProvisionPhase::Done,
            ]
        );
        assert_eq!(report.phases.len(), 9);
    }

    #[tokio::test]
    async fn test_explicit_version_on_amazon_linux() {
        let sandbox = Sandbox::new(AMAZON_LINUX_2);
        let digest = Checksum::from_data(ChecksumType::Sha256, PACKAGE)
            .to_hex()
            .to_uppercase();
        let mock = sandbox.server.mock(|when, then| {
            when.method(GET)
                .path("/releases/6.0.1/couchbase-server-enterprise-6.0.1-amzn2.x86_64.rpm");
            then.status(200).body(PACKAGE);
        });
        let ops = RecordingOps::new(None);
        let (ctx, _rx) = sandbox.context(sandbox.config(), &ops);

        let args = RequestArgs {
            edition: Edition::Enterprise,
            version: Some("6.0.1".into()),
            checksum: Some(digest),
            checksum_type: Some(ChecksumType::Sha256),
            swappiness: 0,
        };
        let report = provision(&ctx, &args).await.unwrap();

        mock.assert();
        assert_eq!(report.platform, "amzn2");
        assert!(!report.request.defaulted);
        let lines = ops.lines();
        assert_eq!(lines[0], "yum update -y");
        assert_eq!(lines[1], "yum install -y pkgconfig openssl jq");
        assert!(lines[2].starts_with("INSTALL_DONT_START_SERVER=1 rpm -i "));
        assert!(lines.contains(&"chkconfig --add disable-thp".to_string()));
    }

    #[tokio::test]
    async fn test_corrupted_package_is_never_installed() {
        let sandbox = Sandbox::new(UBUNTU_1804);
        let mut corrupted = PACKAGE.to_vec();
        corrupted[0] ^= 0x01;
        sandbox.server.mock(|when, then| {
            when.method(GET);
            then.status(200).body(&corrupted);
        });
        let ops = RecordingOps::new(None);
        let (ctx, mut rx) = sandbox.context(sandbox.config(), &ops);

        let err = provision(&ctx, &community(0)).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Integrity(IntegrityError::ChecksumMismatch { .. })
        ));
        assert_eq!(ops.programs(), ["apt-get", "apt-get"]);
        assert!(sandbox.work_dir_is_empty());
        assert_eq!(
            std::fs::read_to_string(sandbox.path("etc/sysctl.conf")).unwrap(),
            "vm.swappiness = 60\n"
        );

        let failed = std::iter::from_fn(|| rx.try_recv().ok()).find_map(|m| match m.event {
            AppEvent::Provision(ProvisionEvent::PhaseFailed { phase, .. }) => Some(phase),
            _ => None,
        });
        assert_eq!(failed, Some(ProvisionPhase::Verifying));
    }

    #[tokio::test]
    async fn test_unsupported_host_takes_no_action() {
        let sandbox = Sandbox::new(FEDORA);
        let mock = sandbox.server.mock(|when, then| {
            when.method(GET);
            then.status(200).body(PACKAGE);
        });
        let ops = RecordingOps::new(None);
        let (ctx, _rx) = sandbox.context(sandbox.config(), &ops);

        let err = provision(&ctx, &community(0)).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Platform(PlatformError::UnsupportedPlatform { ref os_id, .. }) if os_id == "fedora"
        ));
        mock.assert_hits(0);
        assert!(ops.programs().is_empty());
    }

    #[tokio::test]
    async fn test_unverified_version_fails_before_any_io() {
        let sandbox = Sandbox::new(UBUNTU_1804);
        let ops = RecordingOps::new(None);
        let (ctx, _rx) = sandbox.context(sandbox.config(), &ops);

        let mut args = community(0);
        args.version = Some("6.0.0".into());
        let err = provision(&ctx, &args).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Usage(UsageError::UnverifiedVersion { .. })
        ));
        assert!(ops.programs().is_empty());
    }

    #[tokio::test]
    async fn test_blank_checksum_fails_before_any_io() {
        let sandbox = Sandbox::new(UBUNTU_1804);
        let mock = sandbox.server.mock(|when, then| {
            when.method(GET);
            then.status(200).body(PACKAGE);
        });
        let ops = RecordingOps::new(None);
        let (ctx, _rx) = sandbox.context(sandbox.config(), &ops);

        let mut args = community(0);
        args.version = Some("6.0.0".into());
        args.checksum = Some("   ".into());
        args.checksum_type = Some(ChecksumType::Md5);
        let err = provision(&ctx, &args).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Usage(UsageError::InvalidValue { ref flag, .. }) if flag == "--checksum"
        ));
        assert!(ops.programs().is_empty());
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_unset_default_digest_fails_before_any_io() {
        let sandbox = Sandbox::new(UBUNTU_1804);
        let mock = sandbox.server.mock(|when, then| {
            when.method(GET);
            then.status(200).body(PACKAGE);
        });
        let ops = RecordingOps::new(None);
        let mut config = sandbox.config();
        config.defaults.community.ubuntu_checksum = None;
        let (ctx, _rx) = sandbox.context(config, &ops);

        let err = provision(&ctx, &community(0)).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Config(ConfigError::DefaultDigestUnset { ref field })
                if field == "defaults.community.ubuntu_checksum"
        ));
        assert!(err.user_hint().is_some());
        assert!(ops.programs().is_empty());
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_failed_install_stops_the_pass() {
        let sandbox = Sandbox::new(UBUNTU_1804);
        sandbox.server.mock(|when, then| {
            when.method(GET);
            then.status(200).body(PACKAGE);
        });
        let ops = RecordingOps::new(Some("dpkg"));
        let (ctx, _rx) = sandbox.context(sandbox.config(), &ops);

        let err = provision(&ctx, &community(0)).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Platform(PlatformError::CommandFailed { exit_code: Some(1), .. })
        ));
        assert_eq!(ops.programs(), ["apt-get", "apt-get", "dpkg"]);
        assert!(sandbox.work_dir_is_empty());
    }

    #[tokio::test]
    async fn test_download_failure_is_fatal() {
        let sandbox = Sandbox::new(UBUNTU_1804);
        let mock = sandbox.server.mock(|when, then| {
            when.method(GET);
            then.status(503);
        });
        let ops = RecordingOps::new(None);
        let (ctx, _rx) = sandbox.context(sandbox.config(), &ops);

        let err = provision(&ctx, &community(0)).await.unwrap_err();

        assert!(matches!(err, Error::Network(_)));
        mock.assert_hits(1);
        assert!(!ops.programs().iter().any(|p| p == "dpkg"));
        assert!(sandbox.work_dir_is_empty());
    }

    #[tokio::test]
    async fn test_swappiness_update_is_idempotent() {
        let sandbox = Sandbox::new(UBUNTU_1804);
        std::fs::write(
            sandbox.path("etc/sysctl.conf"),
            "kernel.pid_max = 65536\nvm.swappiness = 60\n",
        )
        .unwrap();
        let ops = RecordingOps::new(None);
        let (ctx, _rx) = sandbox.context(sandbox.config(), &ops);

        assert!(tuning::update_swappiness(&ctx, 0).await.unwrap());
        assert!(!tuning::update_swappiness(&ctx, 0).await.unwrap());
        assert_eq!(ops.programs(), ["install", "mv"]);

        assert!(tuning::update_swappiness(&ctx, 10).await.unwrap());
        assert_eq!(
            std::fs::read_to_string(sandbox.path("etc/sysctl.conf")).unwrap(),
            "kernel.pid_max = 65536\nvm.swappiness = 10\n"
        );
    }

    #[tokio::test]
    async fn test_missing_sysctl_conf_is_created() {
        let sandbox = Sandbox::new(UBUNTU_1804);
        std::fs::remove_file(sandbox.path("etc/sysctl.conf")).unwrap();
        let ops = RecordingOps::new(None);
        let (ctx, _rx) = sandbox.context(sandbox.config(), &ops);

        assert!(tuning::update_swappiness(&ctx, 0).await.unwrap());
        assert_eq!(
            std::fs::read_to_string(sandbox.path("etc/sysctl.conf")).unwrap(),
            "vm.swappiness = 0\n"
        );
    }

    #[tokio::test]
    async fn test_staging_checks_sources_first() {
        let sandbox = Sandbox::new(UBUNTU_1804);
        std::fs::remove_dir_all(sandbox.path("bundle/couchbase-commons")).unwrap();
        let ops = RecordingOps::new(None);
        let (ctx, _rx) = sandbox.context(sandbox.config(), &ops);

        let err = staging::stage_companions(&ctx).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Platform(PlatformError::FilesystemOperationFailed { .. })
        ));
        assert!(ops.programs().is_empty());
    }
}
