//! Operations context for dependency injection

use cbnode_config::Config;
use cbnode_errors::Error;
use cbnode_events::{EventEmitter, EventSender};
use cbnode_net::NetClient;
use cbnode_platform::{Platform, PlatformContext};

use crate::profiles::ProfileRegistry;

/// Operations context providing access to all host-facing components
pub struct OpsCtx {
    /// Loaded and validated configuration
    pub config: Config,
    /// Command execution and privileged file operations
    pub platform: Platform,
    /// Event sink and escalation settings for platform calls
    pub platform_ctx: PlatformContext,
    /// HTTP client for the package download
    pub net: NetClient,
    /// Installer profiles the host is matched against
    pub profiles: ProfileRegistry,
    /// Event sender for progress reporting
    pub tx: EventSender,
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Builder for [`OpsCtx`]
pub struct OpsContextBuilder {
    config: Option<Config>,
    platform: Option<Platform>,
    net: Option<NetClient>,
    profiles: Option<ProfileRegistry>,
    tx: Option<EventSender>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            platform: None,
            net: None,
            profiles: None,
            tx: None,
        }
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set platform; defaults to the real host
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set network client
    #[must_use]
    pub fn with_net(mut self, net: NetClient) -> Self {
        self.net = Some(net);
        self
    }

    /// Set installer profiles; defaults to the built-in registry
    #[must_use]
    pub fn with_profiles(mut self, profiles: ProfileRegistry) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration, network client or event sender
    /// is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let config = self.config.ok_or_else(|| missing("config"))?;
        let net = self.net.ok_or_else(|| missing("net"))?;
        let tx = self.tx.ok_or_else(|| missing("event_sender"))?;

        let platform_ctx = PlatformContext::new(Some(tx.clone()))
            .with_privilege_command(config.host.privilege_command());

        Ok(OpsCtx {
            config,
            platform: self.platform.unwrap_or_else(Platform::current),
            platform_ctx,
            net,
            profiles: self.profiles.unwrap_or_else(ProfileRegistry::builtin),
            tx,
        })
    }
}

impl Default for OpsContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(component: &str) -> Error {
    Error::internal(format!("operations context is missing component: {component}"))
}
