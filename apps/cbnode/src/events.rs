//! Event handling and status display

use cbnode_events::{
    AppEvent, DownloadEvent, EventMessage, GeneralEvent, PlatformEvent, ProvisionEvent,
};
use cbnode_types::ProvisionPhase;
use console::{Style, Term};

/// Renders progress lines on stderr and forwards every event to tracing
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    /// Echo host commands as they run
    debug_enabled: bool,
    /// Suppress status lines so stdout carries only the JSON report
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            quiet,
        }
    }

    pub fn handle_event(&mut self, message: EventMessage) {
        crate::logging::log_event_with_tracing(&message);
        if self.quiet {
            return;
        }

        match message.event {
            AppEvent::Provision(event) => self.handle_provision(event),
            AppEvent::Download(event) => self.handle_download(event),
            AppEvent::Platform(event) => self.handle_platform(event),
            AppEvent::General(event) => self.handle_general(event),
        }
    }

    fn handle_provision(&self, event: ProvisionEvent) {
        match event {
            ProvisionEvent::PhaseStarted { phase } if phase != ProvisionPhase::Done => {
                self.show_heading(&phase.to_string());
            }
            ProvisionEvent::PhaseFailed { phase, failure } => {
                self.show_error(&format!("{phase} failed: {}", failure.message));
                if let Some(hint) = failure.hint {
                    self.show_status(&format!("hint: {hint}"));
                }
            }
            ProvisionEvent::RequestResolved {
                edition,
                version,
                checksum_type,
                defaulted,
            } => {
                let origin = if defaulted { " (default)" } else { "" };
                self.show_status(&format!(
                    "Couchbase Server {edition} {version}{origin}, verified with {checksum_type}"
                ));
            }
            ProvisionEvent::ProfileSelected { profile, artifact } => {
                self.show_status(&format!("Using {profile} installer: {artifact}"));
            }
            ProvisionEvent::ChecksumVerified { algorithm, .. } => {
                self.show_success(&format!("{algorithm} checksum matches"));
            }
            ProvisionEvent::SwappinessApplied {
                path,
                value,
                changed,
            } => {
                if changed {
                    self.show_success(&format!("vm.swappiness = {value} written to {path}"));
                } else {
                    self.show_status(&format!("vm.swappiness already {value} in {path}"));
                }
            }
            ProvisionEvent::FileStaged { destination, .. } => {
                self.show_success(&format!("Installed {destination}"));
            }
            ProvisionEvent::Completed { profile, .. } => {
                self.show_success(&format!("Provisioning finished on {profile}"));
            }
            ProvisionEvent::PhaseStarted { .. } | ProvisionEvent::PhaseCompleted { .. } => {}
        }
    }

    fn handle_download(&self, event: DownloadEvent) {
        match event {
            DownloadEvent::Started { url, total_bytes } => match total_bytes {
                Some(bytes) => self.show_status(&format!("Downloading {url} ({})", human_bytes(bytes))),
                None => self.show_status(&format!("Downloading {url}")),
            },
            DownloadEvent::Completed {
                bytes_downloaded,
                duration_ms,
                ..
            } => {
                self.show_success(&format!(
                    "Downloaded {} in {:.1}s",
                    human_bytes(bytes_downloaded),
                    std::time::Duration::from_millis(duration_ms).as_secs_f64()
                ));
            }
            DownloadEvent::Failed { url, failure } => {
                self.show_error(&format!("Download of {url} failed: {}", failure.message));
            }
        }
    }

    fn handle_platform(&self, event: PlatformEvent) {
        match event {
            PlatformEvent::HostDetected {
                os_id,
                version_id,
                pretty_name,
            } => {
                let name = pretty_name.unwrap_or_else(|| format!("{os_id} {version_id}"));
                self.show_status(&format!("Detected {name}"));
            }
            PlatformEvent::ProcessExecutionStarted { command, .. } if self.debug_enabled => {
                self.show_status(&format!("$ {command}"));
            }
            PlatformEvent::ProcessExecutionFailed {
                command,
                error_message,
                ..
            } => {
                self.show_error(&format!("{command}: {error_message}"));
            }
            _ => {}
        }
    }

    fn handle_general(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => {
                let text = match context {
                    Some(context) => format!("warning: {message} ({context})"),
                    None => format!("warning: {message}"),
                };
                self.write(&self.style(Style::new().yellow()).apply_to(text).to_string());
            }
            GeneralEvent::DebugLog { message, .. } if self.debug_enabled => {
                self.show_status(&message);
            }
            _ => {}
        }
    }

    fn style(&self, style: Style) -> Style {
        if self.colors_enabled {
            style
        } else {
            Style::new()
        }
    }

    fn show_heading(&self, message: &str) {
        self.write(
            &self
                .style(Style::new().cyan().bold())
                .apply_to(format!("==> {message}"))
                .to_string(),
        );
    }

    fn show_status(&self, message: &str) {
        self.write(&format!("    {message}"));
    }

    fn show_success(&self, message: &str) {
        let mark = self.style(Style::new().green()).apply_to("✓");
        self.write(&format!("    {mark} {message}"));
    }

    fn show_error(&self, message: &str) {
        let mark = self.style(Style::new().red().bold()).apply_to("✗");
        self.write(&format!("    {mark} {message}"));
    }

    fn write(&self, line: &str) {
        self.term.write_line(line).unwrap_or(());
    }
}

#[allow(clippy::cast_precision_loss)]
fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
