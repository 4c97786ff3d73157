//! Platform context and the main `Platform` handle

use cbnode_errors::{Error, PlatformError};
use cbnode_events::{AppEvent, EventEmitter, EventSender};
use std::path::PathBuf;
use std::sync::Arc;

use crate::implementations::linux::LinuxProcessOperations;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Context for platform operations: event emission and privilege escalation
#[derive(Clone, Debug, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
    privilege_command: Option<String>,
}

impl PlatformContext {
    /// Create a new platform context with event emission capabilities
    #[must_use]
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self {
            event_sender,
            privilege_command: None,
        }
    }

    /// Program used to wrap privileged commands (e.g. `sudo`)
    #[must_use]
    pub fn with_privilege_command(mut self, command: Option<&str>) -> Self {
        self.privilege_command = command.map(str::to_string);
        self
    }

    #[must_use]
    pub fn privilege_command(&self) -> Option<&str> {
        self.privilege_command.as_deref()
    }

    /// Emit a platform event if event sender is available
    pub fn emit_event(&self, event: AppEvent) {
        self.emit(event);
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Main platform abstraction providing access to host operations
#[derive(Clone)]
pub struct Platform {
    process_ops: Arc<dyn ProcessOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementation
    #[must_use]
    pub fn new(process_ops: Arc<dyn ProcessOperations>) -> Self {
        Self { process_ops }
    }

    /// Platform backed by the real host
    #[must_use]
    pub fn current() -> Self {
        Self::new(Arc::new(LinuxProcessOperations::new()))
    }

    /// Access process operations
    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    /// Execute a command and require a zero exit status
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::CommandFailed` carrying the exit code and
    /// captured stderr when the command exits non-zero.
    pub async fn run_checked(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        let line = cmd.to_string();
        let output = self.process().execute_command(ctx, cmd).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(PlatformError::CommandFailed {
                command: line,
                exit_code: output.exit_code,
                stderr: output.stderr_lossy(),
            }
            .into())
        }
    }

    /// Locate a required tool
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::CommandNotFound` when the tool is not on `PATH`.
    pub async fn which(&self, program: &str) -> Result<PathBuf, Error> {
        self.process().which(program).await
    }
}
