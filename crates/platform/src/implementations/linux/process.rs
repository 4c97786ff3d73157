//! Linux process operations implementation
//!
//! Commands run through `tokio::process::Command` with stdin closed. A
//! privileged command is wrapped as `<privilege> env K=V… program args…` when
//! the context carries a privilege program, and runs directly otherwise.

use async_trait::async_trait;
use cbnode_errors::{Error, PlatformError};
use cbnode_events::{duration_millis, AppEvent, PlatformEvent};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use crate::context::PlatformContext;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Host implementation of process operations
#[derive(Debug, Default)]
pub struct LinuxProcessOperations;

impl LinuxProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Build the tokio command, applying privilege escalation when requested
fn build_command(ctx: &PlatformContext, cmd: &PlatformCommand) -> Command {
    let escalate = if cmd.is_privileged() {
        ctx.privilege_command()
    } else {
        None
    };

    let mut command = match escalate {
        Some(privilege) => {
            let mut command = Command::new(privilege);
            // sudo resets the environment, so variables travel through env(1).
            if !cmd.get_env_vars().is_empty() {
                command.arg("env");
                for (key, value) in cmd.get_env_vars() {
                    command.arg(format!("{key}={value}"));
                }
            }
            command.arg(cmd.program());
            command
        }
        None => {
            let mut command = Command::new(cmd.program());
            for (key, value) in cmd.get_env_vars() {
                command.env(key, value);
            }
            command
        }
    };

    command
        .args(cmd.get_args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}

#[async_trait]
impl ProcessOperations for LinuxProcessOperations {
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        let start = Instant::now();
        let line = cmd.to_string();

        ctx.emit_event(AppEvent::Platform(PlatformEvent::ProcessExecutionStarted {
            command: line.clone(),
            privileged: cmd.is_privileged(),
        }));

        let result = build_command(ctx, &cmd).output().await;
        let duration_ms = duration_millis(start.elapsed());

        match result {
            Ok(output) => {
                let output = CommandOutput {
                    exit_code: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                };
                if output.success() {
                    ctx.emit_event(AppEvent::Platform(
                        PlatformEvent::ProcessExecutionCompleted {
                            command: line,
                            duration_ms,
                        },
                    ));
                } else {
                    ctx.emit_event(AppEvent::Platform(PlatformEvent::ProcessExecutionFailed {
                        command: line,
                        exit_code: output.exit_code,
                        error_message: output.stderr_lossy().trim().to_string(),
                        duration_ms,
                    }));
                }
                Ok(output)
            }
            Err(e) => {
                let error = PlatformError::ProcessExecutionFailed {
                    command: line.clone(),
                    message: e.to_string(),
                };
                ctx.emit_event(AppEvent::Platform(PlatformEvent::ProcessExecutionFailed {
                    command: line,
                    exit_code: None,
                    error_message: error.to_string(),
                    duration_ms,
                }));
                Err(error.into())
            }
        }
    }

    async fn which(&self, program: &str) -> Result<PathBuf, Error> {
        which::which(program).map_err(|_| {
            PlatformError::CommandNotFound {
                command: program.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_unprivileged_command_with_env() {
        let ops = LinuxProcessOperations::new();
        let ctx = PlatformContext::new(None);
        let mut cmd = PlatformCommand::new("sh");
        cmd.env("CBNODE_TEST_VALUE", "42")
            .args(["-c", "printf %s \"$CBNODE_TEST_VALUE\""]);

        let output = ops.execute_command(&ctx, cmd).await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, b"42");
    }

    #[tokio::test]
    async fn privileged_command_without_escalation_runs_directly() {
        let ops = LinuxProcessOperations::new();
        let ctx = PlatformContext::new(None).with_privilege_command(None);
        let mut cmd = PlatformCommand::privileged("sh");
        cmd.args(["-c", "exit 3"]);

        let output = ops.execute_command(&ctx, cmd).await.unwrap();
        assert_eq!(output.exit_code, Some(3));
    }

    #[tokio::test]
    async fn escalation_program_prefixes_env_and_program() {
        // `env` stands in for sudo: `env env K=V sh -c ...` still runs the command.
        let ops = LinuxProcessOperations::new();
        let ctx = PlatformContext::new(None).with_privilege_command(Some("env"));
        let mut cmd = PlatformCommand::privileged("sh");
        cmd.env("INSTALL_DONT_START_SERVER", "1")
            .args(["-c", "printf %s \"$INSTALL_DONT_START_SERVER\""]);

        let output = ops.execute_command(&ctx, cmd).await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, b"1");
    }

    #[tokio::test]
    async fn missing_program_is_execution_failure() {
        let ops = LinuxProcessOperations::new();
        let ctx = PlatformContext::new(None);
        let cmd = PlatformCommand::new("cbnode-definitely-not-installed");
        let err = ops.execute_command(&ctx, cmd).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Platform(PlatformError::ProcessExecutionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn which_reports_missing_tools() {
        let ops = LinuxProcessOperations::new();
        assert!(ops.which("sh").await.is_ok());
        let err = ops.which("cbnode-definitely-not-installed").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Platform(PlatformError::CommandNotFound { .. })
        ));
    }
}
