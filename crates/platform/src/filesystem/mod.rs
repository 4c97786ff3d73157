//! Privileged filesystem operations
//!
//! Destinations such as `/etc` and `/opt` are root-owned, so every change is
//! expressed as a coreutils command routed through [`ProcessOperations`] with
//! escalation. Content is staged in-process in an unprivileged temp file.
//!
//! [`ProcessOperations`]: crate::process::ProcessOperations

use cbnode_errors::{Error, PlatformError};
use cbnode_events::{AppEvent, PlatformEvent};
use std::path::{Component, Path, PathBuf};

use crate::context::{Platform, PlatformContext};
use crate::process::PlatformCommand;

/// File mode for configuration files
pub const CONFIG_FILE_MODE: &str = "0644";
/// File mode for scripts and executables
pub const EXECUTABLE_MODE: &str = "0755";

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn fs_error(operation: &str, message: impl Into<String>) -> Error {
    PlatformError::FilesystemOperationFailed {
        operation: operation.to_string(),
        message: message.into(),
    }
    .into()
}

/// Sibling path used as the rename source for atomic replacement
fn staging_path(dest: &Path) -> Result<PathBuf, Error> {
    let name = dest
        .file_name()
        .ok_or_else(|| fs_error("replace_file", format!("{} has no file name", dest.display())))?;
    let mut staged = std::ffi::OsString::from(".");
    staged.push(name);
    staged.push(".cbnode-new");
    Ok(dest.with_file_name(staged))
}

/// Refuse destinations that a recursive delete must never touch
fn ensure_replaceable_dir(dest: &Path) -> Result<(), Error> {
    let depth = dest
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    if !dest.is_absolute() || depth < 2 || dest.components().any(|c| c == Component::ParentDir)
    {
        return Err(fs_error(
            "copy_tree",
            format!("refusing to replace {}", dest.display()),
        ));
    }
    Ok(())
}

impl Platform {
    /// Copy `src` to `dest` with `mode`, overwriting any existing file.
    ///
    /// With `create_parents`, missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the install command cannot run or exits non-zero.
    pub async fn install_file(
        &self,
        ctx: &PlatformContext,
        src: &Path,
        dest: &Path,
        mode: &str,
        create_parents: bool,
    ) -> Result<(), Error> {
        let mut cmd = PlatformCommand::privileged("install");
        if create_parents {
            cmd.arg("-D");
        }
        cmd.args(["-m", mode]).arg(path_arg(src)).arg(path_arg(dest));
        self.run_checked(ctx, cmd).await?;

        ctx.emit_event(AppEvent::Platform(
            PlatformEvent::FilesystemOperationCompleted {
                operation: "install_file".to_string(),
                paths_affected: vec![path_arg(dest)],
            },
        ));
        Ok(())
    }

    /// Atomically replace `dest` with `contents`.
    ///
    /// The content goes to an unprivileged temp file, is installed next to
    /// `dest` with `mode`, then renamed over `dest`. Readers observe either
    /// the old file or the new one, never a partial write.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp file cannot be written or either
    /// privileged step fails. The staged sibling is removed on rename failure.
    pub async fn replace_file(
        &self,
        ctx: &PlatformContext,
        dest: &Path,
        contents: &[u8],
        mode: &str,
    ) -> Result<(), Error> {
        let staged = staging_path(dest)?;
        let temp = tempfile::NamedTempFile::new()
            .map_err(|e| fs_error("replace_file", format!("temp file: {e}")))?;
        tokio::fs::write(temp.path(), contents)
            .await
            .map_err(|e| Error::io_with_path(&e, temp.path()))?;

        let mut install = PlatformCommand::privileged("install");
        install
            .args(["-m", mode])
            .arg(path_arg(temp.path()))
            .arg(path_arg(&staged));
        self.run_checked(ctx, install).await?;

        let mut rename = PlatformCommand::privileged("mv");
        rename.arg("-f").arg(path_arg(&staged)).arg(path_arg(dest));
        if let Err(e) = self.run_checked(ctx, rename).await {
            let mut cleanup = PlatformCommand::privileged("rm");
            cleanup.arg("-f").arg(path_arg(&staged));
            if let Err(cleanup_err) = self.run_checked(ctx, cleanup).await {
                tracing::debug!(error = %cleanup_err, "failed to remove staged file");
            }
            return Err(e);
        }

        ctx.emit_event(AppEvent::Platform(
            PlatformEvent::FilesystemOperationCompleted {
                operation: "replace_file".to_string(),
                paths_affected: vec![path_arg(dest)],
            },
        ));
        Ok(())
    }

    /// Replace the directory `dest` with a recursive copy of `src`.
    ///
    /// Any existing `dest` is removed first, so the result mirrors `src`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dest` is not an absolute path at least two levels
    /// deep, or if any of the remove/create/copy commands fails.
    pub async fn copy_tree(
        &self,
        ctx: &PlatformContext,
        src: &Path,
        dest: &Path,
    ) -> Result<(), Error> {
        ensure_replaceable_dir(dest)?;

        let mut remove = PlatformCommand::privileged("rm");
        remove.arg("-rf").arg(path_arg(dest));
        self.run_checked(ctx, remove).await?;

        if let Some(parent) = dest.parent() {
            let mut mkdir = PlatformCommand::privileged("mkdir");
            mkdir.arg("-p").arg(path_arg(parent));
            self.run_checked(ctx, mkdir).await?;
        }

        let mut copy = PlatformCommand::privileged("cp");
        copy.arg("-R").arg(path_arg(src)).arg(path_arg(dest));
        self.run_checked(ctx, copy).await?;

        ctx.emit_event(AppEvent::Platform(
            PlatformEvent::FilesystemOperationCompleted {
                operation: "copy_tree".to_string(),
                paths_affected: vec![path_arg(dest)],
            },
        ));
        Ok(())
    }
}
