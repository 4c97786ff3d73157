//! Companion script staging

use cbnode_errors::{Error, PlatformError};
use cbnode_events::{AppEvent, EventEmitter, ProvisionEvent};
use cbnode_platform::filesystem::EXECUTABLE_MODE;
use std::path::{Path, PathBuf};

use crate::OpsCtx;

/// Fail unless `source` exists on the local filesystem
///
/// # Errors
///
/// Returns `PlatformError::FilesystemOperationFailed` naming the missing path.
pub async fn require_source(source: &Path) -> Result<(), Error> {
    match tokio::fs::try_exists(source).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(PlatformError::FilesystemOperationFailed {
            operation: "stage".to_string(),
            message: format!("source {} does not exist", source.display()),
        }
        .into()),
        Err(e) => Err(Error::io_with_path(&e, source)),
    }
}

/// Copy the companion scripts into the server's `bin` directory and replace
/// the shared support directory
///
/// Returns the destinations written, in order.
///
/// # Errors
///
/// Returns an error if any source is missing or a copy fails. Sources are
/// checked before anything is copied.
pub async fn stage_companions(ctx: &OpsCtx) -> Result<Vec<PathBuf>, Error> {
    let paths = &ctx.config.paths;

    let mut plan = Vec::with_capacity(paths.companion_scripts.len());
    for script in &paths.companion_scripts {
        let source = ctx.config.resolve_source(script)?;
        let name = source.file_name().ok_or_else(|| PlatformError::FilesystemOperationFailed {
            operation: "stage".to_string(),
            message: format!("{} has no file name", source.display()),
        })?;
        let dest = paths.bin_dir.join(name);
        plan.push((source, dest));
    }
    let commons = ctx.config.resolve_source(&paths.commons_source)?;

    for (source, _) in &plan {
        require_source(source).await?;
    }
    require_source(&commons).await?;

    let mut staged = Vec::with_capacity(plan.len() + 1);
    for (source, dest) in plan {
        ctx.platform
            .install_file(&ctx.platform_ctx, &source, &dest, EXECUTABLE_MODE, true)
            .await?;
        emit_staged(ctx, &source, &dest);
        staged.push(dest);
    }

    ctx.platform
        .copy_tree(&ctx.platform_ctx, &commons, &paths.commons_dest)
        .await?;
    emit_staged(ctx, &commons, &paths.commons_dest);
    staged.push(paths.commons_dest.clone());

    Ok(staged)
}

fn emit_staged(ctx: &OpsCtx, source: &Path, dest: &Path) {
    ctx.emit(AppEvent::Provision(ProvisionEvent::FileStaged {
        source: source.display().to_string(),
        destination: dest.display().to_string(),
    }));
}
