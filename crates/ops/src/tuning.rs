//! Kernel tuning for the database workload

use cbnode_errors::Error;
use cbnode_events::{AppEvent, EventEmitter, ProvisionEvent};
use cbnode_platform::filesystem::{CONFIG_FILE_MODE, EXECUTABLE_MODE};
use regex::Regex;
use std::io::ErrorKind;
use std::path::Path;

use crate::profiles::PlatformProfile;
use crate::staging::require_source;
use crate::textpatch::{replace_or_append, SWAPPINESS_PATTERN};
use crate::OpsCtx;

/// Set `vm.swappiness` in the sysctl config, returning whether the file changed
///
/// A missing file is treated as empty. The file is rewritten atomically and
/// only when its content differs.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the privileged write fails.
pub async fn update_swappiness(ctx: &OpsCtx, value: u8) -> Result<bool, Error> {
    let path = &ctx.config.paths.sysctl_conf;
    let current = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::io_with_path(&e, path)),
    };

    let pattern = Regex::new(SWAPPINESS_PATTERN).map_err(|e| Error::internal(e.to_string()))?;
    let patched = replace_or_append(&current, &pattern, &format!("vm.swappiness = {value}"));

    if patched.changed {
        ctx.platform
            .replace_file(
                &ctx.platform_ctx,
                path,
                patched.content.as_bytes(),
                CONFIG_FILE_MODE,
            )
            .await?;
    } else {
        tracing::debug!(path = %path.display(), value, "swappiness already set");
    }

    ctx.emit(AppEvent::Provision(ProvisionEvent::SwappinessApplied {
        path: path.display().to_string(),
        value,
        changed: patched.changed,
    }));
    Ok(patched.changed)
}

/// Install the boot script that turns off transparent huge pages and
/// register it with the host's init system
///
/// # Errors
///
/// Returns an error if the template is missing, the copy fails, or the
/// registration command exits non-zero.
pub async fn disable_transparent_huge_pages(
    ctx: &OpsCtx,
    profile: &dyn PlatformProfile,
) -> Result<(), Error> {
    let source = ctx.config.resolve_source(&ctx.config.paths.thp_script_source)?;
    require_source(&source).await?;
    let dest = &ctx.config.paths.thp_script_dest;

    ctx.platform
        .install_file(&ctx.platform_ctx, &source, dest, EXECUTABLE_MODE, false)
        .await?;
    ctx.emit(AppEvent::Provision(ProvisionEvent::FileStaged {
        source: source.display().to_string(),
        destination: dest.display().to_string(),
    }));

    let script = script_name(dest)?;
    ctx.platform
        .run_checked(
            &ctx.platform_ctx,
            profile.register_boot_script_command(script),
        )
        .await?;
    Ok(())
}

fn script_name(dest: &Path) -> Result<&str, Error> {
    dest.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::internal(format!("{} has no usable file name", dest.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_script_name_comes_from_destination() {
        assert_eq!(
            script_name(Path::new("/etc/init.d/disable-thp")).unwrap(),
            "disable-thp"
        );
        assert!(script_name(Path::new("/")).is_err());
    }
}
