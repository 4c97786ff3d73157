//! Package acquisition and installation

use cbnode_errors::Error;
use cbnode_events::{AppEvent, EventEmitter, ProvisionEvent};
use cbnode_hash::Checksum;
use cbnode_types::InstallRequest;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::profiles::PlatformProfile;
use crate::OpsCtx;

/// Download location of the package for `profile`
///
/// # Errors
///
/// Returns `NetworkError::InvalidUrl` if the configured base URL is unusable.
pub fn artifact_url(
    ctx: &OpsCtx,
    profile: &dyn PlatformProfile,
    request: &InstallRequest,
) -> Result<String, Error> {
    let artifact = profile.artifact_name(request.edition, &request.version);
    cbnode_net::join_url(
        &ctx.config.download.base_url,
        &[request.version.as_str(), artifact.as_str()],
    )
}

/// Refresh the package index and install the server's prerequisites
///
/// # Errors
///
/// Returns the first package-manager command that fails.
pub async fn refresh_dependencies(ctx: &OpsCtx, profile: &dyn PlatformProfile) -> Result<(), Error> {
    for cmd in profile.dependency_commands() {
        ctx.platform.run_checked(&ctx.platform_ctx, cmd).await?;
    }
    Ok(())
}

/// Scratch directory holding the downloaded package
///
/// The directory and everything in it is removed when the value is dropped,
/// so the artifact never outlives the install attempt.
#[derive(Debug)]
pub struct ArtifactDir {
    dir: TempDir,
}

impl ArtifactDir {
    /// Create a fresh directory under `parent`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if `parent` is missing or not writable.
    pub fn create(parent: &Path) -> Result<Self, Error> {
        let dir = tempfile::Builder::new()
            .prefix("cbnode-")
            .tempdir_in(parent)
            .map_err(|e| Error::io_with_path(&e, parent))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory, logging instead of failing
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!(path = %path.display(), error = %e, "could not remove downloaded package");
        }
    }
}

/// Fetch the package into `dir`
///
/// # Errors
///
/// Propagates transport, HTTP status and write failures.
pub async fn download_artifact(ctx: &OpsCtx, url: &str, dir: &ArtifactDir) -> Result<PathBuf, Error> {
    let name = url.rsplit('/').next().filter(|n| !n.is_empty()).unwrap_or("package");
    let dest = dir.path().join(name);
    let result = cbnode_net::download_file(&ctx.net, url, &dest, &ctx.tx).await?;
    Ok(result.path)
}

/// Check the downloaded package against the requested digest
///
/// # Errors
///
/// Returns `IntegrityError::ChecksumMismatch` if the digests differ.
pub async fn verify_artifact(
    ctx: &OpsCtx,
    path: &Path,
    request: &InstallRequest,
) -> Result<Checksum, Error> {
    let checksum = cbnode_hash::verify_file(path, &request.checksum, request.checksum_type).await?;
    ctx.emit(AppEvent::Provision(ProvisionEvent::ChecksumVerified {
        algorithm: checksum.algorithm(),
        digest: checksum.to_hex(),
    }));
    Ok(checksum)
}

/// Install the verified package and keep the service from starting at boot
///
/// # Errors
///
/// Returns `PlatformError::CommandFailed` if the package tool or the service
/// manager exits non-zero.
pub async fn install_package(
    ctx: &OpsCtx,
    profile: &dyn PlatformProfile,
    package: &Path,
) -> Result<(), Error> {
    ctx.platform
        .run_checked(&ctx.platform_ctx, profile.install_command(package))
        .await?;
    ctx.platform
        .run_checked(
            &ctx.platform_ctx,
            profile.disable_service_command(&ctx.config.host.service_name),
        )
        .await?;
    Ok(())
}
