//! End-to-end provisioning pass
//!
//! Phases run strictly in order and stop at the first failure. Completed
//! phases are not rolled back and nothing is retried.

use cbnode_errors::Error;
use cbnode_events::{duration_millis, AppEvent, EventEmitter, PlatformEvent, ProvisionEvent};
use cbnode_platform::OsRelease;
use cbnode_types::{PhaseRecord, ProvisionPhase, ProvisionReport};
use std::time::Instant;

use crate::request::{resolve_request, RequestArgs};
use crate::{install, preflight, staging, tuning, OpsCtx};

/// Records phase timings and reports transitions as events
struct PhaseTracker<'a> {
    ctx: &'a OpsCtx,
    current: Option<(ProvisionPhase, Instant)>,
    records: Vec<PhaseRecord>,
}

impl<'a> PhaseTracker<'a> {
    fn new(ctx: &'a OpsCtx) -> Self {
        Self {
            ctx,
            current: None,
            records: Vec::new(),
        }
    }

    /// Close the running phase and open `phase`
    fn enter(&mut self, phase: ProvisionPhase) {
        self.finish();
        self.ctx.emit_phase_started(phase);
        self.current = Some((phase, Instant::now()));
    }

    fn finish(&mut self) {
        if let Some((phase, started)) = self.current.take() {
            let elapsed = started.elapsed();
            self.ctx.emit_phase_completed(phase, elapsed);
            self.records.push(PhaseRecord {
                phase,
                duration_ms: duration_millis(elapsed),
            });
        }
    }

    fn fail(&mut self, error: &Error) {
        if let Some((phase, _)) = self.current.take() {
            self.ctx.emit_phase_failed(phase, error);
        }
    }
}

/// Provision this host: install Couchbase Server, tune the kernel and stage
/// the companion scripts
///
/// # Errors
///
/// Returns the first failure; a `PhaseFailed` event names the phase it
/// happened in.
pub async fn provision(ctx: &OpsCtx, args: &RequestArgs) -> Result<ProvisionReport, Error> {
    let mut tracker = PhaseTracker::new(ctx);
    match run(ctx, args, &mut tracker).await {
        Ok(report) => Ok(report),
        Err(e) => {
            tracker.fail(&e);
            Err(e)
        }
    }
}

async fn run(
    ctx: &OpsCtx,
    args: &RequestArgs,
    tracker: &mut PhaseTracker<'_>,
) -> Result<ProvisionReport, Error> {
    let start = Instant::now();

    tracker.enter(ProvisionPhase::ParsingArgs);
    args.validate()?;

    tracker.enter(ProvisionPhase::Validating);
    preflight::check_tools(
        &ctx.platform,
        &preflight::base_tools(ctx.platform_ctx.privilege_command()),
    )
    .await?;

    let os = OsRelease::load(&ctx.config.host.os_release).await?;
    ctx.emit(AppEvent::Platform(PlatformEvent::HostDetected {
        os_id: os.id.clone(),
        version_id: os.version_id.clone(),
        pretty_name: os.pretty_name.clone(),
    }));

    let profile = ctx.profiles.detect(&os)?;
    preflight::check_tools(&ctx.platform, profile.required_tools()).await?;

    let request = resolve_request(args, &ctx.config.defaults, profile.host_class(), ctx)?;
    ctx.emit(AppEvent::Provision(ProvisionEvent::RequestResolved {
        edition: request.edition,
        version: request.version.clone(),
        checksum_type: request.checksum_type,
        defaulted: request.defaulted,
    }));

    let artifact_url = install::artifact_url(ctx, profile, &request)?;
    ctx.emit(AppEvent::Provision(ProvisionEvent::ProfileSelected {
        profile: profile.name().to_string(),
        artifact: artifact_url.clone(),
    }));

    tracker.enter(ProvisionPhase::Dispatching);
    install::refresh_dependencies(ctx, profile).await?;

    tracker.enter(ProvisionPhase::Downloading);
    let artifact_dir = install::ArtifactDir::create(&ctx.config.work_dir())?;
    ctx.emit_debug(format!("downloading into {}", artifact_dir.path().display()));
    let package = install::download_artifact(ctx, &artifact_url, &artifact_dir).await?;

    tracker.enter(ProvisionPhase::Verifying);
    install::verify_artifact(ctx, &package, &request).await?;

    tracker.enter(ProvisionPhase::InstallingPackage);
    install::install_package(ctx, profile, &package).await?;
    artifact_dir.cleanup();

    tracker.enter(ProvisionPhase::Tuning);
    let swappiness_changed = tuning::update_swappiness(ctx, request.swappiness).await?;
    tuning::disable_transparent_huge_pages(ctx, profile).await?;

    tracker.enter(ProvisionPhase::Staging);
    let staged = staging::stage_companions(ctx).await?;

    tracker.enter(ProvisionPhase::Done);
    tracker.finish();

    let duration_ms = duration_millis(start.elapsed());
    ctx.emit(AppEvent::Provision(ProvisionEvent::Completed {
        profile: profile.name().to_string(),
        duration_ms,
    }));

    Ok(ProvisionReport {
        request,
        platform: profile.name().to_string(),
        artifact_url,
        swappiness_changed,
        staged: staged.iter().map(|p| p.display().to_string()).collect(),
        phases: std::mem::take(&mut tracker.records),
        duration_ms,
    })
}
