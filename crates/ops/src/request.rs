//! Install request resolution

use cbnode_config::{DefaultsConfig, ReleaseDefaults};
use cbnode_errors::{ConfigError, Error, UsageError};
use cbnode_events::EventEmitter;
use cbnode_types::{ChecksumType, Edition, HostClass, InstallRequest};

/// Parameters as supplied on the command line, before defaults are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestArgs {
    pub edition: Edition,
    pub version: Option<String>,
    pub checksum: Option<String>,
    pub checksum_type: Option<ChecksumType>,
    pub swappiness: u8,
}

impl RequestArgs {
    /// Reject an explicit version that cannot be verified
    ///
    /// # Errors
    ///
    /// Returns `UsageError::UnverifiedVersion` when `version` is set without
    /// both `checksum` and `checksum_type`, and `UsageError::InvalidValue`
    /// when the checksum is not a hex digest of the chosen type.
    pub fn validate(&self) -> Result<(), Error> {
        let Some(version) = &self.version else {
            return Ok(());
        };

        let missing = match (&self.checksum, self.checksum_type) {
            (Some(checksum), Some(checksum_type)) => {
                let digest = checksum.trim();
                if checksum_type.is_digest(digest) {
                    return Ok(());
                }
                return Err(UsageError::InvalidValue {
                    flag: "--checksum".to_string(),
                    value: checksum.clone(),
                    message: format!(
                        "expected {} hex characters for {checksum_type}",
                        checksum_type.hex_len()
                    ),
                }
                .into());
            }
            (None, None) => "--checksum and --checksum-type",
            (None, Some(_)) => "--checksum",
            (Some(_), None) => "--checksum-type",
        };

        Err(UsageError::UnverifiedVersion {
            version: version.clone(),
            missing: missing.to_string(),
        }
        .into())
    }
}

/// Resolve the final request for `host`
///
/// Without an explicit version the edition's defaults row supplies version,
/// checksum and checksum type together. A checksum given without a version
/// is dropped with a warning so the triple stays consistent.
///
/// # Errors
///
/// Returns the error from [`RequestArgs::validate`], or
/// `ConfigError::DefaultDigestUnset` when the defaults row has no digest
/// for `host`.
pub fn resolve_request(
    args: &RequestArgs,
    defaults: &DefaultsConfig,
    host: HostClass,
    events: &impl EventEmitter,
) -> Result<InstallRequest, Error> {
    args.validate()?;

    if let (Some(version), Some(checksum), Some(checksum_type)) =
        (&args.version, &args.checksum, args.checksum_type)
    {
        return Ok(InstallRequest {
            edition: args.edition,
            version: version.clone(),
            checksum: checksum.trim().to_string(),
            checksum_type,
            swappiness: args.swappiness,
            defaulted: false,
        });
    }

    if args.checksum.is_some() || args.checksum_type.is_some() {
        events.emit_warning_with_context(
            "ignoring --checksum/--checksum-type given without --version",
            format!("using the {} defaults for {host}", args.edition),
        );
    }

    let row = defaults.for_edition(args.edition);
    let checksum = row
        .checksum_for(host)
        .ok_or_else(|| ConfigError::DefaultDigestUnset {
            field: format!(
                "defaults.{}.{}",
                args.edition,
                ReleaseDefaults::checksum_key(host)
            ),
        })?;
    Ok(InstallRequest {
        edition: args.edition,
        version: row.version.clone(),
        checksum: checksum.to_string(),
        checksum_type: row.checksum_type,
        swappiness: args.swappiness,
        defaulted: true,
    })
}
