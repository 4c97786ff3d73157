//! Command line interface definition

use cbnode_ops::RequestArgs;
use cbnode_types::{ChecksumType, Edition};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use std::path::PathBuf;

/// Install Couchbase Server on this host without starting it, tune the
/// kernel for it and stage the companion scripts
#[derive(Parser, Debug)]
#[command(name = "install-couchbase-server")]
#[command(disable_version_flag = true)]
#[command(long_about = None)]
pub struct Cli {
    /// Server edition
    #[arg(long, value_enum, default_value_t = Edition::Enterprise)]
    pub edition: Edition,

    /// Server version; requires --checksum and --checksum-type
    #[arg(long, value_name = "VERSION", value_parser = NonEmptyStringValueParser::new())]
    pub version: Option<String>,

    /// Expected digest of the package (hex, any case)
    #[arg(long, value_name = "HEX", value_parser = NonEmptyStringValueParser::new())]
    pub checksum: Option<String>,

    /// Digest algorithm of --checksum
    #[arg(long, value_enum)]
    pub checksum_type: Option<ChecksumType>,

    /// Value written to vm.swappiness
    #[arg(
        long,
        alias = "swapiness",
        value_name = "N",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=200)
    )]
    pub swappiness: u8,

    /// Use alternate config file
    #[arg(long, value_name = "PATH", env = "CBNODE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write debug logs as JSON to the log directory
    #[arg(long)]
    pub debug: bool,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    #[must_use]
    pub fn request_args(&self) -> RequestArgs {
        RequestArgs {
            edition: self.edition,
            version: self.version.clone(),
            checksum: self.checksum.clone(),
            checksum_type: self.checksum_type,
            swappiness: self.swappiness,
        }
    }
}

/// Whether `--help` appears anywhere, so it wins over every other check
pub fn wants_help<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    args.into_iter()
        .skip(1)
        .any(|a| a.as_ref() == "--help" || a.as_ref() == "-h")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("install-couchbase-server").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.edition, Edition::Enterprise);
        assert_eq!(cli.swappiness, 0);
        assert!(cli.version.is_none());
    }

    #[test]
    fn swapiness_alias() {
        let cli = parse(&["--edition", "community", "--swapiness", "1"]).unwrap();
        assert_eq!(cli.edition, Edition::Community);
        assert_eq!(cli.swappiness, 1);
    }

    #[test]
    fn explicit_version_triple() {
        let cli = parse(&[
            "--version",
            "6.0.1",
            "--checksum",
            "ABC",
            "--checksum-type",
            "sha256",
        ])
        .unwrap();
        let args = cli.request_args();
        assert_eq!(args.version.as_deref(), Some("6.0.1"));
        assert_eq!(args.checksum_type, Some(ChecksumType::Sha256));
    }

    #[test]
    fn rejects_bad_values() {
        let err = parse(&["--edition", "developer"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);

        let err = parse(&["--checksum-type", "sha1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);

        let err = parse(&["--version", ""]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);

        assert!(parse(&["--swappiness", "201"]).is_err());
        assert!(parse(&["--swappiness", "-1"]).is_err());
        assert!(parse(&["--version"]).is_err());
    }

    #[test]
    fn rejects_unknown_flags() {
        let err = parse(&["--editon", "community"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn help_is_found_anywhere() {
        assert!(wants_help(["bin", "--edition", "bogus", "--help"]));
        assert!(wants_help(["bin", "-h"]));
        assert!(!wants_help(["bin", "--edition", "community"]));
    }
}
