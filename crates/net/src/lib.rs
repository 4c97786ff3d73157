#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for the provisioner
//!
//! This crate fetches the server package over HTTP(S). It streams the body to
//! disk and reports progress through events; integrity checks live in
//! `cbnode-hash`.

mod client;
mod download;

pub use client::{NetClient, NetConfig};
pub use download::{Download, DownloadResult};

use cbnode_errors::{Error, NetworkError};
use cbnode_events::EventSender;
use std::path::Path;
use url::Url;

/// Download a file, replacing `dest`
///
/// # Errors
///
/// Returns an error if the URL is invalid, the download fails, or there are
/// I/O errors while writing the file.
pub async fn download_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    tx: &EventSender,
) -> Result<DownloadResult, Error> {
    let download = Download::new(url)?;
    download.execute(client, dest, tx).await
}

/// Append path segments to a base URL
///
/// Segments are percent-encoded; a trailing slash on `base` is optional.
///
/// # Errors
///
/// Returns `NetworkError::InvalidUrl` if `base` does not parse or cannot
/// carry a path.
pub fn join_url(base: &str, segments: &[&str]) -> Result<String, Error> {
    let mut url = Url::parse(base).map_err(|e| NetworkError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| NetworkError::InvalidUrl(format!("{base}: cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}
