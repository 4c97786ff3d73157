//! Streaming file download

mod validation;

use cbnode_errors::Error;
use cbnode_events::{AppEvent, DownloadEvent, EventEmitter, EventSender, FailureContext};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::client::{map_transport_error, NetClient};

/// Result of a completed download
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub size: u64,
}

/// A single download of a validated URL
#[derive(Debug, Clone)]
pub struct Download {
    url: Url,
}

impl Download {
    /// Prepare a download
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or is not http(s).
    pub fn new(url: &str) -> Result<Self, Error> {
        Ok(Self {
            url: validation::validate_url(url)?,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Stream the body to `dest`, creating or truncating it
    ///
    /// A partially written file is removed before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` for transport failures and non-2xx statuses,
    /// or an I/O error if `dest` cannot be written.
    pub async fn execute(
        &self,
        client: &NetClient,
        dest: &Path,
        tx: &EventSender,
    ) -> Result<DownloadResult, Error> {
        let start = Instant::now();
        let result = self.stream_to_file(client, dest, tx).await;

        match result {
            Ok(size) => {
                tx.emit_download_completed(
                    self.url(),
                    dest.display().to_string(),
                    size,
                    start.elapsed(),
                );
                Ok(DownloadResult {
                    path: dest.to_path_buf(),
                    size,
                })
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(dest).await {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        tracing::debug!(path = %dest.display(), error = %remove_err, "could not remove partial download");
                    }
                }
                tx.emit(AppEvent::Download(DownloadEvent::Failed {
                    url: self.url().to_string(),
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    async fn stream_to_file(
        &self,
        client: &NetClient,
        dest: &Path,
        tx: &EventSender,
    ) -> Result<u64, Error> {
        let response = client.get(self.url()).await?;
        validation::validate_response(&response)?;
        tx.emit_download_started(self.url(), response.content_length());

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| map_transport_error(self.url(), &e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io_with_path(&e, dest))?;
            downloaded += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;
        Ok(downloaded)
    }
}
