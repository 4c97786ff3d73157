use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Package download events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Response headers received, body about to stream
    Started {
        url: String,
        total_bytes: Option<u64>,
    },

    /// Body fully written to disk
    Completed {
        url: String,
        path: String,
        bytes_downloaded: u64,
        duration_ms: u64,
    },

    /// Download failed; any partial file has been removed
    Failed {
        url: String,
        failure: FailureContext,
    },
}
