use std::path::PathBuf;
use thiserror::Error;

/// Failure kinds for tarball retrieval. Each stage of the pipeline maps to
/// its own variant so callers can tell a local filesystem problem from a
/// network one without string matching.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to extract tarball: {0}")]
    Extract(String),
}

impl FetchError {
    #[must_use]
    pub fn extract(msg: impl Into<String>) -> Self {
        Self::Extract(msg.into())
    }
}
