use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("unsupported architecture: {0}")]
    UnsupportedArch(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("problem with request to {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("smoketest failed: {0}")]
    Verification(String),

    #[error("no jre found in {0}")]
    NotInstalled(PathBuf),

    #[error("more than one jre found in {dir}: {}", .candidates.join(", "))]
    AmbiguousRuntime { dir: PathBuf, candidates: Vec<String> },

    #[error("failed to launch {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("install timed out after {0:?}")]
    TimedOut(Duration),

    #[error("install cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProvisionError {
    /// Unknown host OS or CPU. No install target can be computed, so the
    /// embedding application is expected to exit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsupportedPlatform(_) | Self::UnsupportedArch(_))
    }
}

impl From<zip::result::ZipError> for ProvisionError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Extraction(format!("zip: {err}"))
    }
}
