//! Error types for tfsnippet-fetch.

use std::io;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] BoxError),

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("failed to fetch {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("incomplete body from {url}: expected {expected} bytes, got {actual}")]
    Incomplete { url: String, expected: u64, actual: u64 },

    #[error("failed to write downloaded data: {0}")]
    Write(#[source] io::Error),
}

impl FetchError {
    /// HTTP status carried by the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
