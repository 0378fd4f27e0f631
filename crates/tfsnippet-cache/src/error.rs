use std::path::PathBuf;

use tfsnippet_fetch::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("`name` is required")]
    EmptyName,

    #[error("invalid cache name '{name}': expected a relative path without '..'")]
    InvalidName { name: String },

    #[error("invalid target '{path}': {reason}")]
    InvalidTarget { path: PathBuf, reason: &'static str },

    #[error("cannot derive a file name from '{url}'")]
    NoFilename { url: String },

    #[error(transparent)]
    Transport(#[from] FetchError),

    #[error("failed to extract '{archive}': {source}")]
    Extraction {
        archive: PathBuf,
        #[source]
        source: tfsnippet_archive::Error,
    },

    #[error(transparent)]
    Filesystem(#[from] tfsnippet_fs::Error),

    #[error("failed to set up HTTP client: {0}")]
    Client(#[source] FetchError),
}

pub type Result<T> = std::result::Result<T, Error>;
