//! Named cache directories for downloaded files and extracted archives.
//!
//! A [`CacheDir`] maps a resource (a URL or an archive file) to a
//! deterministic path under the cache root and creates it at most once.
//! Artifacts are staged under a sentinel name and renamed into place, so a
//! crash never leaves a half-written file that looks complete.
//!
//! ```no_run
//! use tfsnippet_cache::{CacheDir, CacheOptions};
//!
//! let cache_dir = CacheDir::new("datasets/mnist")?;
//! let path = cache_dir.download_and_extract(
//!     "https://example.com/mnist.tar.gz",
//!     &CacheOptions::default(),
//! )?;
//! # Ok::<(), tfsnippet_cache::Error>(())
//! ```
//!
//! The cache root is, in order of precedence: the root passed to
//! [`CacheDir::with_root`] or [`CacheConfig`], the process-wide override set
//! with [`set_cache_root`], the `TFSNIPPET_CACHE_ROOT` environment variable,
//! and finally `~/.tfsnippet/cache`.

mod cache_dir;
mod config;
mod error;
mod options;
mod progress;
mod root;

pub use cache_dir::{CacheDir, CacheDirBuilder};
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use options::CacheOptions;
pub use progress::ProgressSink;
pub use root::{
    CACHE_ROOT_ENV, default_cache_root, expand_path, get_cache_root, reset_cache_root, resolve_cache_root,
    set_cache_root,
};

pub use tfsnippet_archive::{ArchiveReader, EntrySource, Extractor};
pub use tfsnippet_fetch::{HttpClient, HttpResponse, ReqwestClient};
pub use tfsnippet_fs::{IterFiles, iter_files};
