use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::root::{expand_path, get_cache_root};

/// Explicit configuration for a [`CacheDir`](crate::CacheDir).
///
/// Unset fields fall back to the process-wide defaults.
#[derive(Clone, Debug, Default)]
pub struct CacheConfig {
    cache_root: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(root.into());
        self
    }

    /// Timeout applied to each HTTP request of the default client.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn explicit_root(&self) -> Option<&Path> {
        self.cache_root.as_deref()
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The explicit root made absolute, or the process-wide root.
    pub fn resolve_root(&self) -> PathBuf {
        match &self.cache_root {
            Some(root) => expand_path(root),
            None => get_cache_root(),
        }
    }
}
