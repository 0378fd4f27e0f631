use std::path::PathBuf;

use crate::progress::ProgressSink;

/// Per-call options for [`CacheDir`](crate::CacheDir) operations.
#[derive(Clone, Debug)]
pub struct CacheOptions {
    /// File name, relative to the cache directory, for a download. Defaults
    /// to the last path segment of the URL.
    pub filename: Option<PathBuf>,
    /// Directory, relative to the cache directory, to extract into. Defaults
    /// to the archive name without its format suffix.
    pub extract_dir: Option<PathBuf>,
    pub show_progress: bool,
    pub progress_sink: ProgressSink,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            filename: None,
            extract_dir: None,
            show_progress: true,
            progress_sink: ProgressSink::default(),
        }
    }
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn extract_dir(mut self, extract_dir: impl Into<PathBuf>) -> Self {
        self.extract_dir = Some(extract_dir.into());
        self
    }

    #[must_use]
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    #[must_use]
    pub fn progress_sink(mut self, sink: ProgressSink) -> Self {
        self.progress_sink = sink;
        self
    }
}
