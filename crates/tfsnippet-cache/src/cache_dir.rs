use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use once_cell::sync::OnceCell;
use percent_encoding::percent_decode_str;
use tfsnippet_archive::{ArchiveReader, ExtractOptions, Extractor, extract_archive, strip_archive_suffix};
use tfsnippet_fetch::{FetchOptions, Fetcher, HttpClient, ReqwestClient};
use tfsnippet_fs::{
    DOWNLOADING_SUFFIX, EXTRACTING_SUFFIX, IterFiles, StageState, StagedDir, StagedFile, discard_sentinel,
    iter_files, remove_dir_all_if_exists,
};
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::options::CacheOptions;
use crate::progress::{DownloadTracker, StatusLine};

type DynFetcher = Fetcher<Box<dyn HttpClient>>;

/// A named directory under the cache root holding downloaded files and
/// extracted archives.
///
/// Every artifact is staged under a sentinel name and renamed into place
/// once complete, so a path returned by this type always refers to a
/// finished artifact.
pub struct CacheDir {
    name: String,
    cache_root: PathBuf,
    path: PathBuf,
    timeout: Option<Duration>,
    fetcher: OnceCell<DynFetcher>,
    reader: Box<dyn ArchiveReader>,
}

impl CacheDir {
    /// Opens `name` under the process-wide cache root.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::builder(name).build()
    }

    /// Opens `name` under an explicit cache root.
    pub fn with_root(name: impl Into<String>, cache_root: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(name).cache_root(cache_root).build()
    }

    pub fn builder(name: impl Into<String>) -> CacheDirBuilder {
        CacheDirBuilder {
            name: name.into(),
            config: CacheConfig::default(),
            client: None,
            reader: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Downloads `url` into this directory unless it is already there.
    ///
    /// The file lands at `filename` (or the last segment of the URL) relative
    /// to [`CacheDir::path`]. An existing file is returned without touching
    /// the network.
    pub fn download(&self, url: &str, options: &CacheOptions) -> Result<PathBuf> {
        let filename = match options.filename.as_deref() {
            Some(filename) => checked_relative(filename)?,
            None => filename_from_url(url)?,
        };
        let target = self.path.join(&filename);

        if reuse(&target, DOWNLOADING_SUFFIX)? {
            debug!(url, path = %target.display(), "download cache hit");
            return Ok(target);
        }

        let mut staged = StagedFile::create(&target, DOWNLOADING_SUFFIX)?;
        let tracker = options
            .show_progress
            .then(|| DownloadTracker::new(&options.progress_sink, "Downloading"));
        let fetch_options = match &tracker {
            Some(tracker) => FetchOptions::default().on_progress(tracker.callback()),
            None => FetchOptions::default(),
        };

        let bytes = match self.fetcher()?.fetch_to(url, &mut staged, &fetch_options) {
            Ok(bytes) => bytes,
            Err(e) => {
                if let Some(tracker) = tracker {
                    tracker.abandon();
                }
                return Err(e.into());
            }
        };

        let path = staged.commit()?;
        info!(url, path = %path.display(), bytes, "downloaded");
        Ok(path)
    }

    /// Extracts `archive` into this directory unless it is already there.
    ///
    /// The tree lands at `extract_dir` (or the archive name without its
    /// format suffix) relative to [`CacheDir::path`].
    pub fn extract_file(&self, archive: impl AsRef<Path>, options: &CacheOptions) -> Result<PathBuf> {
        let archive = archive.as_ref();
        let extract_dir = match options.extract_dir.as_deref() {
            Some(dir) => checked_relative(dir)?,
            None => default_extract_dir(archive)?,
        };
        self.extract_to(archive, &extract_dir, options)
    }

    /// Downloads `url`, then extracts it.
    ///
    /// Without an explicit `extract_dir` the tree goes next to the
    /// downloaded file, named after it without the format suffix. The
    /// downloaded archive stays in the cache.
    pub fn download_and_extract(&self, url: &str, options: &CacheOptions) -> Result<PathBuf> {
        let archive = self.download(url, options)?;
        let extract_dir = match options.extract_dir.as_deref() {
            Some(dir) => checked_relative(dir)?,
            None => {
                let relative = archive.strip_prefix(&self.path).unwrap_or(archive.as_path());
                let stem = default_extract_dir(relative)?;
                let derived = match relative.parent() {
                    Some(parent) => parent.join(stem),
                    None => stem,
                };
                if derived == relative {
                    return Err(Error::InvalidTarget {
                        path: derived,
                        reason: "same as the downloaded file; set `extract_dir`",
                    });
                }
                derived
            }
        };
        self.extract_to(&archive, &extract_dir, options)
    }

    /// Deletes this directory and everything in it.
    pub fn purge_all(&self) -> Result<()> {
        if remove_dir_all_if_exists(&self.path)? {
            info!(path = %self.path.display(), "cache directory purged");
        }
        Ok(())
    }

    /// Files under this directory, relative to [`CacheDir::path`].
    pub fn iter_files(&self) -> IterFiles {
        iter_files(&self.path)
    }

    fn extract_to(&self, archive: &Path, extract_dir: &Path, options: &CacheOptions) -> Result<PathBuf> {
        let target = self.path.join(extract_dir);
        // Only a directory counts as a finished extraction.
        if target.exists() && !target.is_dir() {
            return Err(Error::InvalidTarget {
                path: extract_dir.to_path_buf(),
                reason: "occupied by a file",
            });
        }
        if reuse(&target, EXTRACTING_SUFFIX)? {
            debug!(archive = %archive.display(), path = %target.display(), "extract cache hit");
            return Ok(target);
        }

        // Declared before the staged dir so cleanup precedes the "error" mark.
        let status = options
            .show_progress
            .then(|| StatusLine::start(&options.progress_sink, "Extracting", archive));

        let staged = StagedDir::create(&target, EXTRACTING_SUFFIX)?;
        let report = extract_archive(
            self.reader.as_ref(),
            archive,
            staged.path(),
            &ExtractOptions::default(),
        )
        .map_err(|source| Error::Extraction {
            archive: archive.to_path_buf(),
            source,
        })?;
        let path = staged.commit()?;

        if let Some(status) = status {
            status.done();
        }
        info!(
            archive = %archive.display(),
            path = %path.display(),
            entries = report.entry_count,
            "extracted"
        );
        Ok(path)
    }

    fn fetcher(&self) -> Result<&DynFetcher> {
        self.fetcher.get_or_try_init(|| {
            let client = match self.timeout {
                Some(timeout) => ReqwestClient::with_timeout(timeout),
                None => ReqwestClient::new(),
            }
            .map_err(Error::Client)?;
            Ok(Fetcher::new(Box::new(client) as Box<dyn HttpClient>))
        })
    }
}

impl fmt::Debug for CacheDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheDir")
            .field("name", &self.name)
            .field("cache_root", &self.cache_root)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

pub struct CacheDirBuilder {
    name: String,
    config: CacheConfig,
    client: Option<Box<dyn HttpClient>>,
    reader: Option<Box<dyn ArchiveReader>>,
}

impl CacheDirBuilder {
    #[must_use]
    pub fn cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config = self.config.cache_root(root);
        self
    }

    /// Replaces the whole configuration, including any root set before.
    #[must_use]
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Transport used for downloads. Defaults to a [`ReqwestClient`].
    #[must_use]
    pub fn http_client(mut self, client: impl HttpClient + 'static) -> Self {
        self.client = Some(Box::new(client));
        self
    }

    /// Reader used for extraction. Defaults to [`Extractor`].
    #[must_use]
    pub fn archive_reader(mut self, reader: impl ArchiveReader + 'static) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    pub fn build(self) -> Result<CacheDir> {
        validate_name(&self.name)?;
        let cache_root = self.config.resolve_root();
        let path = cache_root.join(&self.name);

        let fetcher = OnceCell::new();
        if let Some(client) = self.client {
            // A fresh cell is always empty.
            let _ = fetcher.set(Fetcher::new(client));
        }

        Ok(CacheDir {
            name: self.name,
            cache_root,
            path,
            timeout: self.config.http_timeout(),
            fetcher,
            reader: self.reader.unwrap_or_else(|| Box::new(Extractor::new())),
        })
    }
}

/// Checks the stage of `target`. Returns `true` when it is complete;
/// otherwise clears any interrupted attempt so staging can start fresh.
fn reuse(target: &Path, suffix: &str) -> Result<bool> {
    match StageState::probe(target, suffix) {
        StageState::Complete => {
            if let Err(e) = discard_sentinel(target, suffix) {
                debug!(path = %target.display(), error = %e, "stale sentinel left in place");
            }
            Ok(true)
        }
        StageState::Staging => {
            warn!(path = %target.display(), "discarding interrupted attempt");
            discard_sentinel(target, suffix)?;
            Ok(false)
        }
        StageState::Absent => Ok(false),
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::EmptyName);
    }
    if !is_plain_relative(Path::new(name)) {
        return Err(Error::InvalidName { name: name.to_string() });
    }
    Ok(())
}

fn checked_relative(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() || !is_plain_relative(path) {
        return Err(Error::InvalidTarget {
            path: path.to_path_buf(),
            reason: "expected a relative path without '..'",
        });
    }
    Ok(path.to_path_buf())
}

fn is_plain_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Last non-empty path segment of `url`, percent-decoded, ignoring query
/// and fragment.
fn filename_from_url(url: &str) -> Result<PathBuf> {
    let no_filename = || Error::NoFilename { url: url.to_string() };
    let parsed = url::Url::parse(url).map_err(|_| tfsnippet_fetch::FetchError::InvalidUrl(url.to_string()))?;
    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .ok_or_else(no_filename)?;
    let decoded = percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| no_filename())?;
    // A decoded `%2F` must not introduce a subdirectory.
    if decoded.contains(['/', '\\']) {
        return Err(no_filename());
    }
    checked_relative(Path::new(decoded.as_ref())).map_err(|_| no_filename())
}

fn default_extract_dir(archive: &Path) -> Result<PathBuf> {
    let invalid = || Error::InvalidTarget {
        path: archive.to_path_buf(),
        reason: "no usable file name to extract under",
    };
    let file_name = archive.file_name().ok_or_else(invalid)?.to_string_lossy();
    checked_relative(Path::new(strip_archive_suffix(&file_name))).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected() {
        let err = CacheDir::with_root("", "/tmp").unwrap_err();
        assert!(matches!(err, Error::EmptyName));
        assert_eq!(err.to_string(), "`name` is required");
    }

    #[test]
    fn escaping_names_are_rejected() {
        for name in ["../outside", "/absolute", "a/../../b"] {
            let err = CacheDir::with_root(name, "/tmp").unwrap_err();
            assert!(matches!(err, Error::InvalidName { .. }), "{name}");
        }
    }

    #[test]
    fn path_joins_root_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = CacheDir::with_root("sub-dir/sub-sub-dir", dir.path()).unwrap();
        assert_eq!(cache_dir.name(), "sub-dir/sub-sub-dir");
        assert_eq!(cache_dir.cache_root(), dir.path());
        assert_eq!(cache_dir.path(), dir.path().join("sub-dir/sub-sub-dir"));
    }

    #[test]
    fn filename_from_url_ignores_query() {
        assert_eq!(
            filename_from_url("http://example.com/files/payload.zip?token=1#x").unwrap(),
            Path::new("payload.zip")
        );
        assert_eq!(
            filename_from_url("http://example.com/files/payload.tar.gz/").unwrap(),
            Path::new("payload.tar.gz")
        );
        assert!(matches!(
            filename_from_url("http://example.com/"),
            Err(Error::NoFilename { .. })
        ));
        assert!(matches!(filename_from_url("not a url"), Err(Error::Transport(_))));
    }

    #[test]
    fn filename_from_url_decodes_segment() {
        assert_eq!(
            filename_from_url("http://example.com/files/my%20file.zip").unwrap(),
            Path::new("my file.zip")
        );
        assert_eq!(
            filename_from_url("http://example.com/caf%C3%A9.tar.gz").unwrap(),
            Path::new("café.tar.gz")
        );
        for url in [
            "http://example.com/files/..%2Fescape.zip",
            "http://example.com/files/%2E%2E",
            "http://example.com/files/%FF.zip",
        ] {
            assert!(matches!(filename_from_url(url), Err(Error::NoFilename { .. })), "{url}");
        }
    }

    #[test]
    fn extract_dir_strips_format_suffix() {
        assert_eq!(default_extract_dir(Path::new("/x/payload.tar.gz")).unwrap(), Path::new("payload"));
        assert_eq!(default_extract_dir(Path::new("payload.tgz")).unwrap(), Path::new("payload"));
        assert_eq!(default_extract_dir(Path::new("payload.zip")).unwrap(), Path::new("payload"));
        assert_eq!(default_extract_dir(Path::new("invalid.txt")).unwrap(), Path::new("invalid"));
    }

    #[test]
    fn targets_must_stay_inside() {
        assert!(checked_relative(Path::new("sub-dir/payload2.zip")).is_ok());
        assert!(checked_relative(Path::new("../payload.zip")).is_err());
        assert!(checked_relative(Path::new("/payload.zip")).is_err());
        assert!(checked_relative(Path::new("")).is_err());
    }

    #[test]
    fn cache_dir_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CacheDir>();
    }
}
