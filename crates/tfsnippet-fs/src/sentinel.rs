use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Suffix appended to a file path while its content is being downloaded.
pub const DOWNLOADING_SUFFIX: &str = "._downloading_";

/// Suffix appended to a directory path while an archive is extracted into it.
pub const EXTRACTING_SUFFIX: &str = "._extracting_";

/// Returns `path` with `suffix` appended to its final component.
///
/// `sentinel_path("cache/payload.zip", DOWNLOADING_SUFFIX)` yields
/// `cache/payload.zip._downloading_`.
pub fn sentinel_path(path: impl AsRef<Path>, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_ref().as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Lifecycle of a staged artifact, derived purely from what is on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageState {
    /// Neither the artifact nor its sentinel exists.
    Absent,
    /// Only the sentinel exists: a previous attempt was interrupted.
    Staging,
    /// The artifact exists and is considered complete.
    Complete,
}

impl StageState {
    pub fn probe(path: impl AsRef<Path>, suffix: &str) -> Self {
        let path = path.as_ref();
        if path.exists() {
            Self::Complete
        } else if sentinel_path(path, suffix).exists() {
            Self::Staging
        } else {
            Self::Absent
        }
    }

    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Removes a leftover sentinel (file or directory) for `path`.
///
/// Returns `true` when something was removed.
pub fn discard_sentinel(path: impl AsRef<Path>, suffix: &str) -> Result<bool> {
    let sentinel = sentinel_path(path, suffix);
    let metadata = match std::fs::symlink_metadata(&sentinel) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(Error::Remove {
                path: sentinel,
                source: e,
            });
        }
    };

    let removed = if metadata.is_dir() {
        std::fs::remove_dir_all(&sentinel)
    } else {
        std::fs::remove_file(&sentinel)
    };
    removed.map_err(|e| Error::Remove {
        path: sentinel,
        source: e,
    })?;
    Ok(true)
}
