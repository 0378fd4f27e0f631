//! Entry sources for ZIP and TAR formats, and the pipeline that writes their
//! entries to disk.
//!
//! # Platform Behavior
//!
//! **Unix**: file mode bits from the archive are applied when
//! `preserve_permissions` is set, always keeping the owner read/write bits so
//! the extracted tree can be purged later.
//!
//! **Windows**: permission handling is a no-op.

use std::io::Read;
use std::path::Path;

use crate::entry::{ArchiveReport, Entry, EntryKind, PendingEntry};
use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::options::{ExtractOptions, Progress};
use crate::sanitize::sanitize_path;

mod tar;
mod zip;

pub use tar::TarSource;
pub use zip::ZipSource;

/// Archive-specific entry source.
///
/// Entries are yielded in archive order. Implementations decide which entry
/// types they surface; links and special files may be skipped.
pub trait EntrySource {
    fn entries(&mut self) -> Result<Box<dyn Iterator<Item = Result<PendingEntry>> + '_>>;
    fn format(&self) -> ArchiveFormat;
}

/// Main extraction pipeline.
///
/// Sanitizes every entry path against `destination`, writes files and
/// directories, applies permissions and reports progress.
pub fn extract<S: EntrySource + ?Sized>(
    source: &mut S,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let format = source.format();
    let mut entries = Vec::new();
    let mut total_bytes = 0u64;

    for pending in source.entries()? {
        let mut pending = pending?;
        let sanitized = sanitize_path(&pending.original_path, destination)?;
        if sanitized.relative.as_os_str().is_empty() {
            continue;
        }

        write_entry(&mut pending, &sanitized.resolved)?;
        if options.preserve_permissions && pending.kind == EntryKind::File {
            apply_mode(&sanitized.resolved, pending.mode)?;
        }
        total_bytes += pending.size;

        if let Some(ref callback) = options.on_progress {
            callback(Progress {
                entries_processed: entries.len() + 1,
                bytes_processed: total_bytes,
                current_file: sanitized.relative.clone(),
            });
        }

        entries.push(Entry {
            original_path: sanitized.original,
            target_path: sanitized.resolved,
            size: pending.size,
            kind: pending.kind,
        });
    }

    Ok(ArchiveReport {
        format,
        entry_count: entries.len(),
        total_bytes,
        entries,
    })
}

/// Fails when an entry yielded fewer bytes than its header declared.
pub(crate) fn check_length(path: &Path, expected: u64, actual: usize) -> Result<()> {
    if actual as u64 != expected {
        return Err(Error::corrupted(format!(
            "entry '{}' declares {expected} bytes but holds {actual}",
            path.display()
        )));
    }
    Ok(())
}

fn write_entry(pending: &mut PendingEntry, target_path: &Path) -> Result<()> {
    match pending.kind {
        EntryKind::File => write_file(pending.reader.as_mut(), target_path),
        EntryKind::Directory => ensure_directory(target_path),
    }
}

fn write_file(reader: Option<&mut Box<dyn Read>>, target_path: &Path) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        ensure_directory(parent)?;
    }

    let mut file = std::fs::File::create(target_path).map_err(|e| Error::ExtractionFailed {
        path: target_path.to_path_buf(),
        source: e,
    })?;
    if let Some(reader) = reader {
        std::io::copy(reader, &mut file).map_err(|e| Error::ExtractionFailed {
            path: target_path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

fn ensure_directory(path: &Path) -> Result<()> {
    if !path.is_dir() {
        std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode {
        let perms = std::fs::Permissions::from_mode((mode & 0o777) | 0o600);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}
