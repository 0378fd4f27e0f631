use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::primitives::promote;
use crate::sentinel::sentinel_path;

/// A file being written under its sentinel name.
///
/// Bytes go to `<destination><suffix>`. [`StagedFile::commit`] renames the
/// sentinel onto the destination; dropping the guard without committing
/// removes the sentinel.
pub struct StagedFile {
    file: Option<File>,
    sentinel: PathBuf,
    destination: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Creates (or truncates) the sentinel file, creating parent directories.
    pub fn create(destination: impl AsRef<Path>, suffix: &str) -> Result<Self> {
        let destination = destination.as_ref().to_path_buf();
        let sentinel = sentinel_path(&destination, suffix);

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Create {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file = File::create(&sentinel).map_err(|e| Error::Create {
            path: sentinel.clone(),
            source: e,
        })?;

        Ok(Self {
            file: Some(file),
            sentinel,
            destination,
            committed: false,
        })
    }

    pub fn sentinel(&self) -> &Path {
        &self.sentinel
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Flushes the sentinel to disk and promotes it to the destination.
    pub fn commit(mut self) -> Result<PathBuf> {
        if let Some(file) = self.file.take() {
            file.sync_all().map_err(|e| Error::Write {
                path: self.sentinel.clone(),
                source: e,
            })?;
        }
        promote(&self.sentinel, &self.destination)?;
        self.committed = true;
        Ok(self.destination.clone())
    }

    fn file_mut(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("staged file already closed"))
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file_mut()?.flush()
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        // Close the handle first; Windows refuses to delete open files.
        self.file.take();
        if !self.committed {
            let _ = std::fs::remove_file(&self.sentinel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentinel::DOWNLOADING_SUFFIX;
    use tempfile::tempdir;

    #[test]
    fn test_commit_promotes_sentinel() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("nested/payload.zip");

        let mut staged = StagedFile::create(&dest, DOWNLOADING_SUFFIX).unwrap();
        let sentinel = staged.sentinel().to_path_buf();
        staged.write_all(b"payload").unwrap();
        assert!(sentinel.exists());
        assert!(!dest.exists());

        let path = staged.commit().unwrap();
        assert_eq!(path, dest);
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
        assert!(!sentinel.exists());
    }

    #[test]
    fn test_drop_removes_sentinel() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("payload.zip");
        let sentinel = sentinel_path(&dest, DOWNLOADING_SUFFIX);
        {
            let mut staged = StagedFile::create(&dest, DOWNLOADING_SUFFIX).unwrap();
            staged.write_all(b"partial").unwrap();
            assert!(sentinel.exists());
        }
        assert!(!sentinel.exists());
        assert!(!dest.exists());
    }

    #[test]
    fn test_create_truncates_stale_sentinel() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("payload.zip");
        std::fs::write(sentinel_path(&dest, DOWNLOADING_SUFFIX), b"stale bytes").unwrap();

        let mut staged = StagedFile::create(&dest, DOWNLOADING_SUFFIX).unwrap();
        staged.write_all(b"new").unwrap();
        staged.commit().unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }
}
