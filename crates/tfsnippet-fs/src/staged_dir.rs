use crate::primitives::promote;
use crate::sentinel::sentinel_path;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// A directory being populated under its sentinel name.
///
/// Callers write into [`StagedDir::path`]. [`StagedDir::commit`] renames the
/// whole directory onto the destination; dropping the guard without
/// committing removes the staged tree.
pub struct StagedDir {
    staging_path: PathBuf,
    destination_path: PathBuf,
    committed: bool,
}

impl StagedDir {
    /// Creates an empty sentinel directory next to `destination`.
    ///
    /// Anything already at the sentinel path is removed first, so content
    /// from an interrupted run never leaks into the new artifact.
    pub fn create(destination: impl AsRef<Path>, suffix: &str) -> Result<Self> {
        let destination_path = destination.as_ref().to_path_buf();
        let staging_path = sentinel_path(&destination_path, suffix);

        crate::remove_dir_all_if_exists(&staging_path)?;
        std::fs::create_dir_all(&staging_path).map_err(|e| Error::Create {
            path: staging_path.clone(),
            source: e,
        })?;

        Ok(Self {
            staging_path,
            destination_path,
            committed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.staging_path
    }

    pub fn destination(&self) -> &Path {
        &self.destination_path
    }

    pub fn commit(mut self) -> Result<PathBuf> {
        promote(&self.staging_path, &self.destination_path)?;
        self.committed = true;
        Ok(self.destination_path.clone())
    }
}

impl Drop for StagedDir {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_dir_all(&self.staging_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentinel::EXTRACTING_SUFFIX;
    use tempfile::tempdir;

    #[test]
    fn test_staged_dir_commit() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("payload");
        let staged = StagedDir::create(&dest, EXTRACTING_SUFFIX).unwrap();
        assert_eq!(staged.path(), dir.path().join("payload._extracting_"));

        std::fs::create_dir_all(staged.path().join("a")).unwrap();
        std::fs::write(staged.path().join("a/1.txt"), "a/1.txt").unwrap();
        staged.commit().unwrap();

        assert!(dest.join("a/1.txt").exists());
        assert!(!dir.path().join("payload._extracting_").exists());
    }

    #[test]
    fn test_staged_dir_cleanup_on_drop() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("payload");
        let staging = dir.path().join("payload._extracting_");
        {
            let staged = StagedDir::create(&dest, EXTRACTING_SUFFIX).unwrap();
            std::fs::write(staged.path().join("file.txt"), "data").unwrap();
            assert!(staging.exists());
        }
        assert!(!staging.exists());
        assert!(!dest.exists());
    }

    #[test]
    fn test_staged_dir_discards_previous_content() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("payload");
        let staging = dir.path().join("payload._extracting_");
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::write(staging.join("leftover.txt"), "old").unwrap();

        let staged = StagedDir::create(&dest, EXTRACTING_SUFFIX).unwrap();
        assert!(!staged.path().join("leftover.txt").exists());
    }
}
