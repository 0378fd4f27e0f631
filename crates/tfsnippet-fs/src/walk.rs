use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Lazily walks `root`, yielding the paths of regular files relative to it.
///
/// Directories are read one at a time as the iterator advances. Entries of a
/// directory are visited in sorted order, so a static tree always produces
/// the same sequence. Symlinks to directories are not followed.
pub fn iter_files(root: impl AsRef<Path>) -> IterFiles {
    IterFiles {
        root: root.as_ref().to_path_buf(),
        pending: vec![PathBuf::new()],
        ready: VecDeque::new(),
    }
}

/// Iterator returned by [`iter_files`]. Cloning it before use gives an
/// independent walk over the same tree.
#[derive(Clone, Debug)]
pub struct IterFiles {
    root: PathBuf,
    pending: Vec<PathBuf>,
    ready: VecDeque<PathBuf>,
}

impl IterFiles {
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_dir(&mut self, relative: &Path) -> Result<()> {
        let dir = self.root.join(relative);
        let read_err = |source| Error::ReadDir {
            path: dir.clone(),
            source,
        };

        let mut entries = std::fs::read_dir(&dir)
            .map_err(read_err)?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(read_err)?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut subdirs = Vec::new();
        for entry in entries {
            let file_type = entry.file_type().map_err(read_err)?;
            let path = relative.join(entry.file_name());
            if file_type.is_dir() {
                subdirs.push(path);
            } else if file_type.is_symlink() && entry.path().is_dir() {
                continue;
            } else {
                self.ready.push_back(path);
            }
        }

        // Reverse so the stack pops subdirectories in sorted order.
        self.pending.extend(subdirs.into_iter().rev());
        Ok(())
    }
}

impl Iterator for IterFiles {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(path) = self.ready.pop_front() {
                return Some(Ok(path));
            }
            let dir = self.pending.pop()?;
            if let Err(e) = self.read_dir(&dir) {
                return Some(Err(e));
            }
        }
    }
}
