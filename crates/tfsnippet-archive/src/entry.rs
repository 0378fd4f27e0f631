use std::io::Read;
use std::path::PathBuf;

use crate::format::ArchiveFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// An entry read from an archive but not yet written to disk.
///
/// `reader` yields the entry content for files and is `None` for
/// directories.
pub struct PendingEntry {
    pub original_path: PathBuf,
    pub size: u64,
    pub mode: Option<u32>,
    pub kind: EntryKind,
    pub reader: Option<Box<dyn Read>>,
}

impl PendingEntry {
    pub fn file(original_path: impl Into<PathBuf>, content: Vec<u8>) -> Self {
        Self {
            original_path: original_path.into(),
            size: content.len() as u64,
            mode: None,
            kind: EntryKind::File,
            reader: Some(Box::new(std::io::Cursor::new(content))),
        }
    }

    pub fn directory(original_path: impl Into<PathBuf>) -> Self {
        Self {
            original_path: original_path.into(),
            size: 0,
            mode: None,
            kind: EntryKind::Directory,
            reader: None,
        }
    }

    pub fn with_mode(mut self, mode: Option<u32>) -> Self {
        self.mode = mode;
        self
    }
}

/// An entry that was materialized on disk.
#[derive(Clone, Debug)]
pub struct Entry {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub size: u64,
    pub kind: EntryKind,
}

#[derive(Clone, Debug)]
pub struct ArchiveReport {
    pub format: ArchiveFormat,
    pub entry_count: usize,
    pub total_bytes: u64,
    pub entries: Vec<Entry>,
}

impl ArchiveReport {
    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::File)
    }
}
