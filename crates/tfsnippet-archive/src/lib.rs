//! Archive reading and extraction with path sanitization.
//!
//! # Architecture
//!
//! - `format.rs` - Format detection by suffix or magic bytes, suffix stripping
//! - `reader.rs` - The [`ArchiveReader`] strategy and the default [`Extractor`]
//! - `extract/` - Per-format entry sources and the write pipeline
//! - `sanitize.rs` - Path sanitization (zip-slip prevention)
//! - `entry.rs` - Pending and extracted entry types

pub use entry::{ArchiveReport, Entry, EntryKind, PendingEntry};
pub use error::{Error, Result};
pub use extract::{EntrySource, TarSource, ZipSource, extract};
pub use format::{ArchiveFormat, TarCompress, detect_format, strip_archive_suffix};
pub use options::{ExtractOptions, Progress};
pub use reader::{ArchiveReader, Extractor, extract_archive};
pub use sanitize::{SanitizedPath, sanitize_path};

mod entry;
mod error;
mod extract;
mod format;
mod options;
mod reader;
mod sanitize;
