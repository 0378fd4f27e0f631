//! Sentinel-based staging for cache artifacts.
//!
//! An artifact at path `P` is written under `P` plus a sentinel suffix and
//! renamed onto `P` only once it is complete. Presence of `P` is therefore
//! the completion marker; a sentinel without `P` is an interrupted attempt.
//!
//! - `sentinel.rs` - Sentinel names and [`StageState`] probing
//! - `staged_file.rs` - Download-style staging of a single file
//! - `staged_dir.rs` - Extraction-style staging of a directory tree
//! - `walk.rs` - Lazy relative file listing
//! - `primitives/` - Promotion and removal

mod error;
mod primitives;
mod sentinel;
mod staged_dir;
mod staged_file;
mod walk;

pub use error::{Error, Result};
pub use primitives::{promote, remove_dir_all_if_exists};
pub use sentinel::{
    DOWNLOADING_SUFFIX, EXTRACTING_SUFFIX, StageState, discard_sentinel, sentinel_path,
};
pub use staged_dir::StagedDir;
pub use staged_file::StagedFile;
pub use walk::{IterFiles, iter_files};
