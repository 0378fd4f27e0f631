use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Result of sanitizing an archive entry path.
#[derive(Clone, Debug)]
pub struct SanitizedPath {
    pub original: PathBuf,
    /// Normalized path relative to the extraction base. Empty for entries
    /// that name the base itself, such as `./`.
    pub relative: PathBuf,
    pub resolved: PathBuf,
}

/// Sanitize an entry path against the extraction base directory.
///
/// Absolute entries are rejected outright; `..` components are folded so the
/// resolved path can never leave `base`.
pub fn sanitize_path<P: AsRef<Path>, B: AsRef<Path>>(entry_path: P, base: B) -> Result<SanitizedPath> {
    let entry_path = entry_path.as_ref();
    let base = base.as_ref();
    let relative = normalize_path(entry_path);

    // Reject absolute paths (zip-slip protection)
    if relative.has_root() || relative.is_absolute() {
        return Err(Error::ZipSlip {
            entry: entry_path.to_path_buf(),
            resolved: relative,
        });
    }

    let resolved = base.join(&relative);
    if !resolved.starts_with(base) {
        return Err(Error::ZipSlip {
            entry: entry_path.to_path_buf(),
            resolved,
        });
    }

    Ok(SanitizedPath {
        original: entry_path.to_path_buf(),
        relative,
        resolved,
    })
}

/// Normalize path separators and resolve relative components.
fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(part) => result.push(part),
            Component::RootDir => result.push("/"),
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::CurDir => {}
        }
    }

    result
}
