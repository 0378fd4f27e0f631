//! Resolution of the cache root directory.
//!
//! Every read goes through [`resolve_cache_root`], which applies the
//! precedence: programmatic override, then the `TFSNIPPET_CACHE_ROOT`
//! environment variable, then `~/.tfsnippet/cache`.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;

/// Environment variable that overrides the default cache root.
pub const CACHE_ROOT_ENV: &str = "TFSNIPPET_CACHE_ROOT";

const DEFAULT_CACHE_DIR: &str = ".tfsnippet/cache";

static CACHE_ROOT_OVERRIDE: Lazy<RwLock<Option<PathBuf>>> = Lazy::new(|| RwLock::new(None));

/// Default root under the user's home directory.
pub fn default_cache_root(home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) => home.join(DEFAULT_CACHE_DIR),
        None => expand_path(DEFAULT_CACHE_DIR),
    }
}

/// Applies the root precedence to explicit inputs. Empty values count as
/// unset.
pub fn resolve_cache_root(
    override_root: Option<&Path>,
    env_value: Option<&OsStr>,
    home: Option<&Path>,
) -> PathBuf {
    if let Some(root) = override_root.filter(|p| !p.as_os_str().is_empty()) {
        return expand_path_with(root, home);
    }
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return expand_path_with(Path::new(value), home);
    }
    default_cache_root(home)
}

/// The effective cache root for this process.
pub fn get_cache_root() -> PathBuf {
    let guard = CACHE_ROOT_OVERRIDE.read().unwrap_or_else(PoisonError::into_inner);
    let env_value = std::env::var_os(CACHE_ROOT_ENV);
    let home = home::home_dir();
    resolve_cache_root(guard.as_deref(), env_value.as_deref(), home.as_deref())
}

/// Overrides the cache root for the rest of the process and returns the
/// stored absolute path.
pub fn set_cache_root(path: impl AsRef<Path>) -> PathBuf {
    let resolved = expand_path(path);
    let mut guard = CACHE_ROOT_OVERRIDE.write().unwrap_or_else(PoisonError::into_inner);
    *guard = Some(resolved.clone());
    resolved
}

/// Drops the override set by [`set_cache_root`].
pub fn reset_cache_root() {
    let mut guard = CACHE_ROOT_OVERRIDE.write().unwrap_or_else(PoisonError::into_inner);
    *guard = None;
}

/// Expands a leading `~` and makes the path absolute against the current
/// directory. Symlinks are not resolved.
pub fn expand_path(path: impl AsRef<Path>) -> PathBuf {
    let home = home::home_dir();
    expand_path_with(path.as_ref(), home.as_deref())
}

fn expand_path_with(path: &Path, home: Option<&Path>) -> PathBuf {
    let mut components = path.components();
    let expanded = match (components.next(), home) {
        (Some(Component::Normal(first)), Some(home)) if first == "~" => home.join(components.as_path()),
        _ => path.to_path_buf(),
    };
    std::path::absolute(&expanded).unwrap_or(expanded)
}
