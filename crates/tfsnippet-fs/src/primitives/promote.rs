use crate::{Error, Result};
use std::path::Path;

/// Renames a staged file or directory onto its final path.
///
/// The rename is a single directory-entry operation, so readers polling for
/// `dest` either see nothing or the complete artifact.
pub fn promote(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();
    let promote_err = |e| Error::Promote {
        from: src.to_path_buf(),
        to: dest.to_path_buf(),
        source: e,
    };

    #[cfg(not(windows))]
    {
        std::fs::rename(src, dest).map_err(promote_err)
    }

    // Antivirus scanners and indexers briefly hold handles on fresh files.
    #[cfg(windows)]
    {
        const RETRY_COUNT: u32 = 5;
        const RETRY_DELAY: std::time::Duration = std::time::Duration::from_millis(100);

        let mut attempts = 0;
        loop {
            match std::fs::rename(src, dest) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                    attempts += 1;
                    if attempts >= RETRY_COUNT {
                        return Err(Error::RetryLimitExceeded {
                            path: dest.to_path_buf(),
                        });
                    }
                    std::thread::sleep(RETRY_DELAY * attempts);
                }
                Err(e) => return Err(promote_err(e)),
            }
        }
    }
}
