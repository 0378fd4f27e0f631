use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::entry::ArchiveReport;
use crate::error::{Error, Result};
use crate::extract::{EntrySource, TarSource, ZipSource, extract};
use crate::format::{ArchiveFormat, detect_from_reader};
use crate::options::ExtractOptions;

/// Opens archive files as streams of entries.
///
/// The cache depends on this trait rather than on a concrete extractor, so
/// callers can substitute their own (for instance one that counts opens, or
/// one that understands an in-house format).
pub trait ArchiveReader: Send + Sync {
    fn open(&self, archive: &Path) -> Result<Box<dyn EntrySource>>;
}

/// Default reader for zip and tar archives.
///
/// The format comes from the file name suffix, falling back to sniffing the
/// leading bytes when the suffix is not recognized.
#[derive(Clone, Copy, Debug, Default)]
pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveReader for Extractor {
    fn open(&self, archive: &Path) -> Result<Box<dyn EntrySource>> {
        let mut file = File::open(archive).map_err(|e| Error::Open {
            path: archive.to_path_buf(),
            source: e,
        })?;

        let format = match ArchiveFormat::from_path(archive) {
            Some(format) => format,
            None => detect_from_reader(&mut file)?.ok_or_else(|| Error::UnsupportedFormat {
                path: archive.to_path_buf(),
            })?,
        };

        let reader = BufReader::new(file);
        match format {
            ArchiveFormat::Zip => Ok(Box::new(ZipSource::new(reader)?)),
            ArchiveFormat::Tar(codec) => Ok(Box::new(TarSource::new(reader, codec)?)),
        }
    }
}

/// Opens `archive` with `reader` and writes every entry under `destination`.
pub fn extract_archive(
    reader: &dyn ArchiveReader,
    archive: &Path,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let mut source = reader.open(archive)?;
    extract(source.as_mut(), destination, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let result = Extractor::new().open(&dir.path().join("missing.zip"));
        assert!(matches!(result, Err(Error::Open { .. })));
    }

    #[test]
    fn open_unrecognized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.txt");
        std::fs::write(&path, b"not a valid archive").unwrap();

        let result = Extractor::new().open(&path);
        assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
    }

    #[test]
    fn open_garbage_with_zip_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"not a valid archive").unwrap();

        let result = Extractor::new().open(&path);
        assert!(matches!(result, Err(Error::Corrupted { .. })));
    }
}
