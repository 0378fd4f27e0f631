use std::io::{self, Read, Seek};
use std::path::Path;

use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar(TarCompress),
}

/// Compression codec wrapped around a tar stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TarCompress {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

/// Recognized file name suffixes, matched case-insensitively.
const SUFFIXES: &[(&str, ArchiveFormat)] = &[
    (".tar.gz", ArchiveFormat::Tar(TarCompress::Gzip)),
    (".tgz", ArchiveFormat::Tar(TarCompress::Gzip)),
    (".tar.bz2", ArchiveFormat::Tar(TarCompress::Bzip2)),
    (".tbz2", ArchiveFormat::Tar(TarCompress::Bzip2)),
    (".tbz", ArchiveFormat::Tar(TarCompress::Bzip2)),
    (".tar.xz", ArchiveFormat::Tar(TarCompress::Xz)),
    (".txz", ArchiveFormat::Tar(TarCompress::Xz)),
    (".tar.zst", ArchiveFormat::Tar(TarCompress::Zstd)),
    (".tzst", ArchiveFormat::Tar(TarCompress::Zstd)),
    (".tar", ArchiveFormat::Tar(TarCompress::None)),
    (".zip", ArchiveFormat::Zip),
];

impl TarCompress {
    /// Wraps `reader` in the decoder for this codec.
    pub fn decoder<R: Read + 'static>(self, reader: R) -> Result<Box<dyn Read>> {
        match self {
            Self::None => Ok(Box::new(reader)),
            Self::Gzip => Ok(Box::new(flate2::read::GzDecoder::new(reader))),
            Self::Bzip2 => Ok(Box::new(bzip2::read::BzDecoder::new(reader))),
            #[cfg(feature = "xz")]
            Self::Xz => Ok(Box::new(xz2::read::XzDecoder::new(reader))),
            #[cfg(feature = "zstd")]
            Self::Zstd => {
                let decoder = zstd::stream::read::Decoder::new(reader).map_err(Error::corrupted)?;
                Ok(Box::new(decoder))
            }
            #[allow(unreachable_patterns)]
            _ => Err(Error::corrupted(format!("{self:?} support is not compiled in"))),
        }
    }
}

fn suffix_match(file_name: &str) -> Option<(&'static str, ArchiveFormat)> {
    SUFFIXES.iter().copied().find(|(suffix, _)| {
        let Some(start) = file_name.len().checked_sub(suffix.len()) else {
            return false;
        };
        file_name.is_char_boundary(start) && file_name[start..].eq_ignore_ascii_case(suffix)
    })
}

impl ArchiveFormat {
    /// Guesses the format from a file name suffix.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let file_name = path.as_ref().file_name()?.to_str()?;
        suffix_match(file_name).map(|(_, format)| format)
    }
}

/// Strips archive suffixes from a file name: `payload.tar.gz` becomes
/// `payload`. Names without a known archive suffix lose their last
/// extension, so `invalid.txt` becomes `invalid`.
pub fn strip_archive_suffix(file_name: &str) -> &str {
    if let Some((suffix, _)) = suffix_match(file_name) {
        let stem = &file_name[..file_name.len() - suffix.len()];
        if !stem.is_empty() {
            return stem;
        }
    }
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
}

pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Some(ArchiveFormat::Zip),
        [0x1F, 0x8B, ..] => Some(ArchiveFormat::Tar(TarCompress::Gzip)),
        [0x42, 0x5A, 0x68, ..] => Some(ArchiveFormat::Tar(TarCompress::Bzip2)),
        [0x28, 0xB5, 0x2F, 0xFD, ..] => Some(ArchiveFormat::Tar(TarCompress::Zstd)),
        [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => Some(ArchiveFormat::Tar(TarCompress::Xz)),
        _ => {
            if is_tar_header(data) {
                Some(ArchiveFormat::Tar(TarCompress::None))
            } else {
                None
            }
        }
    }
}

fn is_tar_header(data: &[u8]) -> bool {
    data.len() >= 263 && data[257..262] == *b"ustar"
}

/// Sniffs the format from the first bytes of `reader`, then rewinds it.
pub fn detect_from_reader<R: Read + Seek>(reader: &mut R) -> io::Result<Option<ArchiveFormat>> {
    let mut header = Vec::with_capacity(512);
    reader.by_ref().take(512).read_to_end(&mut header)?;
    reader.rewind()?;
    Ok(detect_format(&header))
}
