use std::io::Read;

use crate::entry::PendingEntry;
use crate::error::{Error, Result};
use crate::extract::{EntrySource, check_length};
use crate::format::{ArchiveFormat, TarCompress};

pub struct TarSource {
    archive: tar::Archive<Box<dyn Read>>,
    codec: TarCompress,
}

impl TarSource {
    pub fn new<R: Read + 'static>(reader: R, codec: TarCompress) -> Result<Self> {
        let reader = codec.decoder(reader)?;
        Ok(Self {
            archive: tar::Archive::new(reader),
            codec,
        })
    }
}

impl EntrySource for TarSource {
    fn entries(&mut self) -> Result<Box<dyn Iterator<Item = Result<PendingEntry>> + '_>> {
        let entries = self.archive.entries().map_err(Error::corrupted)?;
        Ok(Box::new(entries.filter_map(|entry| read_entry(entry).transpose())))
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Tar(self.codec)
    }
}

/// Reads one tar entry into memory. Links, device nodes and extension
/// headers yield `None`.
fn read_entry<R: Read>(entry: std::io::Result<tar::Entry<'_, R>>) -> Result<Option<PendingEntry>> {
    let mut entry = entry.map_err(Error::corrupted)?;
    let path = entry.path().map_err(|_| Error::InvalidPath)?.into_owned();

    let header = entry.header();
    let mode = header.mode().ok();
    let entry_type = header.entry_type();

    if entry_type.is_dir() {
        return Ok(Some(PendingEntry::directory(path).with_mode(mode)));
    }
    if !entry_type.is_file() {
        return Ok(None);
    }

    // The header size is untrusted; grow the buffer as bytes arrive.
    let expected = entry.size();
    let mut content = Vec::new();
    entry.read_to_end(&mut content).map_err(Error::corrupted)?;
    check_length(&path, expected, content.len())?;
    Ok(Some(PendingEntry::file(path, content).with_mode(mode)))
}
