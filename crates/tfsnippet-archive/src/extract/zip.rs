use std::io::{Read, Seek};

use crate::entry::PendingEntry;
use crate::error::{Error, Result};
use crate::extract::{EntrySource, check_length};
use crate::format::ArchiveFormat;

pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader).map_err(Error::corrupted)?;
        Ok(Self { archive })
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn entries(&mut self) -> Result<Box<dyn Iterator<Item = Result<PendingEntry>> + '_>> {
        let archive = &mut self.archive;
        let len = archive.len();
        Ok(Box::new((0..len).map(move |index| read_entry(&mut *archive, index))))
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }
}

fn read_entry<R: Read + Seek>(archive: &mut zip::ZipArchive<R>, index: usize) -> Result<PendingEntry> {
    let mut file = archive.by_index(index).map_err(Error::corrupted)?;

    // `enclosed_name` refuses absolute and escaping paths.
    let path = file.enclosed_name().ok_or(Error::InvalidPath)?.to_path_buf();
    let mode = file.unix_mode();

    if file.is_dir() {
        return Ok(PendingEntry::directory(path).with_mode(mode));
    }

    let expected = file.size();
    let mut content = Vec::new();
    file.read_to_end(&mut content).map_err(Error::corrupted)?;
    check_length(&path, expected, content.len())?;
    Ok(PendingEntry::file(path, content).with_mode(mode))
}
