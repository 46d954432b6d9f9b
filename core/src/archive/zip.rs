//! Zip containers, backed by the `zip` crate.

use std::io::{Cursor, Read};

use ::zip::ZipArchive;
use ::zip::read::ZipFile;

use super::{ArchiveEntry, ArchiveExtractor, MAX_ENTRY_SIZE};
use crate::error::{LoadError, Result};

const LOCAL_HEADER_MAGIC: &[u8; 4] = b"PK\x03\x04";
const EMPTY_ARCHIVE_MAGIC: &[u8; 4] = b"PK\x05\x06";

/// Zip archive extractor.
pub struct ZipExtractor;

fn open(archive: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>> {
    ZipArchive::new(Cursor::new(archive))
        .map_err(|e| LoadError::ExtractionFailed(format!("Not a valid ZIP file: {}", e)))
}

/// Reads one entry, refusing anything at or over `MAX_ENTRY_SIZE`.
///
/// The declared size comes from the archive and is only trusted to reject.
fn read_entry<R: Read>(mut file: ZipFile<'_, R>) -> Result<Vec<u8>> {
    let name = file.name().to_string();
    let too_large =
        || LoadError::ExtractionFailed(format!("ZIP entry {} exceeds the maximum safe size", name));
    if file.size() >= MAX_ENTRY_SIZE {
        return Err(too_large());
    }
    let mut data = Vec::new();
    file.by_ref().take(MAX_ENTRY_SIZE).read_to_end(&mut data)?;
    if data.len() as u64 >= MAX_ENTRY_SIZE {
        return Err(too_large());
    }
    Ok(data)
}

impl ArchiveExtractor for ZipExtractor {
    fn format(&self) -> &'static str {
        "zip"
    }

    fn can_extract(&self, archive: &[u8]) -> bool {
        archive.len() >= 4 && (&archive[..4] == LOCAL_HEADER_MAGIC || &archive[..4] == EMPTY_ARCHIVE_MAGIC)
    }

    fn list_entries(&self, archive: &[u8]) -> Result<Vec<String>> {
        let mut zip = open(archive)?;
        let mut names = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let file = zip.by_index_raw(i).map_err(LoadError::extraction)?;
            if !file.is_dir() {
                names.push(file.name().to_string());
            }
        }
        Ok(names)
    }

    fn extract_all(&self, archive: &[u8]) -> Result<Vec<ArchiveEntry>> {
        let mut zip = open(archive)?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let file = zip.by_index(i).map_err(LoadError::extraction)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let data = read_entry(file)?;
            entries.push(ArchiveEntry { name, data });
        }
        Ok(entries)
    }

    fn extract_one(&self, archive: &[u8], name: &str) -> Result<Vec<u8>> {
        let mut zip = open(archive)?;
        let file = zip
            .by_name(name)
            .map_err(|e| LoadError::ExtractionFailed(format!("Cannot read ZIP entry {}: {}", name, e)))?;
        read_entry(file)
    }
}
