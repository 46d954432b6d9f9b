//! LHA/LZH archives, backed by the `delharc` crate.
//!
//! Much of the era's game data was distributed as `.lzh` self-extractors
//! and plain LHA archives, typically LH5 compressed.

use std::io::Read;

use delharc::LhaDecodeReader;

use super::{ArchiveEntry, ArchiveExtractor, MAX_ENTRY_SIZE};
use crate::error::{LoadError, Result};

/// Search limit for the LHA method signature.
///
/// Level 0/1 headers carry the method at offset 2; level 2 headers can put
/// it further in.
const LHA_SEARCH_LIMIT: usize = 40;

/// Method signature is `-lh?-` (5 bytes).
const LHA_SIGNATURE_LENGTH: usize = 5;

/// LHA archive extractor.
pub struct LhaExtractor;

fn is_lha(data: &[u8]) -> bool {
    let limit = data.len().min(LHA_SEARCH_LIMIT);
    if limit < LHA_SIGNATURE_LENGTH {
        return false;
    }
    data[..limit].windows(LHA_SIGNATURE_LENGTH).any(|w| {
        w[0] == b'-'
            && w[1] == b'l'
            && (w[2] == b'h' || w[2] == b'z')
            && w[4] == b'-'
            && (w[3].is_ascii_digit() || w[3] == b's' || w[3] == b'd')
    })
}

/// Walks every member, handing each header name and its decoder to `visit`.
///
/// `visit` returns `false` to stop early.
fn walk<F>(archive: &[u8], mut visit: F) -> Result<()>
where
    F: FnMut(String, bool, &mut LhaDecodeReader<&[u8]>) -> Result<bool>,
{
    let mut reader = LhaDecodeReader::new(archive)
        .map_err(|e| LoadError::ExtractionFailed(format!("Failed to parse LHA archive: {}", e)))?;
    loop {
        let header = reader.header();
        let name = header.parse_pathname().to_string_lossy().replace('\\', "/");
        let is_dir = header.is_directory();
        if !visit(name, is_dir, &mut reader)? {
            return Ok(());
        }
        if !reader.next_file().map_err(LoadError::extraction)? {
            return Ok(());
        }
    }
}

fn read_member(name: &str, reader: &mut LhaDecodeReader<&[u8]>) -> Result<Vec<u8>> {
    if !reader.is_decoder_supported() {
        return Err(LoadError::ExtractionFailed(format!(
            "Unsupported LHA compression method for {}",
            name
        )));
    }
    let mut data = Vec::new();
    reader.by_ref().take(MAX_ENTRY_SIZE).read_to_end(&mut data)?;
    if data.len() as u64 >= MAX_ENTRY_SIZE {
        return Err(LoadError::ExtractionFailed(format!(
            "LHA entry {} exceeds the maximum safe size",
            name
        )));
    }
    reader.crc_check().map_err(LoadError::extraction)?;
    Ok(data)
}

impl ArchiveExtractor for LhaExtractor {
    fn format(&self) -> &'static str {
        "lha"
    }

    fn can_extract(&self, archive: &[u8]) -> bool {
        is_lha(archive)
    }

    fn list_entries(&self, archive: &[u8]) -> Result<Vec<String>> {
        let mut names = Vec::new();
        walk(archive, |name, is_dir, _| {
            if !is_dir {
                names.push(name);
            }
            Ok(true)
        })?;
        Ok(names)
    }

    fn extract_all(&self, archive: &[u8]) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::new();
        walk(archive, |name, is_dir, reader| {
            if !is_dir {
                let data = read_member(&name, reader)?;
                entries.push(ArchiveEntry { name, data });
            }
            Ok(true)
        })?;
        Ok(entries)
    }

    fn extract_one(&self, archive: &[u8], name: &str) -> Result<Vec<u8>> {
        let mut found = None;
        walk(archive, |entry, is_dir, reader| {
            if is_dir || entry != name {
                return Ok(true);
            }
            found = Some(read_member(&entry, reader)?);
            Ok(false)
        })?;
        found.ok_or_else(|| LoadError::ExtractionFailed(format!("No LHA entry named {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_detection() {
        let mut level0 = vec![0x22, 0x00];
        level0.extend_from_slice(b"-lh5-");
        assert!(is_lha(&level0));

        let mut level2 = vec![0u8; 20];
        level2.extend_from_slice(b"-lh0-");
        assert!(is_lha(&level2));

        let mut lzs = vec![0x22, 0x00];
        lzs.extend_from_slice(b"-lzs-");
        assert!(is_lha(&lzs));

        let mut too_far = vec![0u8; LHA_SEARCH_LIMIT];
        too_far.extend_from_slice(b"-lh5-");
        assert!(!is_lha(&too_far));

        assert!(!is_lha(b"-lh"));
        assert!(!is_lha(b"PK\x03\x04 not lha"));
    }

    #[test]
    fn test_truncated_archive_fails() {
        let mut header = vec![0x22, 0x00];
        header.extend_from_slice(b"-lh5-");
        let err = LhaExtractor.list_entries(&header).unwrap_err();
        assert!(matches!(err, LoadError::ExtractionFailed(_)));
    }
}
