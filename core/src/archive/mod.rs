//! Archive extraction services.
//!
//! Decompression itself is delegated to third-party codecs; this module only
//! adapts them to one small interface. Each extractor works on an in-memory
//! archive and reports failures as [`LoadError::ExtractionFailed`].

mod lha;
mod zip;

pub use self::lha::LhaExtractor;
pub use self::zip::ZipExtractor;

use crate::error::Result;

/// Maximum decompressed size of a single archive member: 512 MiB.
pub(crate) const MAX_ENTRY_SIZE: u64 = 512 * 1024 * 1024;

/// One extracted archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name as stored in the archive (may contain directories)
    pub name: String,
    pub data: Vec<u8>,
}

/// An archive format the loader can read.
///
/// Directory entries are never reported.
pub trait ArchiveExtractor: Send + Sync {
    /// Short format name for diagnostics (e.g. `"zip"`).
    fn format(&self) -> &'static str;

    /// Check if bytes appear to be an archive of this format.
    fn can_extract(&self, archive: &[u8]) -> bool;

    /// Entry names in archive order, without decompressing anything.
    fn list_entries(&self, archive: &[u8]) -> Result<Vec<String>>;

    /// Every entry with its content, in archive order.
    fn extract_all(&self, archive: &[u8]) -> Result<Vec<ArchiveEntry>>;

    /// Content of the entry called exactly `name`.
    fn extract_one(&self, archive: &[u8], name: &str) -> Result<Vec<u8>>;
}

/// Registry of the extractors compiled into the loader.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn ArchiveExtractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Registry holding every built-in extractor.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ZipExtractor));
        registry.register(Box::new(LhaExtractor));
        registry
    }

    pub fn register(&mut self, extractor: Box<dyn ArchiveExtractor>) {
        self.extractors.push(extractor);
    }

    /// Takes ownership of the extractor that recognises the given bytes.
    pub fn take(mut self, archive: &[u8]) -> Option<Box<dyn ArchiveExtractor>> {
        let idx = self.extractors.iter().position(|e| e.can_extract(archive))?;
        Some(self.extractors.swap_remove(idx))
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_detects_zip() {
        let registry = ExtractorRegistry::with_builtin();
        let zip = test_support::build_zip(&[("A.ALD", b"x")]);
        assert_eq!(registry.take(&zip).unwrap().format(), "zip");
    }

    #[test]
    fn builtin_registry_detects_lha_header() {
        let registry = ExtractorRegistry::with_builtin();
        let mut header = vec![0x20, 0x00];
        header.extend_from_slice(b"-lh5-");
        header.extend_from_slice(&[0u8; 16]);
        assert_eq!(registry.take(&header).unwrap().format(), "lha");
    }

    #[test]
    fn unknown_bytes_have_no_extractor() {
        let registry = ExtractorRegistry::with_builtin();
        assert!(registry.take(b"plain text, not an archive").is_none());
        assert!(ExtractorRegistry::with_builtin().take(b"").is_none());
    }
}
