//! Size limits for reading host files into memory.

use std::io;
use std::path::Path;

/// Maximum size of a single input container read into memory.
pub const MAX_CONTAINER_BYTES: u64 = 2 * 1024 * 1024 * 1024; // 2 GiB
/// Maximum size of a loose game file read into memory.
pub const MAX_GAME_FILE_BYTES: u64 = 512 * 1024 * 1024; // 512 MiB

/// Rejects a file of `len` bytes that would exceed `max_bytes` once loaded.
pub fn ensure_within_limit(path: &Path, len: u64, max_bytes: u64) -> io::Result<()> {
    if len > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "File too large: {} ({} bytes, max {} bytes)",
                path.display(),
                len,
                max_bytes
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_files_over_limit() {
        let path = Path::new("big.bin");
        assert!(ensure_within_limit(path, 16, 16).is_ok());

        let err = ensure_within_limit(path, 16, 15).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("File too large: big.bin"));
    }
}
