//! Destinations for discovered game data.
//!
//! The runtime consumes two things from a load: the data files themselves
//! (through a [`FileRegistry`]) and the synthesized manifest (through a
//! [`VirtualFs`]). Both are append-only from the loader's point of view.

use std::io;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use xsys_shared::names;

/// One logical game file handed to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEntry {
    /// Case-preserved file name (no directory prefix)
    pub name: String,
    /// Total size in bytes
    pub size: u64,
    /// File content as read from the container
    pub chunks: Vec<Vec<u8>>,
}

impl DataEntry {
    /// Entry made of a single contiguous buffer.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            chunks: vec![bytes],
        }
    }

    /// Entry made of chunks as returned by a sector reader.
    pub fn from_chunks(name: impl Into<String>, chunks: Vec<Vec<u8>>) -> Self {
        let size = chunks.iter().map(|c| c.len() as u64).sum();
        Self {
            name: name.into(),
            size,
            chunks,
        }
    }

    /// Concatenated content.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size as usize);
        for chunk in &self.chunks {
            out.extend_from_slice(chunk);
        }
        out
    }
}

/// Append-only sink for game data files.
///
/// No duplicate-name resolution happens here; the runtime lets the last
/// registration for a name win.
pub trait FileRegistry {
    fn register(&mut self, entry: DataEntry) -> io::Result<()>;
}

/// The runtime's virtual filesystem, used for the manifest.
pub trait VirtualFs {
    fn write_file(&mut self, path: &str, contents: &[u8]) -> io::Result<()>;
}

/// Registry that keeps every entry in memory, in registration order.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: Vec<DataEntry>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All registrations in order, duplicates included.
    pub fn entries(&self) -> &[DataEntry] {
        &self.entries
    }

    /// The entry the runtime would see for `name` (last registration wins).
    pub fn get(&self, name: &str) -> Option<&DataEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| names::eq_ignore_case(&e.name, name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FileRegistry for MemoryRegistry {
    fn register(&mut self, entry: DataEntry) -> io::Result<()> {
        self.entries.push(entry);
        Ok(())
    }
}

/// Virtual filesystem kept in memory.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// File content as UTF-8 text, if present and valid.
    pub fn read_to_string(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|b| std::str::from_utf8(b).ok())
    }
}

impl VirtualFs for MemoryFs {
    fn write_file(&mut self, path: &str, contents: &[u8]) -> io::Result<()> {
        self.files.insert(path.to_string(), contents.to_vec());
        Ok(())
    }
}

/// Writes registered files and the manifest below a host directory.
///
/// Used by tooling to materialize a load on disk. Data files land directly
/// in the root; virtual filesystem paths keep their relative structure.
#[derive(Debug)]
pub struct DirectoryOutput {
    root: PathBuf,
    written: usize,
}

impl DirectoryOutput {
    /// Creates the output directory if needed.
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, written: 0 })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of data files registered so far.
    pub fn written(&self) -> usize {
        self.written
    }

    fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let mut path = self.root.clone();
        for part in relative.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("path escapes output directory: {}", relative),
                    ));
                }
                part => path.push(part),
            }
        }
        Ok(path)
    }
}

impl FileRegistry for DirectoryOutput {
    fn register(&mut self, entry: DataEntry) -> io::Result<()> {
        let path = self.resolve(names::base_name(&entry.name))?;
        let mut file = std::fs::File::create(&path)?;
        for chunk in &entry.chunks {
            io::Write::write_all(&mut file, chunk)?;
        }
        self.written += 1;
        Ok(())
    }
}

impl VirtualFs for DirectoryOutput {
    fn write_file(&mut self, path: &str, contents: &[u8]) -> io::Result<()> {
        let path = self.resolve(path)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_entry_sizes() {
        let entry = DataEntry::from_chunks("A.ALD", vec![vec![1, 2], vec![3]]);
        assert_eq!(entry.size, 3);
        assert_eq!(entry.to_bytes(), vec![1, 2, 3]);

        let entry = DataEntry::from_bytes("B.ALD", vec![9; 10]);
        assert_eq!(entry.size, 10);
        assert_eq!(entry.chunks.len(), 1);
    }

    #[test]
    fn memory_registry_last_registration_wins() {
        let mut registry = MemoryRegistry::new();
        registry
            .register(DataEntry::from_bytes("X.DAT", vec![1]))
            .unwrap();
        registry
            .register(DataEntry::from_bytes("x.dat", vec![2]))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("X.DAT").unwrap().to_bytes(), vec![2]);
        assert_eq!(registry.names(), vec!["X.DAT", "x.dat"]);
    }

    #[test]
    fn memory_fs_roundtrip() {
        let mut fs = MemoryFs::new();
        fs.write_file("xsystem35.gr", b"Ain System39.ain\n").unwrap();
        assert_eq!(fs.read_to_string("xsystem35.gr"), Some("Ain System39.ain\n"));
        assert!(fs.get("missing").is_none());
    }

    #[test]
    fn directory_output_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = DirectoryOutput::create(dir.path().join("out")).unwrap();

        out.register(DataEntry::from_chunks("AG.ALD", vec![vec![1], vec![2, 3]]))
            .unwrap();
        out.write_file("save/readme.txt", b"hi").unwrap();

        assert_eq!(out.written(), 1);
        assert_eq!(std::fs::read(out.root().join("AG.ALD")).unwrap(), vec![1, 2, 3]);
        assert_eq!(std::fs::read(out.root().join("save/readme.txt")).unwrap(), b"hi");
    }

    #[test]
    fn directory_output_rejects_parent_components() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = DirectoryOutput::create(dir.path()).unwrap();
        let err = out.write_file("../escape.gr", b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
