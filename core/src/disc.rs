//! Read-only view of a mounted disc image.
//!
//! Sector reading and ISO9660 directory walking live outside this crate;
//! sources only see the [`DiscFilesystem`] trait. [`MemoryDisc`] is an
//! in-memory implementation for tooling and tests.

use std::io;

use hashbrown::HashMap;
use xsys_shared::names;

/// Sector size of a data track.
pub const SECTOR_SIZE: usize = 2048;

/// Directory entry on a disc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Name as recorded on the disc (version suffix already stripped)
    pub name: String,
    pub is_directory: bool,
    /// File size in bytes (0 for directories)
    pub size: u64,
    /// Reader-specific location of the extent
    pub location: u64,
}

/// Filesystem reader for a disc image.
pub trait DiscFilesystem: Send + Sync {
    /// The root directory entry.
    fn root_dir(&self) -> DirEntry;

    /// Entries of `dir` in on-disc order.
    fn read_dir(&self, dir: &DirEntry) -> io::Result<Vec<DirEntry>>;

    /// Case-insensitive lookup of `name` inside `dir`.
    fn get_dir_ent(&self, name: &str, dir: &DirEntry) -> io::Result<Option<DirEntry>> {
        Ok(self
            .read_dir(dir)?
            .into_iter()
            .find(|e| names::eq_ignore_case(&e.name, name)))
    }

    /// Whole file content as a sequence of chunks.
    fn read_file(&self, entry: &DirEntry) -> io::Result<Vec<Vec<u8>>>;

    /// Volume label, or an empty string if the disc has none.
    fn volume_label(&self) -> String;

    /// Audio of CD-DA track `track` as a playable file, `None` if the disc has
    /// no such track.
    fn read_audio_track(&self, track: u32) -> io::Result<Option<Vec<u8>>>;

    /// Numbers of the audio tracks on the disc, if the reader knows them.
    fn audio_tracks(&self) -> Vec<u32> {
        Vec::new()
    }
}

#[derive(Debug)]
enum Node {
    Dir { name: String, children: Vec<usize> },
    File { name: String, data: Vec<u8> },
}

impl Node {
    fn name(&self) -> &str {
        match self {
            Node::Dir { name, .. } | Node::File { name, .. } => name,
        }
    }
}

/// Disc held entirely in memory.
///
/// Files are returned in [`SECTOR_SIZE`] chunks, the way a sector reader
/// hands them out.
#[derive(Debug)]
pub struct MemoryDisc {
    label: String,
    nodes: Vec<Node>,
    tracks: HashMap<u32, Vec<u8>>,
}

const ROOT: usize = 0;

impl MemoryDisc {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            nodes: vec![Node::Dir {
                name: String::new(),
                children: Vec::new(),
            }],
            tracks: HashMap::new(),
        }
    }

    /// Adds a file at `path` (`/` separated), creating parent directories.
    pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        let (dir, name) = match path.rsplit_once('/') {
            Some((dir, name)) => (self.ensure_dir(dir), name),
            None => (ROOT, path),
        };
        self.push_child(
            dir,
            Node::File {
                name: name.to_string(),
                data: data.into(),
            },
        );
        self
    }

    /// Adds an (empty) directory at `path`.
    pub fn with_dir(mut self, path: &str) -> Self {
        self.ensure_dir(path);
        self
    }

    /// Adds CD-DA track `track`.
    pub fn with_track(mut self, track: u32, data: impl Into<Vec<u8>>) -> Self {
        self.tracks.insert(track, data.into());
        self
    }

    fn ensure_dir(&mut self, path: &str) -> usize {
        let mut current = ROOT;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            let existing = self.children(current).iter().copied().find(|&idx| {
                matches!(&self.nodes[idx], Node::Dir { name, .. } if name == part)
            });
            current = match existing {
                Some(idx) => idx,
                None => self.push_child(
                    current,
                    Node::Dir {
                        name: part.to_string(),
                        children: Vec::new(),
                    },
                ),
            };
        }
        current
    }

    fn push_child(&mut self, parent: usize, node: Node) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(node);
        if let Node::Dir { children, .. } = &mut self.nodes[parent] {
            children.push(idx);
        }
        idx
    }

    fn children(&self, idx: usize) -> &[usize] {
        match &self.nodes[idx] {
            Node::Dir { children, .. } => children,
            Node::File { .. } => &[],
        }
    }

    fn entry(&self, idx: usize) -> DirEntry {
        let node = &self.nodes[idx];
        DirEntry {
            name: node.name().to_string(),
            is_directory: matches!(node, Node::Dir { .. }),
            size: match node {
                Node::File { data, .. } => data.len() as u64,
                Node::Dir { .. } => 0,
            },
            location: idx as u64,
        }
    }

    fn node(&self, entry: &DirEntry) -> io::Result<&Node> {
        self.nodes.get(entry.location as usize).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no extent at {} for {}", entry.location, entry.name),
            )
        })
    }
}

impl DiscFilesystem for MemoryDisc {
    fn root_dir(&self) -> DirEntry {
        self.entry(ROOT)
    }

    fn read_dir(&self, dir: &DirEntry) -> io::Result<Vec<DirEntry>> {
        match self.node(dir)? {
            Node::Dir { children, .. } => Ok(children.iter().map(|&idx| self.entry(idx)).collect()),
            Node::File { name, .. } => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", name),
            )),
        }
    }

    fn read_file(&self, entry: &DirEntry) -> io::Result<Vec<Vec<u8>>> {
        match self.node(entry)? {
            Node::File { data, .. } => Ok(data.chunks(SECTOR_SIZE).map(<[u8]>::to_vec).collect()),
            Node::Dir { name, .. } => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", name),
            )),
        }
    }

    fn volume_label(&self) -> String {
        self.label.clone()
    }

    fn read_audio_track(&self, track: u32) -> io::Result<Option<Vec<u8>>> {
        Ok(self.tracks.get(&track).cloned())
    }

    fn audio_tracks(&self) -> Vec<u32> {
        let mut tracks: Vec<u32> = self.tracks.keys().copied().collect();
        tracks.sort_unstable();
        tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryDisc {
        MemoryDisc::new("RANCE4")
            .with_file("README.TXT", "hello")
            .with_file("GAMEDATA/ADISK.DAT", vec![0u8; SECTOR_SIZE + 10])
            .with_file("GAMEDATA/AG.ALD", "g")
            .with_dir("EXTRA")
            .with_track(2, "pcm")
    }

    #[test]
    fn listing_keeps_insertion_order() {
        let disc = sample();
        let root = disc.read_dir(&disc.root_dir()).unwrap();
        let names: Vec<&str> = root.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["README.TXT", "GAMEDATA", "EXTRA"]);
        assert!(root[1].is_directory);
        assert_eq!(root[0].size, 5);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let disc = sample();
        let game = disc.get_dir_ent("gamedata", &disc.root_dir()).unwrap().unwrap();
        let marker = disc.get_dir_ent("adisk.dat", &game).unwrap().unwrap();
        assert_eq!(marker.name, "ADISK.DAT");
        assert!(disc.get_dir_ent("missing", &game).unwrap().is_none());
    }

    #[test]
    fn files_are_read_in_sector_chunks() {
        let disc = sample();
        let game = disc.get_dir_ent("GAMEDATA", &disc.root_dir()).unwrap().unwrap();
        let marker = disc.get_dir_ent("ADISK.DAT", &game).unwrap().unwrap();
        let chunks = disc.read_file(&marker).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), SECTOR_SIZE);
        assert_eq!(chunks[1].len(), 10);

        assert!(disc.read_file(&game).is_err());
    }

    #[test]
    fn audio_tracks() {
        let disc = sample();
        assert_eq!(disc.read_audio_track(2).unwrap().as_deref(), Some(&b"pcm"[..]));
        assert!(disc.read_audio_track(3).unwrap().is_none());
        assert_eq!(disc.audio_tracks(), vec![2]);
        assert_eq!(disc.volume_label(), "RANCE4");
    }
}
