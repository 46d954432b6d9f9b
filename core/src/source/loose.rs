//! Loose file set source.
//!
//! The user picked a flat set of files. There is no directory structure to
//! search and no extension filter: every file that is not a numbered audio
//! track is game data.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use xsys_shared::fs::MAX_GAME_FILE_BYTES;
use xsys_shared::{EngineVariant, names};

use super::{has_system3_marker, read_host_file, sorted_tracks};
use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::loader::{GameSource, LoadContext};
use crate::registry::DataEntry;
use crate::track::{TrackCache, TrackData, TrackHandle};

/// Where a loose file's content comes from.
#[derive(Debug, Clone)]
pub enum LooseContent {
    Bytes(Vec<u8>),
    /// Read from the host on demand
    Path(PathBuf),
}

/// One user-selected file.
#[derive(Debug, Clone)]
pub struct LooseFile {
    pub name: String,
    pub content: LooseContent,
}

impl LooseFile {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: LooseContent::Bytes(bytes.into()),
        }
    }

    /// File backed by a host path, named after its last component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            content: LooseContent::Path(path),
        }
    }

    /// Regular files directly inside `dir`, sorted by name.
    pub async fn from_dir(dir: &Path) -> Result<Vec<LooseFile>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(LooseFile::from_path(entry.path()));
            }
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn read(&self) -> Result<Vec<u8>> {
        match &self.content {
            LooseContent::Bytes(bytes) => Ok(bytes.clone()),
            LooseContent::Path(path) => read_host_file(path, MAX_GAME_FILE_BYTES).await,
        }
    }

    async fn into_bytes(self) -> Result<Vec<u8>> {
        match self.content {
            LooseContent::Bytes(bytes) => Ok(bytes),
            LooseContent::Path(path) => read_host_file(&path, MAX_GAME_FILE_BYTES).await,
        }
    }
}

/// Game data picked file by file.
pub struct LooseSource {
    files: Vec<LooseFile>,
    save_dir: String,
    track_files: HashMap<u32, LooseFile>,
    tracks: TrackCache,
}

impl LooseSource {
    pub fn new(files: Vec<LooseFile>, config: &LoaderConfig) -> Self {
        Self {
            files,
            save_dir: config.system3.default_save_dir.clone(),
            track_files: HashMap::new(),
            tracks: TrackCache::new(config.tracks.strategy),
        }
    }
}

impl GameSource for LooseSource {
    async fn discover(&mut self, ctx: &mut LoadContext<'_>) -> Result<()> {
        if has_system3_marker(self.files.iter().map(|f| f.name.as_str())) {
            ctx.select_variant(EngineVariant::System3);
            ctx.set_save_dir(self.save_dir.clone());
        } else {
            ctx.select_variant(EngineVariant::Xsystem35);
        }

        for file in std::mem::take(&mut self.files) {
            if names::is_track_name(&file.name) {
                match names::parse_track_name(&file.name) {
                    Some(track) => {
                        tracing::debug!(track, file = %file.name, "Recorded CD-DA track");
                        self.track_files.insert(track, file);
                    }
                    None => tracing::warn!(file = %file.name, "Ignoring track with unusable number"),
                }
                continue;
            }
            let name = file.name.clone();
            let bytes = file.into_bytes().await?;
            ctx.register_file(DataEntry::from_bytes(name, bytes))?;
        }
        Ok(())
    }

    async fn track(&self, track: u32) -> Result<TrackHandle> {
        let Some(file) = self.track_files.get(&track) else {
            return Err(LoadError::InvalidTrack(track));
        };
        self.tracks
            .get_or_resolve(track, || async {
                let bytes = file.read().await?;
                Ok::<_, LoadError>(TrackData::new(file.name.clone(), bytes))
            })
            .await
    }

    fn track_numbers(&self) -> Vec<u32> {
        sorted_tracks(&self.track_files)
    }
}
