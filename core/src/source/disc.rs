//! Disc image source.

use std::sync::Arc;

use xsys_shared::{EngineVariant, GAME_FORMAT, names};

use crate::config::LoaderConfig;
use crate::disc::{DirEntry, DiscFilesystem};
use crate::error::{LoadError, Result};
use crate::loader::{GameSource, LoadContext, LoadEvent};
use crate::registry::DataEntry;
use crate::track::{TrackCache, TrackData, TrackHandle};

/// Fallback save labels checked when the disc has no volume label.
const SAVE_LABEL_MARKERS: &[(&str, &str)] = &[("AGAME.DAT", "agame"), ("DPS.DAT", "dps")];

/// A file that replaces the same-named disc entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl PatchFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Game data on a mounted disc image.
pub struct DiscSource {
    disc: Arc<dyn DiscFilesystem>,
    patches: Vec<PatchFile>,
    default_save_dir: String,
    tracks: TrackCache,
}

impl DiscSource {
    pub fn new(disc: impl DiscFilesystem + 'static, config: &LoaderConfig) -> Self {
        Self {
            disc: Arc::new(disc),
            patches: Vec::new(),
            default_save_dir: config.system3.default_save_dir.clone(),
            tracks: TrackCache::new(config.tracks.strategy),
        }
    }

    /// Files registered after the disc contents, overriding same-named entries.
    pub fn with_patches(mut self, patches: Vec<PatchFile>) -> Self {
        self.patches = patches;
        self
    }

    /// First root entry that is, or contains, the game data.
    fn find_game_dir(&self, root: &DirEntry) -> Result<Option<DirEntry>> {
        for entry in self.disc.read_dir(root)? {
            if entry.is_directory {
                if entry.name.to_ascii_lowercase() == GAME_FORMAT.game_dir_name
                    || self
                        .disc
                        .get_dir_ent(GAME_FORMAT.game_dir_marker, &entry)?
                        .is_some()
                {
                    return Ok(Some(entry));
                }
            } else if names::eq_ignore_case(&entry.name, GAME_FORMAT.game_dir_marker) {
                return Ok(Some(root.clone()));
            }
        }
        Ok(None)
    }

    fn system3_save_dir(&self, game_dir: &DirEntry, ctx: &mut LoadContext<'_>) -> Result<String> {
        let label = sanitize_label(&self.disc.volume_label());
        if !label.is_empty() {
            return Ok(format!("save/{}", label));
        }

        for (marker, label) in SAVE_LABEL_MARKERS {
            if self.disc.get_dir_ent(marker, game_dir)?.is_some() {
                return Ok(format!("save/{}", label));
            }
        }

        let save_dir = self.default_save_dir.clone();
        ctx.emit(LoadEvent::SaveDirFallback {
            save_dir: save_dir.clone(),
        });
        Ok(save_dir)
    }

    fn is_patched(&self, name: &str) -> bool {
        self.patches
            .iter()
            .any(|p| names::eq_ignore_case(&p.name, name))
    }
}

/// Turns a volume label into a directory name.
fn sanitize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn keep_entry(variant: EngineVariant, name: &str) -> bool {
    let ext = names::extension_lower(name);
    match variant {
        EngineVariant::System3 => ext.as_deref() == Some(GAME_FORMAT.system3_data_ext),
        EngineVariant::Xsystem35 => {
            !names::is_dotfile(name) && !ext.is_some_and(|e| GAME_FORMAT.is_excluded_ext(&e))
        }
    }
}

impl GameSource for DiscSource {
    async fn discover(&mut self, ctx: &mut LoadContext<'_>) -> Result<()> {
        let root = self.disc.root_dir();
        let game_dir = self.find_game_dir(&root)?.ok_or(LoadError::NoGameData)?;
        tracing::info!(dir = %game_dir.name, label = %self.disc.volume_label(), "Found game directory");

        let variant = if self
            .disc
            .get_dir_ent(GAME_FORMAT.system3_marker, &game_dir)?
            .is_some()
        {
            EngineVariant::System3
        } else {
            EngineVariant::Xsystem35
        };
        ctx.select_variant(variant);
        if variant == EngineVariant::System3 {
            let save_dir = self.system3_save_dir(&game_dir, ctx)?;
            ctx.set_save_dir(save_dir);
        }

        for entry in self.disc.read_dir(&game_dir)? {
            if entry.is_directory {
                continue;
            }
            if self.is_patched(&entry.name) {
                tracing::debug!(file = %entry.name, "Skipping patched disc entry");
                continue;
            }
            if !keep_entry(variant, &entry.name) {
                tracing::debug!(file = %entry.name, "Skipping disc entry");
                continue;
            }
            let chunks = self.disc.read_file(&entry)?;
            ctx.register_file(DataEntry::from_chunks(entry.name, chunks))?;
        }

        for patch in std::mem::take(&mut self.patches) {
            tracing::debug!(file = %patch.name, "Applying patch file");
            ctx.register_file(DataEntry::from_bytes(patch.name, patch.data))?;
        }
        Ok(())
    }

    async fn track(&self, track: u32) -> Result<TrackHandle> {
        self.tracks
            .get_or_resolve(track, || async {
                let disc = Arc::clone(&self.disc);
                let audio = tokio::task::spawn_blocking(move || disc.read_audio_track(track))
                    .await
                    .map_err(std::io::Error::other)??;
                match audio {
                    Some(bytes) => Ok(TrackData::new(format!("track{:02}.wav", track), bytes)),
                    None => Err(LoadError::InvalidTrack(track)),
                }
            })
            .await
    }

    fn track_numbers(&self) -> Vec<u32> {
        self.disc.audio_tracks()
    }
}
