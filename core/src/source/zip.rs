//! Zip archive source.
//!
//! Data entries are extracted during discovery; numbered audio entries stay
//! compressed until a track is first requested.

use hashbrown::HashMap;
use xsys_shared::{EngineVariant, names};

use super::{has_system3_marker, is_game_data, sorted_tracks};
use crate::archive::{ArchiveExtractor, ZipExtractor};
use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::loader::{GameSource, LoadContext};
use crate::registry::DataEntry;
use crate::track::{TrackCache, TrackData, TrackHandle};

/// Game data inside a zip file.
pub struct ZipSource {
    archive: Vec<u8>,
    /// Track number to entry name
    track_entries: HashMap<u32, String>,
    tracks: TrackCache,
}

impl ZipSource {
    pub fn new(archive: Vec<u8>, config: &LoaderConfig) -> Self {
        Self {
            archive,
            track_entries: HashMap::new(),
            tracks: TrackCache::new(config.tracks.strategy),
        }
    }
}

impl GameSource for ZipSource {
    async fn discover(&mut self, ctx: &mut LoadContext<'_>) -> Result<()> {
        let entries = ZipExtractor.list_entries(&self.archive)?;
        let data: Vec<&String> = entries.iter().filter(|name| is_game_data(name)).collect();
        if data.is_empty() {
            return Err(LoadError::NoGameData);
        }

        ctx.select_variant(if has_system3_marker(entries.iter().map(String::as_str)) {
            EngineVariant::System3
        } else {
            EngineVariant::Xsystem35
        });

        for name in &entries {
            if !names::is_track_name(name) {
                continue;
            }
            match names::parse_track_name(name) {
                Some(track) => {
                    tracing::debug!(track, entry = %name, "Recorded CD-DA track");
                    self.track_entries.insert(track, name.clone());
                }
                None => tracing::warn!(entry = %name, "Ignoring track with unusable number"),
            }
        }

        for name in data {
            let bytes = ZipExtractor.extract_one(&self.archive, name)?;
            ctx.register_file(DataEntry::from_bytes(names::base_name(name), bytes))?;
        }
        Ok(())
    }

    async fn track(&self, track: u32) -> Result<TrackHandle> {
        let Some(entry) = self.track_entries.get(&track) else {
            return Err(LoadError::InvalidTrack(track));
        };
        self.tracks
            .get_or_resolve(track, || async {
                let bytes = ZipExtractor.extract_one(&self.archive, entry)?;
                Ok::<_, LoadError>(TrackData::new(names::base_name(entry), bytes))
            })
            .await
    }

    fn track_numbers(&self) -> Vec<u32> {
        sorted_tracks(&self.track_entries)
    }
}
