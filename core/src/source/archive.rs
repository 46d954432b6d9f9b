//! Generic archive source.
//!
//! The archive is extracted in one go on a worker thread. Numbered audio
//! entries are kept in memory as tracks; everything else is registered.

use std::sync::Arc;

use hashbrown::HashMap;
use xsys_shared::{EngineVariant, names};

use super::{has_system3_marker, sorted_tracks, worker};
use crate::archive::{ArchiveExtractor, ExtractorRegistry};
use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::loader::{GameSource, LoadContext};
use crate::registry::DataEntry;
use crate::track::{TrackCache, TrackData, TrackHandle};

/// Game data inside an archive of any supported format.
pub struct ArchiveSource {
    input: Option<(Vec<u8>, Option<Box<dyn ArchiveExtractor>>)>,
    track_data: HashMap<u32, TrackData>,
    tracks: TrackCache,
}

impl ArchiveSource {
    /// Source whose format is detected from the archive bytes at discovery.
    pub fn new(archive: Vec<u8>, config: &LoaderConfig) -> Self {
        Self::build(archive, None, config)
    }

    /// Source that extracts with a known extractor.
    pub fn with_extractor(
        archive: Vec<u8>,
        extractor: Box<dyn ArchiveExtractor>,
        config: &LoaderConfig,
    ) -> Self {
        Self::build(archive, Some(extractor), config)
    }

    fn build(
        archive: Vec<u8>,
        extractor: Option<Box<dyn ArchiveExtractor>>,
        config: &LoaderConfig,
    ) -> Self {
        Self {
            input: Some((archive, extractor)),
            track_data: HashMap::new(),
            tracks: TrackCache::new(config.tracks.strategy),
        }
    }
}

impl GameSource for ArchiveSource {
    async fn discover(&mut self, ctx: &mut LoadContext<'_>) -> Result<()> {
        let (archive, extractor) = self.input.take().ok_or(LoadError::AlreadyLoaded)?;
        let extractor = match extractor {
            Some(extractor) => extractor,
            None => ExtractorRegistry::with_builtin()
                .take(&archive)
                .ok_or_else(|| LoadError::extraction("unrecognized archive format"))?,
        };

        let entries = worker::extract(archive, extractor).await?;
        tracing::debug!(entries = entries.len(), "Archive extracted");

        ctx.select_variant(
            if has_system3_marker(entries.iter().map(|e| e.name.as_str())) {
                EngineVariant::System3
            } else {
                EngineVariant::Xsystem35
            },
        );

        for entry in entries {
            let name = names::base_name(&entry.name).to_string();
            if names::is_track_name(&name) {
                match names::parse_track_name(&name) {
                    Some(track) => {
                        tracing::debug!(track, entry = %entry.name, "Recorded CD-DA track");
                        self.track_data.insert(track, TrackData::new(name, entry.data));
                    }
                    None => tracing::warn!(entry = %entry.name, "Ignoring track with unusable number"),
                }
                continue;
            }
            ctx.register_file(DataEntry::from_bytes(name, entry.data))?;
        }
        Ok(())
    }

    async fn track(&self, track: u32) -> Result<TrackHandle> {
        let Some(data) = self.track_data.get(&track) else {
            return Err(LoadError::InvalidTrack(track));
        };
        self.tracks
            .get_or_resolve(track, || async {
                Ok::<_, LoadError>(TrackData {
                    file_name: data.file_name.clone(),
                    bytes: Arc::clone(&data.bytes),
                })
            })
            .await
    }

    fn track_numbers(&self) -> Vec<u32> {
        sorted_tracks(&self.track_data)
    }
}
