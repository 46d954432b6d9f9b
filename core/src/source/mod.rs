//! Container-specific game sources.
//!
//! Each source finds the game data in one kind of container, picks the
//! engine variant and resolves CD-DA tracks its own way. [`Source`] is the
//! closed set of them, and [`Source::open`] picks one for a host path.

mod archive;
mod disc;
mod loose;
mod worker;
mod zip;

pub use self::archive::ArchiveSource;
pub use self::disc::{DiscSource, PatchFile};
pub use self::loose::{LooseContent, LooseFile, LooseSource};
pub use self::zip::ZipSource;

use std::path::Path;

use xsys_shared::fs::{MAX_CONTAINER_BYTES, ensure_within_limit};
use xsys_shared::{GAME_FORMAT, names};

use crate::archive::{ArchiveExtractor, ExtractorRegistry, ZipExtractor};
use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::loader::{GameSource, LoadContext};
use crate::track::TrackHandle;

/// Any supported game source.
pub enum Source {
    Disc(DiscSource),
    Loose(LooseSource),
    Zip(ZipSource),
    Archive(ArchiveSource),
}

impl Source {
    /// Opens a host path as a game source.
    ///
    /// Directories become loose file sets (top-level regular files only).
    /// Files are sniffed: zip magic or a `.zip` extension selects the zip
    /// source, any other archive format the extraction worker.
    pub async fn open(path: &Path, config: &LoaderConfig) -> Result<Source> {
        let metadata = tokio::fs::metadata(path).await?;

        if metadata.is_dir() {
            let files = LooseFile::from_dir(path).await?;
            tracing::info!(path = %path.display(), files = files.len(), "Opened directory");
            return Ok(Source::Loose(LooseSource::new(files, config)));
        }

        let bytes = read_host_file(path, MAX_CONTAINER_BYTES).await?;
        let zip_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

        if zip_ext || ZipExtractor.can_extract(&bytes) {
            tracing::info!(path = %path.display(), "Opened zip archive");
            return Ok(Source::Zip(ZipSource::new(bytes, config)));
        }

        match ExtractorRegistry::with_builtin().take(&bytes) {
            Some(extractor) => {
                tracing::info!(path = %path.display(), format = extractor.format(), "Opened archive");
                Ok(Source::Archive(ArchiveSource::with_extractor(
                    bytes, extractor, config,
                )))
            }
            None => Err(LoadError::UnsupportedInput(path.to_path_buf())),
        }
    }

    /// Short name of the container kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Disc(_) => "disc",
            Source::Loose(_) => "loose",
            Source::Zip(_) => "zip",
            Source::Archive(_) => "archive",
        }
    }
}

impl GameSource for Source {
    async fn discover(&mut self, ctx: &mut LoadContext<'_>) -> Result<()> {
        match self {
            Source::Disc(source) => source.discover(ctx).await,
            Source::Loose(source) => source.discover(ctx).await,
            Source::Zip(source) => source.discover(ctx).await,
            Source::Archive(source) => source.discover(ctx).await,
        }
    }

    async fn track(&self, track: u32) -> Result<TrackHandle> {
        match self {
            Source::Disc(source) => source.track(track).await,
            Source::Loose(source) => source.track(track).await,
            Source::Zip(source) => source.track(track).await,
            Source::Archive(source) => source.track(track).await,
        }
    }

    fn track_numbers(&self) -> Vec<u32> {
        match self {
            Source::Disc(source) => source.track_numbers(),
            Source::Loose(source) => source.track_numbers(),
            Source::Zip(source) => source.track_numbers(),
            Source::Archive(source) => source.track_numbers(),
        }
    }
}

/// Reads a host file, refusing anything larger than `max_bytes`.
pub(crate) async fn read_host_file(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(path).await?;
    ensure_within_limit(path, metadata.len(), max_bytes)?;
    Ok(tokio::fs::read(path).await?)
}

/// Whether any of `names` is the System3 marker executable.
pub(crate) fn has_system3_marker<'a>(mut entry_names: impl Iterator<Item = &'a str>) -> bool {
    entry_names.any(|name| names::eq_ignore_case(names::base_name(name), GAME_FORMAT.system3_marker))
}

/// Whether `name` carries a game-data extension.
pub(crate) fn is_game_data(name: &str) -> bool {
    names::extension_lower(name).is_some_and(|ext| GAME_FORMAT.is_data_ext(&ext))
}

/// Sorted track numbers of a track table.
pub(crate) fn sorted_tracks<V>(tracks: &hashbrown::HashMap<u32, V>) -> Vec<u32> {
    let mut numbers: Vec<u32> = tracks.keys().copied().collect();
    numbers.sort_unstable();
    numbers
}
