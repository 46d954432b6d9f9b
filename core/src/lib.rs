//! xsys core - game-data loader for System3 and Xsystem35
//!
//! Turns a disc image, a loose file set, a zip file or another archive into
//! named data files for the runtime, a synthesized resource manifest and a
//! lazily resolved CD-DA track lookup.
//!
//! # Architecture
//!
//! - [`Source`] - One of the supported containers, behind [`GameSource`]
//! - [`Loader`] - Runs discovery once and answers track queries afterwards
//! - [`manifest`] - `xsystem35.gr` synthesis from registered file names
//! - [`TrackCache`] - Memoized per-track resolution
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use xsys_core::{Loader, LoaderConfig, MemoryFs, MemoryRegistry, Source};
//!
//! # async fn run() -> xsys_core::Result<()> {
//! let config = LoaderConfig::default();
//! let source = Source::open(Path::new("game.zip"), &config).await?;
//! let mut loader = Loader::new(source);
//!
//! let mut registry = MemoryRegistry::new();
//! let mut vfs = MemoryFs::new();
//! let summary = loader.start_load(&mut registry, &mut vfs).await?;
//! println!("{} files for {}", summary.file_count, summary.module);
//!
//! let bgm = loader.get_cdda(2).await?;
//! println!("track 2 at {}", bgm.locator());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod disc;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod source;
pub mod track;

pub use archive::{ArchiveEntry, ArchiveExtractor, ExtractorRegistry, LhaExtractor, ZipExtractor};
pub use config::{ConfigError, LoaderConfig, TrackCacheStrategy};
pub use disc::{DirEntry, DiscFilesystem, MemoryDisc};
pub use error::{LoadError, Result};
pub use loader::{GameSource, LoadContext, LoadEvent, LoadState, LoadSummary, Loader};
pub use manifest::Manifest;
pub use registry::{DataEntry, DirectoryOutput, FileRegistry, MemoryFs, MemoryRegistry, VirtualFs};
pub use source::{
    ArchiveSource, DiscSource, LooseContent, LooseFile, LooseSource, PatchFile, Source, ZipSource,
};
pub use track::{TrackCache, TrackData, TrackHandle, TrackLocation};

pub use xsys_shared::{EngineVariant, GAME_FORMAT};
