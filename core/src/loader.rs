//! Discovery orchestration.
//!
//! A [`Loader`] drives one [`GameSource`] through discovery exactly once,
//! then synthesizes the resource manifest for Xsystem35 data. Sources only
//! talk to the runtime through the [`LoadContext`] they are handed, which
//! owns the variant choice and the ordered list of registered names the
//! manifest is built from.

use xsys_shared::{EngineVariant, GAME_FORMAT};

use crate::error::{LoadError, Result};
use crate::manifest;
use crate::registry::{DataEntry, FileRegistry, VirtualFs};
use crate::track::TrackHandle;

/// Per-container discovery and track lookup.
#[allow(async_fn_in_trait)]
pub trait GameSource {
    /// Locates the game data, selects the engine variant and registers
    /// every data file through `ctx`.
    async fn discover(&mut self, ctx: &mut LoadContext<'_>) -> Result<()>;

    /// Resolves CD-DA track `track`, memoized per index.
    async fn track(&self, track: u32) -> Result<TrackHandle>;

    /// Track numbers known after discovery, ascending.
    fn track_numbers(&self) -> Vec<u32>;
}

/// Diagnostics raised during a load that did not abort it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// The System3 save directory could not be derived from the container.
    SaveDirFallback { save_dir: String },
    /// A resource archive was left out of the manifest.
    UnknownResource { file: String },
}

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub variant: EngineVariant,
    /// Runtime module to bootstrap
    pub module: &'static str,
    /// Number of registered data files
    pub file_count: usize,
    pub has_midi: bool,
    /// System3 save directory
    pub save_dir: Option<String>,
    pub track_count: usize,
}

/// Lifecycle of a [`Loader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loaded(LoadSummary),
    Failed,
}

/// Registration bookkeeping shared by every source during discovery.
pub struct LoadContext<'a> {
    registry: &'a mut dyn FileRegistry,
    variant: Option<EngineVariant>,
    file_names: Vec<String>,
    save_dir: Option<String>,
    events: Vec<LoadEvent>,
    file_count: usize,
}

impl<'a> LoadContext<'a> {
    pub(crate) fn new(registry: &'a mut dyn FileRegistry) -> Self {
        Self {
            registry,
            variant: None,
            file_names: Vec::new(),
            save_dir: None,
            events: Vec::new(),
            file_count: 0,
        }
    }

    /// Fixes the engine variant. The first selection sticks.
    pub fn select_variant(&mut self, variant: EngineVariant) {
        match self.variant {
            None => {
                tracing::info!(variant = %variant, "Selected engine variant");
                self.variant = Some(variant);
            }
            Some(current) if current != variant => {
                tracing::warn!(current = %current, requested = %variant, "Engine variant already selected");
            }
            Some(_) => {}
        }
    }

    pub fn variant(&self) -> Option<EngineVariant> {
        self.variant
    }

    pub fn set_save_dir(&mut self, save_dir: impl Into<String>) {
        let save_dir = save_dir.into();
        tracing::debug!(save_dir = %save_dir, "System3 save directory");
        self.save_dir = Some(save_dir);
    }

    /// Hands `entry` to the runtime registry.
    ///
    /// Xsystem35 names are also kept, in order, for manifest synthesis.
    pub fn register_file(&mut self, entry: DataEntry) -> Result<()> {
        tracing::debug!(file = %entry.name, size = entry.size, "Registering file");
        let name = (self.variant == Some(EngineVariant::Xsystem35)).then(|| entry.name.clone());
        self.registry.register(entry)?;
        if let Some(name) = name {
            self.file_names.push(name);
        }
        self.file_count += 1;
        Ok(())
    }

    pub fn emit(&mut self, event: LoadEvent) {
        tracing::warn!(event = ?event, "Load diagnostic");
        self.events.push(event);
    }

    /// Names accumulated for the manifest, in registration order.
    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }
}

/// Runs discovery for one source and answers track queries afterwards.
pub struct Loader<S> {
    source: S,
    state: LoadState,
    events: Vec<LoadEvent>,
}

impl<S: GameSource> Loader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: LoadState::Unloaded,
            events: Vec::new(),
        }
    }

    /// Discovers the game data, registering files into `registry` and
    /// writing the manifest into `vfs`.
    ///
    /// Runs at most once; any later call fails with
    /// [`LoadError::AlreadyLoaded`], including after a failed load.
    pub async fn start_load(
        &mut self,
        registry: &mut dyn FileRegistry,
        vfs: &mut dyn VirtualFs,
    ) -> Result<LoadSummary> {
        if self.state != LoadState::Unloaded {
            return Err(LoadError::AlreadyLoaded);
        }

        match self.run(registry, vfs).await {
            Ok(summary) => {
                tracing::info!(
                    variant = %summary.variant,
                    files = summary.file_count,
                    tracks = summary.track_count,
                    midi = summary.has_midi,
                    "Discovery complete"
                );
                self.state = LoadState::Loaded(summary.clone());
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(error = %e, "Discovery failed");
                self.state = LoadState::Failed;
                Err(e)
            }
        }
    }

    async fn run(
        &mut self,
        registry: &mut dyn FileRegistry,
        vfs: &mut dyn VirtualFs,
    ) -> Result<LoadSummary> {
        let mut ctx = LoadContext::new(registry);
        let outcome = Self::discover_and_write(&mut self.source, &mut ctx, vfs).await;
        // Diagnostics survive a failed load
        self.events = std::mem::take(&mut ctx.events);
        let (variant, has_midi) = outcome?;

        Ok(LoadSummary {
            variant,
            module: variant.module_name(),
            file_count: ctx.file_count,
            has_midi,
            save_dir: ctx.save_dir,
            track_count: self.source.track_numbers().len(),
        })
    }

    /// Discovery plus manifest output. Returns the variant and MIDI presence.
    async fn discover_and_write(
        source: &mut S,
        ctx: &mut LoadContext<'_>,
        vfs: &mut dyn VirtualFs,
    ) -> Result<(EngineVariant, bool)> {
        source.discover(ctx).await?;
        let variant = ctx.variant.ok_or(LoadError::NoGameData)?;
        if !variant.needs_manifest() {
            return Ok((variant, false));
        }

        let manifest = manifest::synthesize(&ctx.file_names);
        for file in &manifest.skipped {
            ctx.emit(LoadEvent::UnknownResource { file: file.clone() });
        }
        vfs.write_file(GAME_FORMAT.manifest_file, manifest.to_text().as_bytes())?;
        tracing::info!(
            lines = manifest.lines.len(),
            basename = %manifest.basename,
            "Wrote {}",
            GAME_FORMAT.manifest_file
        );
        Ok((variant, manifest.has_midi))
    }

    /// Playable handle for CD-DA track `track`.
    pub async fn get_cdda(&self, track: u32) -> Result<TrackHandle> {
        if !matches!(self.state, LoadState::Loaded(_)) {
            return Err(LoadError::NotLoaded);
        }
        self.source.track(track).await
    }

    /// Whether the loaded data includes a MIDI archive.
    pub fn has_midi(&self) -> bool {
        matches!(&self.state, LoadState::Loaded(summary) if summary.has_midi)
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn summary(&self) -> Option<&LoadSummary> {
        match &self.state {
            LoadState::Loaded(summary) => Some(summary),
            _ => None,
        }
    }

    /// Diagnostics collected during the load.
    pub fn events(&self) -> &[LoadEvent] {
        &self.events
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
