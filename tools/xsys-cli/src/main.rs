//! xsys CLI - inspect and extract System3 / Xsystem35 game data
//!
//! # Commands
//!
//! - `xsys inspect <input>` - Run discovery and print what the runtime would get
//! - `xsys extract <input> -o <dir>` - Write the data files and `xsystem35.gr` to a directory
//!
//! `<input>` is a directory of loose files, a zip file, or an LHA archive.
//!
//! # Usage
//!
//! ```bash
//! # What is in this archive?
//! xsys inspect kichiku.zip
//!
//! # Unpack it for the runtime, CD-DA tracks included
//! xsys extract kichiku.zip -o ./kichiku --tracks
//! ```
//!
//! Loader settings come from `config.toml` in the platform config directory
//! unless `--config` points elsewhere.

mod extract;
mod inspect;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xsys_core::{Loader, LoaderConfig, Source, config};

/// xsys - game-data loader for System3 and Xsystem35
#[derive(Parser)]
#[command(name = "xsys")]
#[command(about = "Inspect and extract System3 / Xsystem35 game data")]
#[command(version)]
struct Cli {
    /// Loader config file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run discovery and print the summary, files and manifest
    Inspect(inspect::InspectArgs),

    /// Write every data file and the manifest into a directory
    Extract(extract::ExtractArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.command {
        Commands::Inspect(args) => runtime.block_on(inspect::execute(args, &config)),
        Commands::Extract(args) => runtime.block_on(extract::execute(args, &config)),
    }
}

fn load_config(path: Option<&Path>) -> Result<LoaderConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match config::default_config_path() {
            Some(path) => path,
            None => {
                tracing::debug!("No config directory, using defaults");
                return Ok(LoaderConfig::default());
            }
        },
    };
    LoaderConfig::load_or_default(&path)
        .with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Opens `input` and wraps it in a fresh loader.
async fn open_loader(input: &Path, config: &LoaderConfig) -> Result<Loader<Source>> {
    let source = Source::open(input, config)
        .await
        .with_context(|| format!("Failed to open {}", input.display()))?;
    tracing::info!(input = %input.display(), kind = source.kind(), "Opened input");
    Ok(Loader::new(source))
}
