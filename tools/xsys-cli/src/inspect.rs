//! Inspect command - run discovery in memory and report the result

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use xsys_core::{GameSource, LoadEvent, LoaderConfig, MemoryFs, MemoryRegistry};
use xsys_shared::GAME_FORMAT;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Game directory, zip file or archive
    pub input: PathBuf,

    /// Do not print the synthesized manifest
    #[arg(long)]
    pub no_manifest: bool,
}

/// Execute the inspect command
pub async fn execute(args: InspectArgs, config: &LoaderConfig) -> Result<()> {
    let mut loader = crate::open_loader(&args.input, config).await?;
    let mut registry = MemoryRegistry::new();
    let mut vfs = MemoryFs::new();

    let summary = loader
        .start_load(&mut registry, &mut vfs)
        .await
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    println!("=== {} ===", args.input.display());
    println!("  Engine:   {}", summary.variant);
    println!("  Module:   {}", summary.module);
    println!("  Files:    {}", summary.file_count);
    println!("  MIDI:     {}", if summary.has_midi { "yes" } else { "no" });
    if let Some(save_dir) = &summary.save_dir {
        println!("  Save dir: {}", save_dir);
    }

    let tracks = loader.source().track_numbers();
    if tracks.is_empty() {
        println!("  Tracks:   none");
    } else {
        let list: Vec<String> = tracks.iter().map(u32::to_string).collect();
        println!("  Tracks:   {}", list.join(", "));
    }

    println!();
    println!("Files:");
    for entry in registry.entries() {
        println!("  {:<24} {:>10} bytes", entry.name, entry.size);
    }

    for event in loader.events() {
        match event {
            LoadEvent::SaveDirFallback { save_dir } => {
                println!("warning: no volume label, saving to {}", save_dir)
            }
            LoadEvent::UnknownResource { file } => {
                println!("warning: {} left out of the manifest", file)
            }
        }
    }

    if !args.no_manifest {
        if let Some(manifest) = vfs.read_to_string(GAME_FORMAT.manifest_file) {
            println!();
            println!("{}:", GAME_FORMAT.manifest_file);
            print!("{}", manifest);
        }
    }

    Ok(())
}
