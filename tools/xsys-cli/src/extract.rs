//! Extract command - materialize a load in a host directory

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use xsys_core::{DirectoryOutput, GameSource, Loader, LoaderConfig, Source};

/// Arguments for the extract command
#[derive(Args)]
pub struct ExtractArgs {
    /// Game directory, zip file or archive
    pub input: PathBuf,

    /// Output directory (created if missing)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also write every CD-DA track into `<output>/cdda`
    #[arg(long)]
    pub tracks: bool,
}

/// Execute the extract command
pub async fn execute(args: ExtractArgs, config: &LoaderConfig) -> Result<()> {
    let mut loader = crate::open_loader(&args.input, config).await?;

    let mut data = DirectoryOutput::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    // Manifest paths share the same root as the data files
    let mut vfs = DirectoryOutput::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let summary = loader
        .start_load(&mut data, &mut vfs)
        .await
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    println!(
        "Wrote {} files for {} to {}",
        data.written(),
        summary.module,
        args.output.display()
    );

    if args.tracks {
        let written = write_tracks(&loader, &args.output.join("cdda")).await?;
        println!("Wrote {} CD-DA tracks", written);
    }

    Ok(())
}

async fn write_tracks(loader: &Loader<Source>, dir: &Path) -> Result<usize> {
    let numbers = loader.source().track_numbers();
    if numbers.is_empty() {
        return Ok(0);
    }
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    for &number in &numbers {
        let track = loader
            .get_cdda(number)
            .await
            .with_context(|| format!("Failed to resolve track {}", number))?;
        let bytes = track
            .read_bytes()
            .with_context(|| format!("Failed to read track {}", number))?;
        let ext = track
            .locator()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "wav".to_string());
        let path = dir.join(format!("{:02}.{}", number, ext));
        std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(track = number, path = %path.display(), "Wrote track");
    }
    Ok(numbers.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xsys_core::LooseFile;

    #[tokio::test]
    async fn extract_writes_data_manifest_and_tracks() {
        let input = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("GAMESA.ALD"), b"scenario").unwrap();
        std::fs::write(input.path().join("02.ogg"), b"vorbis").unwrap();
        let output = tempfile::tempdir().unwrap();

        let args = ExtractArgs {
            input: input.path().to_path_buf(),
            output: output.path().join("game"),
            tracks: true,
        };
        execute(args, &LoaderConfig::default()).await.unwrap();

        let root = output.path().join("game");
        assert_eq!(std::fs::read(root.join("GAMESA.ALD")).unwrap(), b"scenario");
        let manifest = std::fs::read_to_string(root.join("xsystem35.gr")).unwrap();
        assert!(manifest.starts_with("ScenarioA GAMESA.ALD\n"));
        assert_eq!(std::fs::read(root.join("cdda/02.ogg")).unwrap(), b"vorbis");
    }

    #[tokio::test]
    async fn no_tracks_writes_nothing() {
        let output = tempfile::tempdir().unwrap();
        let source = Source::Loose(xsys_core::LooseSource::new(
            vec![LooseFile::from_bytes("AGAME.DAT", "a")],
            &LoaderConfig::default(),
        ));
        let mut loader = Loader::new(source);
        loader
            .start_load(
                &mut xsys_core::MemoryRegistry::new(),
                &mut xsys_core::MemoryFs::new(),
            )
            .await
            .unwrap();

        let written = write_tracks(&loader, &output.path().join("cdda")).await.unwrap();
        assert_eq!(written, 0);
        assert!(!output.path().join("cdda").exists());
    }
}
