//! End-to-end loads through the public API.
//!
//! Each test builds a container in memory (or in a temp dir), runs a full
//! load and checks what the runtime would see.

use std::io::{Cursor, Write};

use tempfile::tempdir;

use xsys_core::{
    DirectoryOutput, DiscSource, EngineVariant, LoadError, Loader, LoaderConfig, LooseFile,
    LooseSource, MemoryDisc, MemoryFs, MemoryRegistry, PatchFile, Source, TrackCacheStrategy,
    TrackHandle, TrackLocation, ZipSource,
};

fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_disc_with_root_marker_is_xsystem35() {
    let disc = MemoryDisc::new("")
        .with_file("ADISK.DAT", "marker")
        .with_file("XXXXXG1.ALD", "graphics")
        .with_file("XXXXXM1.ALD", "midi");
    let mut loader = Loader::new(DiscSource::new(disc, &LoaderConfig::default()));
    let mut registry = MemoryRegistry::new();
    let mut vfs = MemoryFs::new();

    let summary = loader.start_load(&mut registry, &mut vfs).await.unwrap();
    assert_eq!(summary.variant, EngineVariant::Xsystem35);
    assert!(summary.has_midi);

    let manifest = vfs.read_to_string("xsystem35.gr").unwrap();
    let lines: Vec<&str> = manifest.lines().collect();
    assert!(lines.contains(&"Graphics1 XXXXXG1.ALD"));
    assert!(lines.contains(&"Midi1 XXXXXM1.ALD"));
    assert_eq!(lines.iter().filter(|l| l.starts_with("Save")).count(), 26);
    assert!(lines.contains(&"SaveA save/XXXXXa.asd"));
    assert_eq!(lines.last(), Some(&"MsgSkip save/XXXXX.msgskip"));
    assert!(manifest.ends_with('\n'));
}

#[tokio::test]
async fn test_loose_files_tracks() {
    let files = vec![
        LooseFile::from_bytes("01.ogg", "first"),
        LooseFile::from_bytes("02.ogg", "second"),
        LooseFile::from_bytes("data.ald", "data"),
    ];
    let mut loader = Loader::new(LooseSource::new(files, &LoaderConfig::default()));
    let summary = loader
        .start_load(&mut MemoryRegistry::new(), &mut MemoryFs::new())
        .await
        .unwrap();
    assert_eq!(summary.variant, EngineVariant::Xsystem35);

    let one = loader.get_cdda(1).await.unwrap();
    assert_eq!(one.read_bytes().unwrap(), b"first");
    assert!(one.locator().ends_with("01.ogg"));
    assert!(TrackHandle::ptr_eq(&one, &loader.get_cdda(1).await.unwrap()));

    let err = loader.get_cdda(3).await.unwrap_err();
    assert!(matches!(err, LoadError::InvalidTrack(3)));
}

#[tokio::test]
async fn test_zip_without_game_data() {
    let zip = zip_of(&[("manual.pdf", b"%PDF"), ("01.wav", b"RIFF")]);
    let mut loader = Loader::new(ZipSource::new(zip, &LoaderConfig::default()));
    let mut registry = MemoryRegistry::new();

    let err = loader
        .start_load(&mut registry, &mut MemoryFs::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::NoGameData));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_patch_overrides_disc_entry() {
    let disc = MemoryDisc::new("")
        .with_file("GAMEDATA/X.DAT", "from disc")
        .with_file("GAMEDATA/GAMESA.ALD", "scenario");
    let source = DiscSource::new(disc, &LoaderConfig::default())
        .with_patches(vec![PatchFile::new("x.dat", "from patch")]);
    let mut loader = Loader::new(source);
    let mut registry = MemoryRegistry::new();

    loader
        .start_load(&mut registry, &mut MemoryFs::new())
        .await
        .unwrap();

    let matching: Vec<_> = registry
        .entries()
        .iter()
        .filter(|e| e.name.eq_ignore_ascii_case("x.dat"))
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].to_bytes(), b"from patch");
}

#[tokio::test]
async fn test_zip_file_on_disk_to_directory() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("game.zip");
    std::fs::write(
        &input,
        zip_of(&[
            ("GAME/KICHIKUSA.ALD", b"scenario"),
            ("GAME/KICHIKUGA.ALD", b"graphics"),
            ("GAME/System39.ain", b"ain"),
            ("BGM/03.ogg", b"vorbis"),
        ]),
    )
    .unwrap();

    let mut config = LoaderConfig::default();
    config.tracks.strategy = TrackCacheStrategy::Disk;
    let source = Source::open(&input, &config).await.unwrap();
    assert_eq!(source.kind(), "zip");

    let out_dir = dir.path().join("out");
    let mut output = DirectoryOutput::create(&out_dir).unwrap();
    let mut loader = Loader::new(source);

    let mut registry = MemoryRegistry::new();
    let summary = loader.start_load(&mut registry, &mut output).await.unwrap();
    assert_eq!(summary.file_count, 3);
    assert_eq!(summary.track_count, 1);

    let manifest = std::fs::read_to_string(out_dir.join("xsystem35.gr")).unwrap();
    assert!(manifest.starts_with("ScenarioA KICHIKUSA.ALD\nGraphicsA KICHIKUGA.ALD\nAin System39.ain\n"));
    assert!(manifest.contains("SaveZ save/KICHIKUz.asd\n"));

    let track = loader.get_cdda(3).await.unwrap();
    let TrackLocation::File(path) = track.location() else {
        panic!("disk strategy should spill tracks to files");
    };
    assert_eq!(std::fs::read(path).unwrap(), b"vorbis");
}
