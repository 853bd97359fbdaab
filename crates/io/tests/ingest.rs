// File-based ingestion: CSV presets into the catalog, zip listings.
// Run with: cargo test -p presetlab-io --test ingest

use std::fs;
use std::io::{Cursor, Write};

use presetlab_engine::{NamespaceStore, PresetCatalog, PresetController};
use presetlab_config::PresetConfig;
use presetlab_io::{ArchiveIngestor, IngestError, TabularIngestor};
use serde_json::json;

fn zip_bytes(names: &[&str]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for name in names {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"x").unwrap();
    }
    writer.finish().unwrap().into_inner()
}

// ---------------------------------------------------------------------------
// Tabular
// ---------------------------------------------------------------------------

#[test]
fn row_without_whitening_column_has_no_whitening_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.csv");
    fs::write(
        &path,
        "Name,SkinSoftening,TeethWhitening\nSoft,0.8\nBright,0.2,0.9\n",
    )
    .unwrap();

    let mut catalog = PresetCatalog::new();
    let mut errors = Vec::new();
    let appended = smol::block_on(TabularIngestor::default().ingest_path(
        &path,
        &mut catalog,
        |e| errors.push(e),
    ));

    assert_eq!(appended, 2);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    let soft = catalog.find("Soft").unwrap();
    assert!(soft.namespaces().get("teeth").is_none());
    assert_eq!(soft.namespaces().get("skin").unwrap()["softening"]["strength"], json!(0.8));

    let bright = catalog.find("Bright").unwrap();
    assert_eq!(bright.namespaces().get("teeth").unwrap()["whitening"]["strength"], json!(0.9));
}

#[test]
fn missing_file_reports_one_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut catalog = PresetCatalog::new();
    let mut errors = Vec::new();

    let appended = smol::block_on(TabularIngestor::default().ingest_path(
        dir.path().join("absent.csv"),
        &mut catalog,
        |e| errors.push(e),
    ));

    assert_eq!(appended, 0);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], IngestError::Io { .. }));
    assert!(catalog.is_empty());
}

#[test]
fn windows_1252_semicolon_export_is_ingested() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("excel.csv");
    // "Rosé" in Windows-1252
    let mut bytes = b"Name;LipsColor\nRos".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b";0.9 0.4 0.5 1\n");
    fs::write(&path, bytes).unwrap();

    let mut catalog = PresetCatalog::new();
    let appended = smol::block_on(TabularIngestor::default().ingest_path(
        &path,
        &mut catalog,
        |e| panic!("unexpected error: {e}"),
    ));

    assert_eq!(appended, 1);
    assert_eq!(catalog.get(0).unwrap().name(), "Rosé");
}

#[test]
fn ingested_preset_applies_and_reverts() {
    let config = PresetConfig::default();
    let mut store = NamespaceStore::from_baselines(config.baselines()).unwrap();
    let mut catalog = PresetCatalog::new();
    TabularIngestor::from_config(&config).ingest_text(
        "Name,EyesFlare,EyelashesEnabled\nSparkle,0.7,true\n",
        &mut catalog,
        |e| panic!("unexpected error: {e}"),
    );

    let mut ctl = PresetController::new();
    ctl.apply_by_name(&mut store, &catalog, "Sparkle").unwrap();
    assert_eq!(store.snapshot()["eyes"]["flare"]["strength"], json!(0.7));
    assert_eq!(store.snapshot()["eyes"]["eyelashes"]["enabled"], json!(true));

    ctl.reset_active(&mut store);
    assert_eq!(
        store.snapshot()["eyes"],
        json!({"whitening": {"strength": 0.0}, "flare": {"strength": 0.0}, "eyelashes": {"enabled": false}})
    );
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

#[test]
fn corrupt_archive_keeps_previous_listing() {
    smol::block_on(async {
        let mut ingestor = ArchiveIngestor::new();
        let mut errors = Vec::new();

        assert!(ingestor.load(zip_bytes(&["one.png", "two.png"]), |e| errors.push(e)).await);

        let mut corrupt = zip_bytes(&["three.png"]);
        corrupt.truncate(corrupt.len() / 2);
        assert!(!ingestor.load(corrupt, |e| errors.push(e)).await);

        assert_eq!(ingestor.entries(), ["one.png".to_string(), "two.png".to_string()]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], IngestError::Archive(_)));
    });
}

#[test]
fn load_path_lists_archive_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frames.zip");
    fs::write(&path, zip_bytes(&["f/001.png", "f/002.png", "notes.md"])).unwrap();

    smol::block_on(async {
        let mut ingestor = ArchiveIngestor::new();
        assert!(ingestor.load_path(&path, |e| panic!("{e}")).await);
        assert_eq!(ingestor.entries().len(), 3);
        assert_eq!(ingestor.images(), vec!["f/001.png", "f/002.png"]);
    });
}
