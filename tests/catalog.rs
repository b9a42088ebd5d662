//! End-to-end catalog behaviour against a file-backed store.

use gadget::storage::{backup, schema};
use gadget::{CatalogPaths, CatalogStore, Error, ImageDetails, ImageSummary, IngestRecord};
use serde_json::json;
use tempfile::TempDir;

const LONG_ID: &str = "sha256:abc123456789abcdef0123456789abcdef0123456789abcdef0123456789ab";

fn paths(dir: &TempDir) -> CatalogPaths {
    CatalogPaths::new(dir.path().join("catalog"), "gadget.db")
}

fn app_image() -> (ImageSummary, ImageDetails) {
    let record: IngestRecord = serde_json::from_value(json!({
        "summary": {
            "Id": LONG_ID,
            "Created": 1_700_000_000_000_000_000i64,
            "Size": 10_485_760,
            "VirtualSize": 20_971_520,
            "RepoTags": ["app:1.0", "app:latest"],
            "Labels": {"env": "prod"}
        },
        "details": {
            "Id": LONG_ID,
            "ContainerConfig": {"Volumes": {"/data": {}}}
        }
    }))
    .unwrap();
    (record.summary, record.details)
}

#[test]
fn open_creates_directory_and_file() {
    let dir = TempDir::new().unwrap();
    let paths = paths(&dir);
    assert!(!paths.directory.exists());

    let store = CatalogStore::open(&paths).unwrap();
    assert_eq!(store.path(), Some(paths.database_path().as_path()));
    store.close().unwrap();

    assert!(paths.directory.is_dir());
    assert!(paths.database_path().is_file());
}

#[test]
fn open_fails_when_directory_cannot_be_created() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let paths = CatalogPaths::new(blocker.join("nested"), "gadget.db");
    let result = CatalogStore::open(&paths);
    assert!(matches!(result, Err(Error::StorageUnavailable { .. })));
}

#[test]
fn ingest_and_query_scenario() {
    let dir = TempDir::new().unwrap();
    let paths = paths(&dir);
    let store = CatalogStore::open(&paths).unwrap();
    assert!(store.rebuild_schema().is_empty());

    let (summary, details) = app_image();
    store.put(&summary, &details).unwrap();

    let by_tag = store.find_by_tag("app:1.0").unwrap();
    assert_eq!(by_tag.long_id, LONG_ID);

    let by_label = store.get_images_by_label("env").unwrap();
    assert_eq!(by_label.len(), 1);
    assert_eq!(by_label[0].long_id, LONG_ID);

    assert!(store.get_images_by_label("missing").unwrap().is_empty());

    let image = store.find_by_long_id(LONG_ID).unwrap();
    assert_eq!(image.short_id, "abc123456789");
    assert_eq!(image.size, "10M");
    assert_eq!(image.virtual_size, "20M");
    assert_eq!(image.tag_names(), ["app:1.0", "app:latest"]);
    assert_eq!(image.labels[0].key, "env");
    assert_eq!(image.labels[0].value, "prod");
    assert_eq!(image.volumes[0].volume, "/data");

    let stored_summary: ImageSummary = serde_json::from_str(&image.blob.summary).unwrap();
    assert_eq!(stored_summary, summary);
    let stored_details: ImageDetails = serde_json::from_str(&image.blob.details).unwrap();
    assert_eq!(stored_details, details);

    assert!(store.exists("abc123456789").unwrap());
    assert!(!store.exists(LONG_ID).unwrap());

    store.close().unwrap();
}

#[test]
fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let paths = paths(&dir);

    let store = CatalogStore::open(&paths).unwrap();
    store.rebuild_schema();
    let (summary, details) = app_image();
    store.put(&summary, &details).unwrap();
    store.close().unwrap();

    let store = CatalogStore::open(&paths).unwrap();
    assert_eq!(store.get_all().unwrap().len(), 1);
    assert_eq!(store.get("abc123456789").unwrap().long_id, LONG_ID);
    store.close().unwrap();
}

#[test]
fn rebuild_twice_leaves_empty_queryable_schema() {
    let dir = TempDir::new().unwrap();
    let store = CatalogStore::open(&paths(&dir)).unwrap();
    let (summary, details) = app_image();

    store.rebuild_schema();
    store.put(&summary, &details).unwrap();

    for _ in 0..2 {
        assert!(store.rebuild_schema().is_empty());
        for table in schema::TABLES {
            assert!(store.has_table(table.name).unwrap());
        }
        assert!(store.get_all().unwrap().is_empty());
        assert!(!store.exists("abc123456789").unwrap());
        assert!(store.get_images_with_labels().unwrap().is_empty());
        assert!(store.get_images_with_volumes().unwrap().is_empty());
    }

    store.close().unwrap();
}

#[test]
fn backup_requires_directory() {
    let dir = TempDir::new().unwrap();
    let paths = paths(&dir);

    assert!(matches!(backup(&paths), Err(Error::PathNotFound(_))));
    assert!(!paths.backup_path().exists());
    assert!(!paths.directory.exists());
}

#[test]
fn backup_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let paths = paths(&dir);

    let store = CatalogStore::open(&paths).unwrap();
    store.rebuild_schema();
    let (summary, details) = app_image();
    store.put(&summary, &details).unwrap();
    store.close().unwrap();

    let target = backup(&paths).unwrap();
    assert_eq!(target, paths.backup_path());
    assert_eq!(
        std::fs::read(paths.database_path()).unwrap(),
        std::fs::read(&target).unwrap()
    );

    let copy = CatalogStore::open(&CatalogPaths::new(&paths.directory, "gadget.db.bkp")).unwrap();
    assert_eq!(copy.find_by_tag("app:latest").unwrap().long_id, LONG_ID);
    copy.close().unwrap();
}
