//! Catalog file loading tests

use std::io::Write;

use fleetscope_catalog::{CatalogError, SensorCatalog};
use fleetscope_core::MergeStrategy;

const DEPLOYMENT_CATALOG: &str = r#"{
    "entries": [
        { "category": "printer", "internalName": "Temp", "strategy": "max",
          "thresholds": { "min": 5.0, "max": 95.0 } },
        { "category": "labeler", "internalName": "LabelCount", "strategy": "sum" },
        { "category": "labeler", "internalName": "Alarm", "strategy": "max", "headMounted": true }
    ]
}"#;

#[test]
fn file_entries_override_builtins() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DEPLOYMENT_CATALOG.as_bytes()).unwrap();

    let catalog = SensorCatalog::new();
    catalog.load_defaults().unwrap();
    let before = catalog.len();

    assert_eq!(catalog.load_file(file.path()).unwrap(), 3);
    // Temp replaced, two new labeler entries
    assert_eq!(catalog.len(), before + 2);

    let temp = catalog.lookup("printer", "Temp").unwrap();
    assert_eq!(temp.strategy, MergeStrategy::Max);
    assert_eq!(temp.thresholds.unwrap().min, Some(5.0));
    assert_eq!(catalog.sensors_in("labeler").unwrap(), ["LabelCount", "Alarm"]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = SensorCatalog::new();

    assert!(matches!(
        catalog.load_file(dir.path().join("absent.json")),
        Err(CatalogError::Io(_))
    ));
}

#[test]
fn truncated_file_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&DEPLOYMENT_CATALOG.as_bytes()[..40]).unwrap();

    let catalog = SensorCatalog::new();
    assert!(matches!(catalog.load_file(file.path()), Err(CatalogError::Parse(_))));
    assert!(catalog.is_empty());
}
