//! End-to-end tests: document store + catalog + pipeline
//!
//! A store dump is written to disk, loaded back, and queried through the
//! pipeline with metadata resolved from the built-in catalog.

use std::io::Write;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

use fleetscope_catalog::SensorCatalog;
use fleetscope_connectors::{MemoryDocumentStore, StoreDump, StoredDocument};
use fleetscope_core::time::FixedTime;
use fleetscope_core::{
    DataRange, PipelineConfig, RequestType, SensorDataResponse, SensorFilter, SensorFilterRequest,
    SensorGroup, TelemetryPipeline, WidgetCategory,
};

const NOW: i64 = 1_700_000_000_000;

/// Printer fleet: two machines, head 1 folder on `printerA` only
fn fleet_dump() -> StoreDump {
    let mut dump = StoreDump::default();

    let temp: Vec<(i64, f64)> = (0..15)
        .map(|i| (NOW - 10_000 + 10_000 * i / 15, 20.0 + (i % 3) as f64))
        .collect();
    let head_one: Vec<(&str, i64, f64)> = (0..10)
        .flat_map(|i| {
            let time = NOW - 10_000 + 1_000 * i;
            [("Alarm", time, (i % 2) as f64), ("InkLevel", time + 500, 90.0 - i as f64)]
        })
        .collect();

    dump.collections.insert(
        "printerA".into(),
        vec![
            StoredDocument::variable("Temp", temp[..8].to_vec()),
            StoredDocument::variable("Temp", temp[8..].to_vec()),
            StoredDocument::folder(1, head_one),
        ],
    );
    dump.collections.insert(
        "printerB".into(),
        vec![StoredDocument::variable("Temp", [(NOW - 2_500, 30.0), (NOW - 600_000, 29.0)])],
    );
    dump
}

fn load_store() -> Arc<MemoryDocumentStore> {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let json = serde_json::to_string(&fleet_dump()).unwrap();
    file.write_all(json.as_bytes()).unwrap();

    Arc::new(MemoryDocumentStore::load_json_file(file.path()).unwrap())
}

async fn query(
    store: &Arc<MemoryDocumentStore>,
    catalog: &SensorCatalog,
    request: &SensorFilterRequest,
) -> SensorDataResponse {
    let metadata = catalog.resolve_for("printer", request).unwrap();
    let pipeline = TelemetryPipeline::new(Arc::clone(store), FixedTime::new(NOW), PipelineConfig::default());
    let mut rng = StdRng::seed_from_u64(5);

    pipeline
        .compute_sensor_data_response(request, &metadata, &mut rng, &CancellationToken::new())
        .await
        .unwrap()
}

fn catalog() -> SensorCatalog {
    let catalog = SensorCatalog::new();
    catalog.load_defaults().unwrap();
    catalog
}

#[tokio::test]
async fn dump_survives_the_file_round() {
    let store = load_store();
    assert_eq!(store.collection_keys(), ["printerA", "printerB"]);
    assert_eq!(store.to_dump().unwrap(), fleet_dump());
}

#[tokio::test]
async fn temperature_resamples_to_ten_buckets() {
    let store = load_store();
    let request = SensorFilterRequest::new(
        WidgetCategory::Multi,
        vec![SensorGroup::new("printerA", vec![SensorFilter::new(0, ["Temp"])])],
        DataRange::samples(10, NOW),
        RequestType::Full,
    );

    let response = query(&store, &catalog(), &request).await;

    assert_eq!(response.total_count(), 10);
    assert!(response.is_last_batch());
    assert!(response.display_data().iter().all(|s| s.name == "Temp"));
    assert_eq!(store.stats().probes_served, 1);
}

#[tokio::test]
async fn head_folder_sensors_are_prefixed_and_merged() {
    let store = load_store();
    let request = SensorFilterRequest::new(
        WidgetCategory::Multi,
        vec![SensorGroup::new("printerA", vec![SensorFilter::new(1, ["Alarm", "InkLevel"])])],
        DataRange::samples(5, NOW),
        RequestType::Full,
    );

    let response = query(&store, &catalog(), &request).await;

    // five buckets, both sensors in each, ordered by time then sensor
    assert_eq!(response.total_count(), 10);
    let first: Vec<(&str, f64)> = response.display_data()[..2]
        .iter()
        .map(|s| (s.name.as_str(), s.value))
        .collect();
    assert_eq!(first, [("H01_Alarm", 1.0), ("H01_InkLevel", 85.0)]);
    assert!(!response.is_last_batch());
}

#[tokio::test]
async fn single_widget_uses_first_machine_with_data() {
    let store = load_store();
    let request = SensorFilterRequest::new(
        WidgetCategory::Single,
        vec![
            SensorGroup::new("printerC", vec![SensorFilter::new(0, ["Temp"])]),
            SensorGroup::new("printerB", vec![SensorFilter::new(0, ["Temp"])]),
            SensorGroup::new("printerA", vec![SensorFilter::new(0, ["Temp"])]),
        ],
        DataRange::samples(5, NOW),
        RequestType::Full,
    );

    let response = query(&store, &catalog(), &request).await;

    assert_eq!(response.total_count(), 1);
    assert_eq!(response.display_data()[0].value, 30.0);
    // printerA was never queried
    assert_eq!(store.stats().queries_served, 2);
    // printerB has a sample ten minutes back
    assert!(!response.is_last_batch());
}

#[tokio::test]
async fn uncatalogued_sensors_are_dropped() {
    let store = load_store();
    let request = SensorFilterRequest::new(
        WidgetCategory::Multi,
        vec![SensorGroup::new("printerA", vec![SensorFilter::new(0, ["Temp", "Vibration"])])],
        DataRange::samples(10, NOW),
        RequestType::Full,
    );

    let response = query(&store, &catalog(), &request).await;
    assert!(response.all_samples().all(|s| s.name == "Temp"));
    assert_eq!(response.total_count(), 10);
}
