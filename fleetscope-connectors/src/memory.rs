//! In-memory document store
//!
//! Holds collections of [`StoredDocument`]s behind a lock and serves them
//! through [`SampleSource`]. Used for fixtures, demos and tests, and as the
//! reference for the query contract other connectors follow.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use log::{debug, info};

use fleetscope_core::errors::SourceError;
use fleetscope_core::traits::{FetchedSamples, ProbeQuery, SampleQuery, SampleSelector, SampleSource};
use fleetscope_core::{RawSampleGroup, SensorSample};

use crate::document::{StoreDump, StoredDocument};
use crate::{ConnectorError, ConnectorResult, StoreStats};

/// Document store kept in memory
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
    strict: bool,
    stats: Mutex<StoreStats>,
}

impl MemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            strict: false,
            stats: Mutex::new(StoreStats::default()),
        }
    }

    /// Fail queries against unknown collections instead of returning nothing
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Add a document to `collection`, creating the collection if needed
    pub fn insert(&self, collection: &str, document: StoredDocument) -> ConnectorResult<()> {
        document.validate(collection)?;
        let mut collections = self.collections.write().map_err(|_| ConnectorError::LockPoisoned)?;
        collections.entry(collection.to_string()).or_default().push(document);
        Ok(())
    }

    /// Build a store from a JSON [`StoreDump`]
    pub fn from_json_str(json: &str) -> ConnectorResult<Self> {
        let dump: StoreDump = serde_json::from_str(json)?;
        let store = Self::new();
        let mut count = 0;
        for (collection, documents) in dump.collections {
            for document in documents {
                store.insert(&collection, document)?;
                count += 1;
            }
        }
        debug!("parsed {} documents", count);
        Ok(store)
    }

    /// Build a store from a JSON [`StoreDump`] file
    pub fn load_json_file(path: impl AsRef<Path>) -> ConnectorResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let store = Self::from_json_str(&json)?;
        info!(
            "loaded {} collections from {}",
            store.collection_keys().len(),
            path.display()
        );
        Ok(store)
    }

    /// Serialize every collection
    pub fn to_dump(&self) -> ConnectorResult<StoreDump> {
        let collections = self.collections.read().map_err(|_| ConnectorError::LockPoisoned)?;
        Ok(StoreDump {
            collections: collections
                .iter()
                .map(|(key, documents)| (key.clone(), documents.clone()))
                .collect(),
        })
    }

    /// Collection keys, sorted
    pub fn collection_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .collections
            .read()
            .map(|collections| collections.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Query statistics so far
    pub fn stats(&self) -> StoreStats {
        self.stats.lock().map(|stats| stats.clone()).unwrap_or_default()
    }

    fn query(&self, query: &SampleQuery) -> ConnectorResult<FetchedSamples> {
        self.record(|stats| stats.queries_served += 1);
        let collections = self.collections.read().map_err(|_| ConnectorError::LockPoisoned)?;
        let Some(documents) = collections.get(&query.group_key) else {
            return self.missing(&query.group_key).map(|_| FetchedSamples::default());
        };

        // sensor -> samples, sensors in first-seen order
        let mut order: Vec<String> = Vec::new();
        let mut per_sensor: HashMap<String, Vec<SensorSample>> = HashMap::new();
        for document in documents
            .iter()
            .filter(|d| d.matches(&query.selector) && d.overlaps(query.min_time, query.max_time))
        {
            for sample in &document.samples {
                if sample.time < query.min_time
                    || sample.time >= query.max_time
                    || !document.selects(&query.selector, sample)
                {
                    continue;
                }
                let sensor = document.sensor_of(sample);
                if !per_sensor.contains_key(sensor) {
                    order.push(sensor.to_string());
                }
                per_sensor.entry(sensor.to_string()).or_default().push(sample.clone());
            }
        }

        let mut truncated = false;
        for samples in per_sensor.values_mut() {
            samples.sort_by_key(|s| s.time);
            if samples.len() > query.limit_per_sensor {
                samples.drain(..samples.len() - query.limit_per_sensor);
                truncated = true;
            }
        }

        let groups = match &query.selector {
            SampleSelector::Folder { head, sensors } => {
                let samples: Vec<SensorSample> = sensors
                    .iter()
                    .filter_map(|sensor| per_sensor.remove(sensor))
                    .flatten()
                    .collect();
                if samples.is_empty() {
                    Vec::new()
                } else {
                    vec![RawSampleGroup::Folder { head: *head, samples }]
                }
            }
            SampleSelector::Variables { names } => names
                .iter()
                .filter_map(|name| {
                    per_sensor
                        .remove(name)
                        .map(|samples| RawSampleGroup::Variable { name: name.clone(), samples })
                })
                .collect(),
        };

        let fetched = FetchedSamples { groups, truncated };
        self.record(|stats| {
            stats.samples_returned += fetched.sample_count() as u64;
            if truncated {
                stats.truncated_queries += 1;
            }
        });
        debug!(
            "'{}' served {} samples for {} sensors{}",
            query.group_key,
            fetched.sample_count(),
            order.len(),
            if truncated { " (truncated)" } else { "" }
        );
        Ok(fetched)
    }

    fn probe(&self, query: &ProbeQuery) -> ConnectorResult<bool> {
        self.record(|stats| stats.probes_served += 1);
        let collections = self.collections.read().map_err(|_| ConnectorError::LockPoisoned)?;
        let Some(documents) = collections.get(&query.group_key) else {
            return self.missing(&query.group_key).map(|_| false);
        };

        let found = documents
            .iter()
            .filter(|d| d.matches(&query.selector) && d.first_time < query.before)
            .any(|d| {
                d.samples
                    .iter()
                    .any(|s| s.time < query.before && d.selects(&query.selector, s))
            });
        Ok(found)
    }

    fn record(&self, update: impl FnOnce(&mut StoreStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            update(&mut stats);
        }
    }

    fn missing(&self, collection: &str) -> ConnectorResult<()> {
        if self.strict {
            return Err(ConnectorError::UnknownCollection(collection.to_string()));
        }
        debug!("collection '{}' does not exist, treating as empty", collection);
        Ok(())
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SampleSource for MemoryDocumentStore {
    async fn fetch(&self, query: &SampleQuery) -> Result<FetchedSamples, SourceError> {
        Ok(self.query(query)?)
    }

    async fn exists_before(&self, query: &ProbeQuery) -> Result<bool, SourceError> {
        Ok(self.probe(query)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        store
            .insert(
                "printerA",
                StoredDocument::folder(1, [("Temp", 1_000, 20.0), ("Alarm", 1_500, 0.0), ("Temp", 2_000, 21.0)]),
            )
            .unwrap();
        store
            .insert("printerA", StoredDocument::folder(1, [("Temp", 3_000, 22.0)]))
            .unwrap();
        store
            .insert("printerA", StoredDocument::variable("Pressure", [(1_000, 1.0), (4_000, 1.2)]))
            .unwrap();
        store
    }

    fn sample_query(selector: SampleSelector, min_time: i64, max_time: i64, limit: usize) -> SampleQuery {
        SampleQuery {
            group_key: "printerA".into(),
            selector,
            min_time,
            max_time,
            limit_per_sensor: limit,
        }
    }

    #[tokio::test]
    async fn folder_query_filters_by_sensor_and_window() {
        let store = store();
        let selector = SampleSelector::Folder { head: 1, sensors: vec!["Temp".into()] };

        let fetched = store.fetch(&sample_query(selector, 1_000, 3_000, 100)).await.unwrap();
        assert!(!fetched.truncated);
        match &fetched.groups[..] {
            [RawSampleGroup::Folder { head: 1, samples }] => {
                let times: Vec<i64> = samples.iter().map(|s| s.time).collect();
                assert_eq!(times, [1_000, 2_000]);
                assert!(samples.iter().all(|s| s.name == "Temp"));
            }
            other => panic!("unexpected groups {:?}", other),
        }
    }

    #[tokio::test]
    async fn cap_keeps_newest_samples() {
        let store = store();
        let selector = SampleSelector::Folder { head: 1, sensors: vec!["Temp".into()] };

        let fetched = store.fetch(&sample_query(selector, 0, 10_000, 2)).await.unwrap();
        assert!(fetched.truncated);
        let times: Vec<i64> = fetched.groups[0].samples().iter().map(|s| s.time).collect();
        assert_eq!(times, [2_000, 3_000]);
        assert_eq!(store.stats().truncated_queries, 1);
    }

    #[tokio::test]
    async fn variable_query_returns_one_group_per_name() {
        let store = store();
        let selector = SampleSelector::Variables { names: vec!["Humidity".into(), "Pressure".into()] };

        let fetched = store.fetch(&sample_query(selector, 0, 10_000, 100)).await.unwrap();
        assert_eq!(fetched.groups.len(), 1);
        assert!(matches!(&fetched.groups[0], RawSampleGroup::Variable { name, .. } if name == "Pressure"));
        assert_eq!(fetched.sample_count(), 2);
    }

    #[tokio::test]
    async fn probe_looks_strictly_before_bound() {
        let store = store();
        let probe = |before| ProbeQuery {
            group_key: "printerA".into(),
            selector: SampleSelector::Folder { head: 1, sensors: vec!["Alarm".into()] },
            before,
        };

        assert!(!store.exists_before(&probe(1_500)).await.unwrap());
        assert!(store.exists_before(&probe(1_501)).await.unwrap());
        assert_eq!(store.stats().probes_served, 2);
    }

    #[tokio::test]
    async fn unknown_collections_depend_on_strictness() {
        let query = SampleQuery {
            group_key: "printerZ".into(),
            selector: SampleSelector::Variables { names: vec!["Temp".into()] },
            min_time: 0,
            max_time: 1_000,
            limit_per_sensor: 10,
        };

        let lenient = MemoryDocumentStore::new();
        assert_eq!(lenient.fetch(&query).await.unwrap(), FetchedSamples::default());

        let strict = MemoryDocumentStore::new().strict(true);
        let err = strict.fetch(&query).await.unwrap_err();
        assert!(err.to_string().contains("printerZ"));
    }

    #[test]
    fn invalid_documents_are_refused() {
        let store = MemoryDocumentStore::new();
        let mut document = StoredDocument::variable("Temp", [(1_000, 1.0)]);
        document.last_time = 500;
        assert!(store.insert("printerA", document).is_err());
        assert!(store.collection_keys().is_empty());
    }
}
