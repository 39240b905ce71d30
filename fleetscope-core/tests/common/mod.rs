//! Common test utilities for pipeline integration tests
//!
//! This module provides:
//! - `ScriptedSource`: an in-memory sample source that records every call
//! - Sample generators for evenly spaced series
//! - Request and metadata fixtures

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use fleetscope_core::errors::SourceError;
use fleetscope_core::traits::{FetchedSamples, ProbeQuery, SampleQuery, SampleSelector, SampleSource};
use fleetscope_core::{
    DataRange, MergeStrategy, RawSampleGroup, RequestType, SensorFilter, SensorFilterRequest,
    SensorGroup, SensorMetadata, SensorSample, WidgetCategory,
};

/// Reference time used by most scenarios (2023-11-14T22:13:20Z)
pub const REFERENCE_TIME: i64 = 1_700_000_000_000;

/// In-memory source keyed by (group, head, sensor)
///
/// Head `0` holds machine-level variables.
#[derive(Default)]
pub struct ScriptedSource {
    samples: HashMap<(String, u32, String), Vec<SensorSample>>,
    failing_groups: Vec<String>,
    delay: Option<Duration>,
    fetch_calls: Mutex<Vec<String>>,
    probe_calls: Mutex<Vec<ProbeQuery>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add samples of `sensor` on `head` in `group`
    pub fn with_samples(mut self, group: &str, head: u32, sensor: &str, samples: Vec<(i64, f64)>) -> Self {
        let entry = self
            .samples
            .entry((group.to_string(), head, sensor.to_string()))
            .or_default();
        entry.extend(samples.into_iter().map(|(time, value)| SensorSample::new(sensor, value, time)));
        self
    }

    /// Make every query against `group` fail
    pub fn failing(mut self, group: &str) -> Self {
        self.failing_groups.push(group.to_string());
        self
    }

    /// Delay every query
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Group keys fetched, in call order
    pub fn fetched_groups(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, group: &str) -> usize {
        self.fetch_calls.lock().unwrap().iter().filter(|g| *g == group).count()
    }

    pub fn probe_calls(&self) -> Vec<ProbeQuery> {
        self.probe_calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn matching(&self, group: &str, selector: &SampleSelector) -> Vec<(u32, String, &Vec<SensorSample>)> {
        let (head, names) = match selector {
            SampleSelector::Folder { head, sensors } => (*head, sensors),
            SampleSelector::Variables { names } => (0, names),
        };
        names
            .iter()
            .filter_map(|name| {
                self.samples
                    .get(&(group.to_string(), head, name.clone()))
                    .map(|samples| (head, name.clone(), samples))
            })
            .collect()
    }

    async fn enter(&self, group: &str) -> Result<(), SourceError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing_groups.iter().any(|g| g == group) {
            return Err(format!("collection '{}' unavailable", group).into());
        }
        Ok(())
    }
}

#[async_trait]
impl SampleSource for ScriptedSource {
    async fn fetch(&self, query: &SampleQuery) -> Result<FetchedSamples, SourceError> {
        self.fetch_calls.lock().unwrap().push(query.group_key.clone());
        self.enter(&query.group_key).await?;

        let mut fetched = FetchedSamples::default();
        let mut folder = Vec::new();
        for (head, name, samples) in self.matching(&query.group_key, &query.selector) {
            let mut in_window: Vec<SensorSample> = samples
                .iter()
                .filter(|s| s.time >= query.min_time && s.time < query.max_time)
                .cloned()
                .collect();
            if in_window.len() > query.limit_per_sensor {
                in_window.sort_by_key(|s| s.time);
                in_window.drain(..in_window.len() - query.limit_per_sensor);
                fetched.truncated = true;
            }
            if in_window.is_empty() {
                continue;
            }
            if head == 0 {
                fetched.groups.push(RawSampleGroup::Variable { name, samples: in_window });
            } else {
                folder.extend(in_window);
            }
        }
        if let SampleSelector::Folder { head, .. } = query.selector {
            if !folder.is_empty() {
                fetched.groups.push(RawSampleGroup::Folder { head, samples: folder });
            }
        }
        Ok(fetched)
    }

    async fn exists_before(&self, query: &ProbeQuery) -> Result<bool, SourceError> {
        self.probe_calls.lock().unwrap().push(query.clone());
        self.enter(&query.group_key).await?;

        Ok(self
            .matching(&query.group_key, &query.selector)
            .iter()
            .any(|(_, _, samples)| samples.iter().any(|s| s.time < query.before)))
    }
}

/// `count` samples evenly spaced over `[start, end)`
pub fn evenly_spaced(start: i64, end: i64, count: usize, value: impl Fn(usize) -> f64) -> Vec<(i64, f64)> {
    let span = end - start;
    (0..count)
        .map(|i| (start + span * i as i64 / count as i64, value(i)))
        .collect()
}

/// Metadata for the sensors used across scenarios
pub fn metadata() -> Vec<SensorMetadata> {
    vec![
        SensorMetadata::new("printer", "Temp", MergeStrategy::Avg).with_thresholds(Some(0.0), Some(80.0)),
        SensorMetadata::new("printer", "Pressure", MergeStrategy::Max),
        SensorMetadata::new("printer", "Counter", MergeStrategy::Sum),
        SensorMetadata::new("printer", "OperationState", MergeStrategy::Majority),
        SensorMetadata::new("printer", "Alarm", MergeStrategy::Max).head_mounted(),
        SensorMetadata::new("printer", "ProductionSpeed", MergeStrategy::Avg),
    ]
}

/// Request over `groups` for the last `count` samples before [`REFERENCE_TIME`]
pub fn request(
    category: WidgetCategory,
    groups: Vec<(&str, Vec<SensorFilter>)>,
    count: u64,
    request_type: RequestType,
) -> SensorFilterRequest {
    SensorFilterRequest::new(
        category,
        groups
            .into_iter()
            .map(|(key, filters)| SensorGroup::new(key, filters))
            .collect(),
        DataRange::samples(count, REFERENCE_TIME),
        request_type,
    )
}
