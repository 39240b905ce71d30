//! Sensor resolution and grouping
//!
//! Before fetching, every selected sensor is matched against the supplied
//! metadata; sensors without an entry are dropped with a warning. After
//! fetching, raw sample groups are folded into one ordered series per
//! canonical sensor name, and the preliminary end-of-data signal is decided.

use std::collections::HashMap;

use log::{debug, warn};

use crate::constants::time::EPOCH_ORIGIN_MS;
use crate::errors::TelemetryError;
use crate::model::{
    MergeStrategy, SensorFilter, SensorFilterRequest, SensorMetadata, SensorSample,
    WidgetCategory,
};
use crate::pipeline::fetcher::FetchOutcome;
use crate::pipeline::planner::TimeWindow;
use crate::time::Timestamp;
use crate::traits::SampleSelector;

/// A filter narrowed to sensors with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFilter {
    /// Collection key
    pub group_key: String,
    /// Filter holding only resolvable sensors
    pub filter: SensorFilter,
    /// Merge strategy per entry of `filter.sensor_names`
    pub strategies: Vec<MergeStrategy>,
}

impl ResolvedFilter {
    /// Store selector for this filter
    pub fn selector(&self) -> SampleSelector {
        SampleSelector::for_filter(&self.filter)
    }

    /// Strategy of a canonical sensor name belonging to this filter
    fn strategy_of(&self, canonical: &str) -> Option<MergeStrategy> {
        self.filter
            .sensor_names
            .iter()
            .position(|name| self.filter.canonical_name(name) == canonical)
            .map(|i| self.strategies[i])
    }
}

/// Match the request's sensors against `metadata`
///
/// Filters left without sensors are dropped. Declaration order is kept.
pub fn resolve_sensors(
    request: &SensorFilterRequest,
    metadata: &[SensorMetadata],
) -> Vec<ResolvedFilter> {
    let mut resolved = Vec::new();

    for (group, filter) in request.filter_pairs() {
        let mut names = Vec::with_capacity(filter.sensor_names.len());
        let mut strategies = Vec::with_capacity(filter.sensor_names.len());

        for name in &filter.sensor_names {
            match metadata.iter().find(|m| &m.internal_name == name) {
                Some(entry) => {
                    names.push(name.clone());
                    strategies.push(entry.strategy);
                }
                None => {
                    let err = TelemetryError::MetadataMissing { sensor: name.clone() };
                    warn!("{} in group '{}', sensor excluded", err, group.key);
                }
            }
        }

        if names.is_empty() {
            continue;
        }

        resolved.push(ResolvedFilter {
            group_key: group.key.clone(),
            filter: SensorFilter {
                head_number: filter.head_number,
                sensor_names: names,
            },
            strategies,
        });
    }

    resolved
}

/// Raw samples of one canonical sensor, in fetch order
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSeries {
    /// Canonical sensor name
    pub name: String,
    /// Merge strategy from metadata
    pub strategy: MergeStrategy,
    /// Samples in fetch order (not necessarily time-sorted)
    pub samples: Vec<SensorSample>,
}

/// Tri-state end-of-data signal decided before any probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfData {
    /// No history exists before the fetched data
    True,
    /// History is known to exist
    False,
    /// Only the probe can tell
    Indefinite,
}

/// Output of the grouping stage
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSamples {
    /// Series in insertion order
    pub series: Vec<SensorSeries>,
    /// Earliest raw sample time kept (stored time)
    pub min_sample_time: Option<Timestamp>,
    /// Preliminary end-of-data signal
    pub end_of_data: EndOfData,
}

impl GroupedSamples {
    /// Total raw samples kept
    pub fn sample_count(&self) -> usize {
        self.series.iter().map(|s| s.samples.len()).sum()
    }
}

/// Fold fetched sample groups into per-sensor series
pub fn group(
    request: &SensorFilterRequest,
    resolved: &[ResolvedFilter],
    outcome: FetchOutcome,
    window: &TimeWindow,
) -> GroupedSamples {
    let mut series: Vec<SensorSeries> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut truncated = false;

    let selected = outcome.selected;
    for fetch in outcome.fetches {
        if request.category == WidgetCategory::Single && Some(fetch.filter_index) != selected {
            continue;
        }
        let Some(filter) = resolved.get(fetch.filter_index) else {
            continue;
        };
        truncated |= fetch.samples.truncated;

        for raw in fetch.samples.groups {
            for sample in raw.into_canonical() {
                let Some(strategy) = filter.strategy_of(&sample.name) else {
                    continue;
                };
                let slot = match index.get(&sample.name) {
                    Some(&slot) => slot,
                    None => {
                        index.insert(sample.name.clone(), series.len());
                        series.push(SensorSeries {
                            name: sample.name.clone(),
                            strategy,
                            samples: Vec::new(),
                        });
                        series.len() - 1
                    }
                };
                series[slot].samples.push(sample);
            }
        }
    }

    if request.category == WidgetCategory::Single {
        series = select_single(series, resolved, selected);
    }

    let min_sample_time = series
        .iter()
        .flat_map(|s| s.samples.iter().map(|sample| sample.time))
        .min();

    let end_of_data = preliminary_end_of_data(window, truncated, min_sample_time);

    debug!(
        "grouped {} sensors, earliest sample {:?}, end of data {:?}",
        series.len(),
        min_sample_time,
        end_of_data
    );

    GroupedSamples {
        series,
        min_sample_time,
        end_of_data,
    }
}

/// Keep the first sensor of the selected filter (in filter order) that has data
fn select_single(
    mut series: Vec<SensorSeries>,
    resolved: &[ResolvedFilter],
    selected: Option<usize>,
) -> Vec<SensorSeries> {
    let Some(filter) = selected.and_then(|i| resolved.get(i)) else {
        return Vec::new();
    };

    for name in &filter.filter.sensor_names {
        let canonical = filter.filter.canonical_name(name);
        if let Some(pos) = series
            .iter()
            .position(|s| s.name == canonical && !s.samples.is_empty())
        {
            return vec![series.swap_remove(pos)];
        }
    }
    Vec::new()
}

/// Decide what the fetched data already proves about older history
///
/// | condition (first match wins)                 | result       |
/// |----------------------------------------------|--------------|
/// | window is empty                              | `Indefinite` |
/// | a fetch hit the per-sensor cap               | `False`      |
/// | earliest time considered is at the epoch     | `True`       |
/// | otherwise                                    | `Indefinite` |
pub fn preliminary_end_of_data(
    window: &TimeWindow,
    truncated: bool,
    min_sample_time: Option<Timestamp>,
) -> EndOfData {
    if window.is_empty() {
        return EndOfData::Indefinite;
    }
    if truncated {
        return EndOfData::False;
    }
    if min_sample_time.unwrap_or(window.min_time) <= EPOCH_ORIGIN_MS {
        return EndOfData::True;
    }
    EndOfData::Indefinite
}
