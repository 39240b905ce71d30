//! Widget filter requests
//!
//! A [`SensorFilterRequest`] is what a dashboard widget sends when it needs
//! data: which sensors, over which range, and what the client already holds.
//!
//! ## JSON Shape
//!
//! ```json
//! {
//!   "category": "multi",
//!   "groups": [
//!     { "key": "deviceA", "filters": [ { "headNumber": 1, "sensorNames": ["Temp"] } ] }
//!   ],
//!   "range": { "unit": "sample", "magnitude": 10, "referenceTime": 1700000000000 },
//!   "requestType": "full"
//! }
//! ```
//!
//! Groups are an ordered list rather than a map: declaration order decides
//! which sensor a single-value widget shows.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_HEAD_NUMBER;
use crate::errors::{TelemetryError, TelemetryResult};
use crate::model::metadata::MergeStrategy;
use crate::model::sample::canonical_sensor_name;
use crate::time::Timestamp;

/// Kind of dashboard widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetCategory {
    /// One summary value per refresh
    Single,
    /// One or more time series
    Multi,
}

/// What the client expects from this request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestType {
    /// First load, client holds nothing
    Full,
    /// Refresh on top of data the client already holds
    Incremental,
    /// Recorded data replayed with noise for demos
    SyntheticDemo,
}

/// Unit of a [`DataRange`] magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeUnit {
    /// Number of base sample periods
    Sample,
    /// Seconds of wall-clock time
    Second,
    /// Minutes of wall-clock time
    Minute,
    /// Hours of wall-clock time
    Hour,
    /// Days of wall-clock time
    Day,
    /// Explicit `[from, reference_time)` bounds
    Custom,
}

/// Requested data range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRange {
    /// Unit of `magnitude`
    pub unit: RangeUnit,
    /// Amount of `unit` reaching back from the reference time
    #[serde(default)]
    pub magnitude: u64,
    /// Upper bound of the window; the clock's `now()` when absent
    #[serde(default)]
    pub reference_time: Option<Timestamp>,
    /// Lower bound for [`RangeUnit::Custom`]
    #[serde(default)]
    pub from: Option<Timestamp>,
}

impl DataRange {
    /// The last `count` samples before `reference_time`
    pub fn samples(count: u64, reference_time: Timestamp) -> Self {
        Self {
            unit: RangeUnit::Sample,
            magnitude: count,
            reference_time: Some(reference_time),
            from: None,
        }
    }

    /// A wall-clock duration before `reference_time`
    pub fn duration(unit: RangeUnit, magnitude: u64, reference_time: Timestamp) -> Self {
        Self {
            unit,
            magnitude,
            reference_time: Some(reference_time),
            from: None,
        }
    }

    /// Explicit `[from, to)` bounds
    pub fn custom(from: Timestamp, to: Timestamp) -> Self {
        Self {
            unit: RangeUnit::Custom,
            magnitude: 0,
            reference_time: Some(to),
            from: Some(from),
        }
    }
}

/// Sensors selected on one head (or on the machine itself)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorFilter {
    /// Head number; `0` selects machine-level variables
    #[serde(default)]
    pub head_number: u32,
    /// Internal sensor names, in display order
    pub sensor_names: Vec<String>,
}

impl SensorFilter {
    /// Filter over `sensor_names` on `head_number`
    pub fn new<S: Into<String>>(head_number: u32, sensor_names: impl IntoIterator<Item = S>) -> Self {
        Self {
            head_number,
            sensor_names: sensor_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether samples live in a head folder rather than plain variables
    pub fn is_head_mounted(&self) -> bool {
        self.head_number > 0
    }

    /// Canonical name of one of this filter's sensors
    pub fn canonical_name(&self, sensor: &str) -> String {
        if self.is_head_mounted() {
            canonical_sensor_name(self.head_number, sensor)
        } else {
            sensor.to_string()
        }
    }
}

/// One data source (collection) and the filters applied to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorGroup {
    /// Collection key in the document store
    pub key: String,
    /// Per-head filters, in declaration order
    pub filters: Vec<SensorFilter>,
}

impl SensorGroup {
    /// Group `key` with `filters`
    pub fn new(key: impl Into<String>, filters: Vec<SensorFilter>) -> Self {
        Self { key: key.into(), filters }
    }
}

/// Cross-sensor aggregation for multi widgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerticalAggregation {
    /// Name given to the aggregated series
    pub label: String,
    /// How per-sensor values in a bucket are combined
    pub strategy: MergeStrategy,
}

/// Bucket times the client reported holding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationHints {
    /// First bucket time already cached (inclusive)
    #[serde(default)]
    pub cache_from: Option<Timestamp>,
    /// Last bucket time already cached (inclusive)
    #[serde(default)]
    pub cache_to: Option<Timestamp>,
    /// Newest bucket time delivered so far
    #[serde(default)]
    pub last_seen_time: Option<Timestamp>,
}

/// Everything a widget asks for in one refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorFilterRequest {
    /// Widget kind
    pub category: WidgetCategory,
    /// Sensor groups in declaration order
    pub groups: Vec<SensorGroup>,
    /// Requested range
    pub range: DataRange,
    /// Full, incremental or demo
    pub request_type: RequestType,
    /// Optional cross-sensor aggregation (multi widgets only)
    #[serde(default)]
    pub aggregation: Option<VerticalAggregation>,
    /// What the client already holds
    #[serde(default)]
    pub hints: PaginationHints,
}

impl SensorFilterRequest {
    /// Request without aggregation or pagination hints
    pub fn new(
        category: WidgetCategory,
        groups: Vec<SensorGroup>,
        range: DataRange,
        request_type: RequestType,
    ) -> Self {
        Self {
            category,
            groups,
            range,
            request_type,
            aggregation: None,
            hints: PaginationHints::default(),
        }
    }

    /// Attach a cross-sensor aggregation
    pub fn with_aggregation(mut self, label: impl Into<String>, strategy: MergeStrategy) -> Self {
        self.aggregation = Some(VerticalAggregation { label: label.into(), strategy });
        self
    }

    /// Attach pagination hints
    pub fn with_hints(mut self, hints: PaginationHints) -> Self {
        self.hints = hints;
        self
    }

    /// Iterate `(group, filter)` pairs in declaration order
    pub fn filter_pairs(&self) -> impl Iterator<Item = (&SensorGroup, &SensorFilter)> {
        self.groups
            .iter()
            .flat_map(|group| group.filters.iter().map(move |filter| (group, filter)))
    }

    /// Reject malformed selections before any I/O
    pub fn validate(&self) -> TelemetryResult<()> {
        if self.groups.is_empty() {
            return Err(TelemetryError::invalid_filter("at least one sensor group is required"));
        }

        for group in &self.groups {
            if group.key.is_empty() {
                return Err(TelemetryError::invalid_filter("sensor group key is empty"));
            }
            if group.filters.is_empty() {
                return Err(TelemetryError::invalid_filter(format!(
                    "sensor group '{}' has no filters",
                    group.key
                )));
            }
            for filter in &group.filters {
                if filter.sensor_names.is_empty() {
                    return Err(TelemetryError::invalid_filter(format!(
                        "filter for head {} in group '{}' names no sensors",
                        filter.head_number, group.key
                    )));
                }
                if filter.head_number > MAX_HEAD_NUMBER {
                    return Err(TelemetryError::invalid_filter(format!(
                        "head number {} exceeds {}",
                        filter.head_number, MAX_HEAD_NUMBER
                    )));
                }
            }
        }

        if self.range.unit == RangeUnit::Custom {
            match (self.range.from, self.range.reference_time) {
                (Some(from), Some(to)) if from > to => {
                    return Err(TelemetryError::invalid_filter(format!(
                        "inverted time window [{}, {})",
                        from, to
                    )));
                }
                (None, _) => {
                    return Err(TelemetryError::invalid_filter("custom range requires 'from'"));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
