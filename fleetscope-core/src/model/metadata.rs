//! Sensor metadata and merge strategies
//!
//! Metadata comes from the catalog collaborator. The merge strategy is
//! resolved into [`MergeStrategy`] when the metadata is built, so bucket
//! reduction never interprets strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{TelemetryError, TelemetryResult};

/// How several values in one bucket collapse into one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Arithmetic mean
    Avg,
    /// Smallest value
    Min,
    /// Largest value
    Max,
    /// Sum of values
    Sum,
    /// Most frequent value; ties go to the value seen first
    Majority,
}

impl MergeStrategy {
    /// All strategies, in catalog order
    pub const ALL: [MergeStrategy; 5] = [Self::Avg, Self::Min, Self::Max, Self::Sum, Self::Majority];

    /// Catalog spelling of the strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
            Self::Majority => "majority",
        }
    }

    /// Reduce `values` (in arrival order) to one value
    pub fn merge(&self, values: &[f64]) -> TelemetryResult<f64> {
        if values.is_empty() {
            return Err(TelemetryError::AggregationFailure {
                reason: "cannot merge an empty bucket",
            });
        }

        let merged = match self {
            Self::Avg => values.iter().sum::<f64>() / values.len() as f64,
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Sum => values.iter().sum(),
            Self::Majority => majority(values),
        };
        Ok(merged)
    }
}

/// Most frequent value, first-seen wins ties
fn majority(values: &[f64]) -> f64 {
    // (bit pattern, value, count) in first-seen order
    let mut tally: Vec<(u64, f64, usize)> = Vec::new();
    for &value in values {
        let key = normalized_bits(value);
        match tally.iter_mut().find(|(bits, _, _)| *bits == key) {
            Some(entry) => entry.2 += 1,
            None => tally.push((key, value, 1)),
        }
    }

    let mut best = tally[0];
    for entry in &tally[1..] {
        if entry.2 > best.2 {
            best = *entry;
        }
    }
    best.1
}

/// `-0.0` and `0.0` count as the same value
fn normalized_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avg" | "average" | "mean" => Ok(Self::Avg),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "sum" => Ok(Self::Sum),
            "majority" | "mode" => Ok(Self::Majority),
            other => Err(format!("unknown merge strategy '{}'", other)),
        }
    }
}

/// Display thresholds; never applied to values by the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Lower bound shown on charts
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper bound shown on charts
    #[serde(default)]
    pub max: Option<f64>,
}

/// Catalog entry for one sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorMetadata {
    /// Machinery category the entry belongs to
    pub category: String,
    /// Internal (un-prefixed) sensor name
    pub internal_name: String,
    /// Bucket merge strategy
    pub strategy: MergeStrategy,
    /// Display thresholds
    #[serde(default)]
    pub thresholds: Option<Thresholds>,
    /// Whether the sensor is mounted once per head
    #[serde(default)]
    pub head_mounted: bool,
}

impl SensorMetadata {
    /// Entry without thresholds
    pub fn new(
        category: impl Into<String>,
        internal_name: impl Into<String>,
        strategy: MergeStrategy,
    ) -> Self {
        Self {
            category: category.into(),
            internal_name: internal_name.into(),
            strategy,
            thresholds: None,
            head_mounted: false,
        }
    }

    /// Mark the sensor as head-mounted
    pub fn head_mounted(mut self) -> Self {
        self.head_mounted = true;
        self
    }

    /// Attach display thresholds
    pub fn with_thresholds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.thresholds = Some(Thresholds { min, max });
        self
    }
}
