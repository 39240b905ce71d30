//! Vertical aggregation for multi-series widgets
//!
//! Every sensor's binned series is laid on the shared bucket timeline.
//! Buckets a sensor has no data for stay absent; nothing is zero-filled.

use std::collections::BTreeMap;

use crate::errors::TelemetryResult;
use crate::model::{SensorSample, VerticalAggregation};
use crate::pipeline::binner::BinnedSeries;
use crate::time::Timestamp;

/// Flatten or aggregate `series` across sensors
///
/// Without an aggregation every `(bucket, sensor)` pair becomes one sample,
/// ordered by bucket time and then by sensor insertion order. With one,
/// each bucket collapses into a single sample named after the label.
pub fn aggregate(
    series: &[BinnedSeries],
    aggregation: Option<&VerticalAggregation>,
) -> TelemetryResult<Vec<SensorSample>> {
    // bucket time -> (sensor position, value), sensors in insertion order
    let mut timeline: BTreeMap<Timestamp, Vec<(usize, f64)>> = BTreeMap::new();
    for (position, s) in series.iter().enumerate() {
        for point in &s.points {
            timeline.entry(point.time).or_default().push((position, point.value));
        }
    }

    match aggregation {
        None => Ok(timeline
            .into_iter()
            .flat_map(|(time, values)| {
                values
                    .into_iter()
                    .map(move |(position, value)| SensorSample::new(series[position].name.clone(), value, time))
            })
            .collect()),
        Some(aggregation) => timeline
            .into_iter()
            .map(|(time, values)| {
                let values: Vec<f64> = values.into_iter().map(|(_, value)| value).collect();
                let merged = aggregation.strategy.merge(&values)?;
                Ok(SensorSample::new(aggregation.label.clone(), merged, time))
            })
            .collect(),
    }
}
