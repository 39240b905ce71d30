//! Horizontal binning
//!
//! Same-sensor samples that fall into the same bucket are merged with the
//! sensor's strategy. Thresholds are never applied here; they are display
//! metadata only.

use std::collections::BTreeMap;

use log::debug;

use crate::errors::TelemetryResult;
use crate::model::{MergeStrategy, SensorSample};
use crate::pipeline::grouper::SensorSeries;
use crate::pipeline::planner::TimeWindow;
use crate::time::Timestamp;

/// One merged value per bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinnedPoint {
    /// Bucket start
    pub time: Timestamp,
    /// Merged value
    pub value: f64,
}

/// A sensor's bucketed series, ascending by bucket time
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedSeries {
    /// Canonical sensor name
    pub name: String,
    /// Merge strategy used
    pub strategy: MergeStrategy,
    /// Points, one per non-empty bucket
    pub points: Vec<BinnedPoint>,
}

/// Merge `samples` bucket by bucket
///
/// Samples outside the window are ignored. Values keep arrival order inside
/// a bucket, which matters for the majority tie-break.
pub fn bin_samples(
    samples: &[SensorSample],
    strategy: MergeStrategy,
    window: &TimeWindow,
) -> TelemetryResult<Vec<BinnedPoint>> {
    let mut buckets: BTreeMap<Timestamp, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        if let Some(start) = window.bucket_start(sample.time) {
            buckets.entry(start).or_default().push(sample.value);
        }
    }

    buckets
        .into_iter()
        .map(|(time, values)| {
            Ok(BinnedPoint {
                time,
                value: strategy.merge(&values)?,
            })
        })
        .collect()
}

/// Bin every series; series left without points are kept, empty
pub fn bin_all(series: &[SensorSeries], window: &TimeWindow) -> TelemetryResult<Vec<BinnedSeries>> {
    let binned = series
        .iter()
        .map(|s| {
            Ok(BinnedSeries {
                name: s.name.clone(),
                strategy: s.strategy,
                points: bin_samples(&s.samples, s.strategy, window)?,
            })
        })
        .collect::<TelemetryResult<Vec<_>>>()?;

    debug!(
        "binned {} sensors into {} points",
        binned.len(),
        binned.iter().map(|s| s.points.len()).sum::<usize>()
    );
    Ok(binned)
}
