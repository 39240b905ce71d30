//! Single-value widgets

use crate::model::SensorSample;
use crate::pipeline::binner::BinnedSeries;

/// Most recent bucket value of the selected series
///
/// The grouper leaves at most one series for single widgets; any extra
/// series are ignored.
pub fn latest(series: &[BinnedSeries]) -> Vec<SensorSample> {
    series
        .first()
        .and_then(|s| {
            s.points
                .iter()
                .max_by_key(|p| p.time)
                .map(|p| SensorSample::new(s.name.clone(), p.value, p.time))
        })
        .into_iter()
        .collect()
}
