//! Time window planning
//!
//! Turns a request's data range into concrete `[min_time, max_time)` bounds
//! and a bucket layout shared by every later stage.

use log::debug;

use crate::config::PipelineConfig;
use crate::constants::{MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND};
use crate::errors::{TelemetryError, TelemetryResult};
use crate::model::{RangeUnit, RequestType, SensorFilterRequest};
use crate::time::{TimeSource, Timestamp};

/// Half-open query window and its bucket layout
///
/// Bounds are in stored time. `offset` is what must be added to a stored
/// timestamp to get the time shown to the client (non-zero for demo data).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive lower bound
    pub min_time: Timestamp,
    /// Exclusive upper bound
    pub max_time: Timestamp,
    /// Output samples wanted per sensor
    pub target_samples: usize,
    /// Width of one bucket (ms, at least 1)
    pub bucket_width: i64,
    /// Stored-to-client time shift
    pub offset: i64,
}

impl TimeWindow {
    /// Window over `[min_time, max_time)` split into at most `target_samples` buckets
    pub fn new(min_time: Timestamp, max_time: Timestamp, target_samples: usize) -> Self {
        let span = max_time.saturating_sub(min_time).max(0);
        let bucket_width = if target_samples == 0 || span == 0 {
            1
        } else {
            let target = i64::try_from(target_samples).unwrap_or(i64::MAX);
            let width = span / target + i64::from(span % target != 0);
            width.max(1)
        };
        Self {
            min_time,
            max_time,
            target_samples,
            bucket_width,
            offset: 0,
        }
    }

    /// Same window with a stored-to-client shift
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Nothing can fall inside the window
    pub fn is_empty(&self) -> bool {
        self.max_time <= self.min_time
    }

    /// Whether `time` lies in `[min_time, max_time)`
    pub fn contains(&self, time: Timestamp) -> bool {
        time >= self.min_time && time < self.max_time
    }

    /// Start of the bucket holding `time`, if inside the window
    pub fn bucket_start(&self, time: Timestamp) -> Option<Timestamp> {
        if !self.contains(time) {
            return None;
        }
        let index = time.checked_sub(self.min_time)? / self.bucket_width;
        self.min_time.checked_add(index * self.bucket_width)
    }

    /// Output samples wanted per sensor
    pub fn num_samples_required_per_sensor(&self) -> usize {
        self.target_samples
    }

    /// Raw samples fetched per sensor before the store truncates
    pub fn fetch_limit(&self, oversampling: usize) -> usize {
        self.target_samples.saturating_mul(oversampling.max(1)).max(1)
    }
}

/// Derive the window for `request`
pub fn plan(
    request: &SensorFilterRequest,
    clock: &dyn TimeSource,
    config: &PipelineConfig,
) -> TelemetryResult<TimeWindow> {
    let range = &request.range;
    let reference = range.reference_time.unwrap_or_else(|| clock.now());

    let window = match range.unit {
        RangeUnit::Sample => {
            let span = span_ms(range.magnitude, config.base_sample_period_ms)?;
            let target = usize::try_from(range.magnitude)
                .map_err(|_| TelemetryError::invalid_filter("sample count too large"))?;
            TimeWindow::new(back_from(reference, span)?, reference, target)
        }
        RangeUnit::Second | RangeUnit::Minute | RangeUnit::Hour | RangeUnit::Day => {
            let unit_ms = match range.unit {
                RangeUnit::Second => MS_PER_SECOND,
                RangeUnit::Minute => MS_PER_MINUTE,
                RangeUnit::Hour => MS_PER_HOUR,
                _ => MS_PER_DAY,
            };
            let span = span_ms(range.magnitude, unit_ms)?;
            TimeWindow::new(back_from(reference, span)?, reference, duration_target(span, config))
        }
        RangeUnit::Custom => {
            let from = range
                .from
                .ok_or_else(|| TelemetryError::invalid_filter("custom range requires 'from'"))?;
            if from > reference {
                return Err(TelemetryError::invalid_filter(format!(
                    "inverted time window [{}, {})",
                    from, reference
                )));
            }
            TimeWindow::new(from, reference, duration_target(back_from(reference, from)?, config))
        }
    };

    let window = if request.request_type == RequestType::SyntheticDemo {
        let offset = config.demo_time_offset_ms;
        TimeWindow {
            min_time: back_from(window.min_time, offset)?,
            max_time: back_from(window.max_time, offset)?,
            ..window
        }
        .with_offset(offset)
    } else {
        window
    };

    debug!(
        "planned window [{}, {}) with {} buckets of {} ms",
        window.min_time, window.max_time, window.target_samples, window.bucket_width
    );
    Ok(window)
}

fn span_ms(magnitude: u64, unit_ms: i64) -> TelemetryResult<i64> {
    i64::try_from(magnitude)
        .ok()
        .and_then(|m| m.checked_mul(unit_ms))
        .ok_or_else(|| TelemetryError::invalid_filter("data range too large"))
}

/// `end - amount`, or `InvalidFilter` when it leaves the timestamp range
fn back_from(end: Timestamp, amount: i64) -> TelemetryResult<Timestamp> {
    end.checked_sub(amount)
        .ok_or_else(|| TelemetryError::invalid_filter("data range out of bounds"))
}

/// Bucket count for a wall-clock span: the configured target, but never
/// finer than one base sample period.
fn duration_target(span: i64, config: &PipelineConfig) -> usize {
    if span <= 0 {
        return 0;
    }
    let periods = (span / config.base_sample_period_ms).max(1) as usize;
    config.duration_target_samples.min(periods)
}
