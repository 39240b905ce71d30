//! Synthetic demo transform and value rounding
//!
//! Demo requests replay recorded telemetry: timestamps are shifted to the
//! display epoch, a few state sensors get fixed values, and everything else
//! gets a random relative jitter of 1% to 15% in whole percent steps.
//! Every request, demo or not, has its values rounded before formatting.

use rand::Rng;

use crate::constants::demo::{
    DEMO_JITTER_EXCLUDED, DEMO_JITTER_MAX_PERCENT, DEMO_JITTER_MIN_PERCENT, DEMO_OVERRIDES,
};
use crate::model::{base_sensor_name, RequestType, SensorSample};

/// Apply the demo transform (demo requests only) and round all values
pub fn finalize<R: Rng>(
    samples: &mut [SensorSample],
    request_type: RequestType,
    time_offset: i64,
    decimals: u32,
    rng: &mut R,
) {
    for sample in samples.iter_mut() {
        if request_type == RequestType::SyntheticDemo {
            sample.time += time_offset;
            sample.value = demo_value(&sample.name, sample.value, rng);
        }
        sample.value = round_to(sample.value, decimals);
    }
}

/// Demo value of one sample; head prefixes are ignored when matching names
pub fn demo_value<R: Rng>(name: &str, value: f64, rng: &mut R) -> f64 {
    let base = base_sensor_name(name);
    if let Some(&(_, fixed)) = DEMO_OVERRIDES.iter().find(|(sensor, _)| *sensor == base) {
        return fixed;
    }
    if DEMO_JITTER_EXCLUDED.contains(&base) {
        return value;
    }
    jitter(value, rng)
}

/// Scale `value` by `1 ± p/100`, `p` a whole percentage in `[1, 15]`
pub fn jitter<R: Rng>(value: f64, rng: &mut R) -> f64 {
    let percent = rng.gen_range(DEMO_JITTER_MIN_PERCENT..=DEMO_JITTER_MAX_PERCENT);
    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    value * (1.0 + sign * f64::from(percent) / 100.0)
}

/// Round half away from zero to `decimals` digits
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
