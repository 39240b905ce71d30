//! Synthetic Demo Constants
//!
//! Demo requests replay recorded telemetry with noise so prospects see live-
//! looking charts without access to a customer's machines.

use super::time::MS_PER_DAY;

/// Sensors whose values are passed through without jitter.
///
/// These report discrete states or counters; noise would make them nonsense.
pub const DEMO_JITTER_EXCLUDED: &[&str] = &[
    "OperationState",
    "Alarm",
    "OperationMode",
    "ProductionSpeed",
    "TotalProduct",
];

/// Sensors replaced by a fixed value in demo responses.
pub const DEMO_OVERRIDES: &[(&str, f64)] = &[
    ("Alarm", 0.0),
    ("ProductionSpeed", 46800.0),
    ("OperationState", 1.0),
];

/// Smallest relative jitter, in whole percent.
pub const DEMO_JITTER_MIN_PERCENT: u32 = 1;

/// Largest relative jitter, in whole percent.
pub const DEMO_JITTER_MAX_PERCENT: u32 = 15;

/// Age of the demo recordings relative to the time they are shown at.
pub const DEFAULT_DEMO_TIME_OFFSET_MS: i64 = 365 * MS_PER_DAY;
