//! Pipeline Defaults and Limits
//!
//! Default values for `PipelineConfig` and hard limits on filter requests.

/// Period covered by one requested sample for `sample`-unit ranges (milliseconds).
///
/// Machines report at 1 Hz; a request for N samples spans N seconds.
pub const DEFAULT_BASE_SAMPLE_PERIOD_MS: i64 = 1000;

/// Number of output buckets for duration-based windows.
///
/// Roughly the horizontal resolution of a dashboard chart.
pub const DEFAULT_DURATION_TARGET_SAMPLES: usize = 200;

/// Raw samples fetched per requested output sample before the store truncates.
pub const DEFAULT_FETCH_OVERSAMPLING: usize = 50;

/// Concurrent store queries per request.
pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 8;

/// Decimal digits kept in emitted values.
pub const DEFAULT_ROUND_DECIMALS: u32 = 2;

/// Highest head number that fits the two-digit `Hnn_` prefix.
pub const MAX_HEAD_NUMBER: u32 = 99;
