//! Constants for FleetScope Core
//!
//! Centralized numeric values and sensor name sets used by the pipeline.
//!
//! ## Organization
//!
//! - **Time**: Unit conversions and the epoch origin
//! - **Pipeline**: Defaults for window planning, fetch caps and concurrency
//! - **Demo**: Sensor name sets and overrides for synthetic demo data

/// Time unit conversions and time offsets.
pub mod time;

/// Pipeline defaults and limits.
pub mod pipeline;

/// Synthetic demo sensor sets, overrides and jitter bounds.
pub mod demo;

pub use time::{MS_PER_SECOND, MS_PER_MINUTE, MS_PER_HOUR, MS_PER_DAY};

pub use pipeline::{
    DEFAULT_BASE_SAMPLE_PERIOD_MS, DEFAULT_DURATION_TARGET_SAMPLES,
    DEFAULT_FETCH_OVERSAMPLING, DEFAULT_MAX_CONCURRENT_QUERIES, DEFAULT_ROUND_DECIMALS,
    MAX_HEAD_NUMBER,
};

pub use demo::{DEMO_JITTER_EXCLUDED, DEMO_OVERRIDES, DEFAULT_DEMO_TIME_OFFSET_MS};
