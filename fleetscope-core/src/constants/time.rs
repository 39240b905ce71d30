//! Time-Related Constants
//!
//! All durations in the pipeline are epoch milliseconds stored as `i64`.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: i64 = 1000;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;

/// Milliseconds per hour.
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Milliseconds per day.
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

// ===== EPOCH =====

/// Earliest timestamp a stored sample can carry.
///
/// A window reaching this point has nothing older to page into.
pub const EPOCH_ORIGIN_MS: i64 = 0;
