//! Response formatting
//!
//! Splits the final samples into three disjoint, order-preserving slices
//! using the client's pagination hints:
//!
//! ```text
//!   full request           → everything is display data
//!   t > last_seen_time     → new data
//!   cache_from ≤ t ≤ cache_to → cache data
//!   otherwise              → display data
//! ```

use crate::model::{PaginationHints, RequestType, SensorDataResponse, SensorSample};
use crate::time::Timestamp;

/// Slice a sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    /// Client already holds it
    Cache,
    /// Visible window
    Display,
    /// Newer than anything delivered
    New,
}

/// Slice of a sample at `time`
pub fn classify(time: Timestamp, request_type: RequestType, hints: &PaginationHints) -> Slice {
    if request_type == RequestType::Full {
        return Slice::Display;
    }
    if matches!(hints.last_seen_time, Some(last) if time > last) {
        return Slice::New;
    }
    if let (Some(from), Some(to)) = (hints.cache_from, hints.cache_to) {
        if from <= time && time <= to {
            return Slice::Cache;
        }
    }
    Slice::Display
}

/// Partition `samples` into `(cache, display, new)`
pub fn partition(
    samples: Vec<SensorSample>,
    request_type: RequestType,
    hints: &PaginationHints,
) -> (Vec<SensorSample>, Vec<SensorSample>, Vec<SensorSample>) {
    let mut cache = Vec::new();
    let mut display = Vec::new();
    let mut new = Vec::new();

    for sample in samples {
        match classify(sample.time, request_type, hints) {
            Slice::Cache => cache.push(sample),
            Slice::Display => display.push(sample),
            Slice::New => new.push(sample),
        }
    }
    (cache, display, new)
}

/// Assemble the final response
pub fn format(
    samples: Vec<SensorSample>,
    request_type: RequestType,
    hints: &PaginationHints,
    min_sample_time_encountered: Timestamp,
    is_last_batch: bool,
) -> SensorDataResponse {
    let (cache, display, new) = partition(samples, request_type, hints);
    SensorDataResponse::new(
        request_type,
        cache,
        display,
        new,
        min_sample_time_encountered,
        is_last_batch,
    )
}
