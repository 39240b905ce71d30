//! Widget response

use serde::Serialize;

use crate::model::filter::RequestType;
use crate::model::sample::SensorSample;
use crate::time::Timestamp;

/// Data for one widget refresh
///
/// Built once by the formatter and never mutated afterwards. The three
/// sample slices are disjoint and keep output order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDataResponse {
    request_type: RequestType,
    cache_data: Vec<SensorSample>,
    display_data: Vec<SensorSample>,
    new_data: Vec<SensorSample>,
    total_count: usize,
    min_sample_time_encountered: Timestamp,
    is_last_batch: bool,
}

impl SensorDataResponse {
    pub(crate) fn new(
        request_type: RequestType,
        cache_data: Vec<SensorSample>,
        display_data: Vec<SensorSample>,
        new_data: Vec<SensorSample>,
        min_sample_time_encountered: Timestamp,
        is_last_batch: bool,
    ) -> Self {
        let total_count = cache_data.len() + display_data.len() + new_data.len();
        Self {
            request_type,
            cache_data,
            display_data,
            new_data,
            total_count,
            min_sample_time_encountered,
            is_last_batch,
        }
    }

    /// Request type echoed back
    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    /// Buckets the client already holds
    pub fn cache_data(&self) -> &[SensorSample] {
        &self.cache_data
    }

    /// Buckets for the visible window
    pub fn display_data(&self) -> &[SensorSample] {
        &self.display_data
    }

    /// Buckets newer than anything delivered before
    pub fn new_data(&self) -> &[SensorSample] {
        &self.new_data
    }

    /// Sum of the three slice lengths
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Earliest raw sample time fetched, or the window start
    pub fn min_sample_time_encountered(&self) -> Timestamp {
        self.min_sample_time_encountered
    }

    /// No history exists before `min_sample_time_encountered`
    pub fn is_last_batch(&self) -> bool {
        self.is_last_batch
    }

    /// All samples, cache then display then new
    pub fn all_samples(&self) -> impl Iterator<Item = &SensorSample> {
        self.cache_data.iter().chain(&self.display_data).chain(&self.new_data)
    }
}
