//! Raw Sample Source Abstraction
//!
//! The document store holds one collection per sensor group. Each stored
//! document covers a contiguous time range and carries either a head-folder
//! discriminator or a variable name, plus an array of `{name, value, time}`
//! samples.
//!
//! ## Query Contract
//!
//! - `fetch` returns documents overlapping `[min_time, max_time)` whose
//!   discriminator matches the selector, with samples already filtered to
//!   the same bounds and sensor names.
//! - When a sensor has more in-window samples than `limit_per_sensor`, the
//!   newest ones are kept and `truncated` is set.
//! - `exists_before` only answers whether any matching sample is strictly
//!   older than `before`.
//!
//! ## Example Implementation
//!
//! ```rust
//! use async_trait::async_trait;
//! use fleetscope_core::errors::SourceError;
//! use fleetscope_core::traits::{FetchedSamples, ProbeQuery, SampleQuery, SampleSource};
//!
//! struct EmptyStore;
//!
//! #[async_trait]
//! impl SampleSource for EmptyStore {
//!     async fn fetch(&self, _query: &SampleQuery) -> Result<FetchedSamples, SourceError> {
//!         Ok(FetchedSamples::default())
//!     }
//!
//!     async fn exists_before(&self, _query: &ProbeQuery) -> Result<bool, SourceError> {
//!         Ok(false)
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::model::{RawSampleGroup, SensorFilter};
use crate::time::Timestamp;

/// Which documents of a collection a query matches
#[derive(Debug, Clone, PartialEq)]
pub enum SampleSelector {
    /// Documents of one head folder, samples restricted to `sensors`
    Folder {
        /// Head number
        head: u32,
        /// Raw sensor names inside the folder
        sensors: Vec<String>,
    },
    /// Documents of the listed variables
    Variables {
        /// Variable names
        names: Vec<String>,
    },
}

impl SampleSelector {
    /// Selector matching how `filter`'s sensors are stored
    pub fn for_filter(filter: &SensorFilter) -> Self {
        if filter.is_head_mounted() {
            Self::Folder {
                head: filter.head_number,
                sensors: filter.sensor_names.clone(),
            }
        } else {
            Self::Variables { names: filter.sensor_names.clone() }
        }
    }

    /// Sensor names covered by the selector
    pub fn sensor_names(&self) -> &[String] {
        match self {
            Self::Folder { sensors, .. } => sensors,
            Self::Variables { names } => names,
        }
    }
}

/// Time-bounded sample query against one collection
#[derive(Debug, Clone, PartialEq)]
pub struct SampleQuery {
    /// Collection (sensor group) key
    pub group_key: String,
    /// Document discriminator and sensor names
    pub selector: SampleSelector,
    /// Inclusive lower bound
    pub min_time: Timestamp,
    /// Exclusive upper bound
    pub max_time: Timestamp,
    /// Newest samples kept per sensor
    pub limit_per_sensor: usize,
}

/// Existence-only query for samples older than `before`
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeQuery {
    /// Collection (sensor group) key
    pub group_key: String,
    /// Document discriminator and sensor names
    pub selector: SampleSelector,
    /// Exclusive upper bound
    pub before: Timestamp,
}

/// Result of one [`SampleQuery`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedSamples {
    /// Matched sample groups in store order
    pub groups: Vec<RawSampleGroup>,
    /// Some sensor hit `limit_per_sensor`
    pub truncated: bool,
}

impl FetchedSamples {
    /// Total samples across groups
    pub fn sample_count(&self) -> usize {
        self.groups.iter().map(RawSampleGroup::len).sum()
    }
}

/// Read-only access to raw samples
///
/// Shared by all requests; implementations must be safe to call from
/// concurrent tasks.
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Samples matching `query`
    async fn fetch(&self, query: &SampleQuery) -> Result<FetchedSamples, SourceError>;

    /// Whether any sample matching `query` exists
    async fn exists_before(&self, query: &ProbeQuery) -> Result<bool, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_follows_head_mounting() {
        let folder = SampleSelector::for_filter(&SensorFilter::new(2, ["Temp"]));
        assert_eq!(
            folder,
            SampleSelector::Folder { head: 2, sensors: vec!["Temp".into()] }
        );

        let vars = SampleSelector::for_filter(&SensorFilter::new(0, ["Temp", "Speed"]));
        assert_eq!(vars.sensor_names(), ["Temp".to_string(), "Speed".to_string()]);
    }
}
