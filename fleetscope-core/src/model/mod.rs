//! Request-scoped data model
//!
//! Every type here is a plain value owned by one request. Nothing is
//! persisted or shared across requests.
//!
//! - [`filter`] - What the widget asks for
//! - [`sample`] - What the document store hands back
//! - [`metadata`] - Per-sensor merge strategy and thresholds from the catalog
//! - [`response`] - What the widget receives

pub mod filter;
pub mod metadata;
pub mod response;
pub mod sample;

pub use filter::{
    DataRange, PaginationHints, RangeUnit, RequestType, SensorFilter, SensorFilterRequest,
    SensorGroup, VerticalAggregation, WidgetCategory,
};
pub use metadata::{MergeStrategy, SensorMetadata, Thresholds};
pub use response::SensorDataResponse;
pub use sample::{base_sensor_name, canonical_sensor_name, RawSampleGroup, SensorSample};
