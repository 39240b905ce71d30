//! Sensor telemetry query and resampling pipeline for FleetScope
//!
//! Turns a dashboard widget's sensor selection into a ready-to-render
//! response: raw irregular samples are fetched from a document store,
//! grouped per sensor, merged into fixed-width buckets, optionally
//! aggregated across sensors, and split into cache/display/new slices for
//! incremental rendering.
//!
//! Key constraints:
//! - Request-scoped: nothing is persisted or shared between requests
//! - Read-only against the document store
//! - Deterministic under test (injected clock and random source)
//!
//! ```no_run
//! use std::sync::Arc;
//! use fleetscope_core::{SensorFilterRequest, TelemetryPipeline, PipelineConfig};
//! use fleetscope_core::time::SystemTime;
//! # use fleetscope_core::traits::SampleSource;
//! # async fn example(source: Arc<dyn SampleSource>, request: SensorFilterRequest) {
//! let pipeline = TelemetryPipeline::new(source, SystemTime, PipelineConfig::default());
//! let cancel = tokio_util::sync::CancellationToken::new();
//! let mut rng = rand::thread_rng();
//!
//! match pipeline.compute_sensor_data_response(&request, &[], &mut rng, &cancel).await {
//!     Ok(response) => {}, // Render it
//!     Err(e) if e.is_retryable() => {}, // Store hiccup, caller may retry
//!     Err(e) => {}, // Reject the request
//! }
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod errors;
pub mod model;
pub mod pipeline;
pub mod time;
pub mod traits;

// Public API
pub use config::PipelineConfig;
pub use errors::{TelemetryError, TelemetryResult};
pub use model::{
    DataRange, MergeStrategy, PaginationHints, RangeUnit, RawSampleGroup, RequestType,
    SensorDataResponse, SensorFilter, SensorFilterRequest, SensorGroup, SensorMetadata,
    SensorSample, Thresholds, VerticalAggregation, WidgetCategory,
};
pub use pipeline::TelemetryPipeline;
pub use traits::SampleSource;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
