//! Error Types for the Telemetry Pipeline
//!
//! ## Error Categories
//!
//! ### Request Problems
//! - `InvalidFilter`: Malformed or empty sensor selection, inverted time window.
//!   Raised before any I/O happens.
//!
//! ### Store Problems
//! - `FetchFailure`: The document store rejected or failed a query. Carries the
//!   group and sensors being fetched so the caller can tell which query broke.
//!   This is the only retryable variant.
//!
//! ### Catalog Problems
//! - `MetadataMissing`: A sensor in the filter has no catalog entry. The pipeline
//!   never returns this; it logs it and drops the sensor from aggregation.
//!
//! ### Internal Problems
//! - `AggregationFailure`: Reduction over state that should be impossible
//!   (an empty bucket, for example).
//! - `Cancelled` / `TaskFailed`: The request was abandoned as a unit.
//! - `Config`: The pipeline configuration is unusable.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use fleetscope_core::TelemetryError;
//!
//! fn status_code(err: &TelemetryError) -> u16 {
//!     match err {
//!         TelemetryError::InvalidFilter { .. } => 400,
//!         TelemetryError::FetchFailure { .. } => 503,
//!         TelemetryError::Cancelled => 499,
//!         _ => 500,
//!     }
//! }
//! ```
//!
//! Nothing is retried inside the pipeline; `is_retryable()` tells the caller
//! whether a retry makes sense.

use thiserror::Error;

/// Boxed error raised by a store implementation
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for pipeline operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Telemetry pipeline errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The filter request cannot be served
    #[error("Invalid filter: {reason}")]
    InvalidFilter {
        /// What is wrong with the request
        reason: String,
    },

    /// The document store failed while serving a query
    #[error("Fetch failed for group '{group}' (sensors {sensors:?}): {source}")]
    FetchFailure {
        /// Sensor group key being fetched
        group: String,
        /// Sensor names of the failing filter
        sensors: Vec<String>,
        /// Underlying store error
        #[source]
        source: SourceError,
    },

    /// A selected sensor has no catalog entry
    #[error("No metadata for sensor '{sensor}'")]
    MetadataMissing {
        /// Internal sensor name
        sensor: String,
    },

    /// Internal state the aggregation stages cannot handle
    #[error("Aggregation failed: {reason}")]
    AggregationFailure {
        /// Description of the unexpected state
        reason: &'static str,
    },

    /// Pipeline configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// A sub-query task panicked or was aborted
    #[error("Query task failed: {0}")]
    TaskFailed(String),
}

impl TelemetryError {
    /// Shorthand for an `InvalidFilter` error
    pub fn invalid_filter(reason: impl Into<String>) -> Self {
        Self::InvalidFilter { reason: reason.into() }
    }

    /// Whether the caller may retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailure { .. })
    }
}
