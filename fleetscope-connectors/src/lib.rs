//! Document-Store Connectors for the Telemetry Pipeline
//!
//! ## Overview
//!
//! Connectors implement [`SampleSource`](fleetscope_core::SampleSource) on
//! top of a concrete document store. Machines upload telemetry as
//! documents, one collection per sensor group (usually one machine):
//!
//! - a **folder** document holds every head-mounted sensor of one head
//!   (`H01`, `H02`, ...), samples named by their raw sensor name;
//! - a **variable** document holds one machine-level sensor.
//!
//! Each document records the `[first_time, last_time]` span of its
//! samples, so a query can skip documents that cannot overlap its window
//! before looking at individual samples.
//!
//! ## Query Contract
//!
//! For a [`SampleQuery`](fleetscope_core::traits::SampleQuery) a connector:
//!
//! 1. selects documents whose span overlaps `[min_time, max_time)` and
//!    whose discriminator matches the selector;
//! 2. keeps samples inside the window that belong to a selected sensor;
//! 3. keeps only the newest `limit_per_sensor` samples of each sensor and
//!    reports `truncated` when anything was dropped.
//!
//! Probes answer whether any selected sensor has a sample strictly older
//! than the bound, without returning data.
//!
//! ## Example Usage
//!
//! ```rust
//! use fleetscope_connectors::MemoryDocumentStore;
//!
//! let store = MemoryDocumentStore::from_json_str(r#"{
//!     "collections": {
//!         "printerA": [
//!             { "firstTime": 1000, "lastTime": 2000, "discriminator": { "variable": "Temp" },
//!               "samples": [ { "name": "Temp", "value": 21.5, "time": 1000 },
//!                            { "name": "Temp", "value": 21.7, "time": 2000 } ] }
//!         ]
//!     }
//! }"#)?;
//! assert_eq!(store.collection_keys(), ["printerA"]);
//! # Ok::<(), fleetscope_connectors::ConnectorError>(())
//! ```

pub mod document;
pub mod memory;

pub use document::{Discriminator, StoreDump, StoredDocument};
pub use memory::MemoryDocumentStore;

use thiserror::Error;

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// No collection with this key (strict stores only)
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// Malformed store dump or document
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Store dump could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document violates its own span
    #[error("Invalid document in '{collection}': {reason}")]
    InvalidDocument {
        /// Collection key
        collection: String,
        /// What is wrong with the document
        reason: String,
    },

    /// A writer panicked while holding the store lock
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Query statistics common to all connectors
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Sample queries served
    pub queries_served: u64,
    /// Existence probes served
    pub probes_served: u64,
    /// Samples returned across all queries
    pub samples_returned: u64,
    /// Queries that hit the per-sensor cap
    pub truncated_queries: u64,
}
