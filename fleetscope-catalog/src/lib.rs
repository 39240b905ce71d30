//! Sensor Metadata Catalog
//!
//! ## Overview
//!
//! Every sensor a widget can select has a catalog entry per machinery
//! category: how same-bucket samples are merged, display thresholds, and
//! whether the sensor is mounted once per head. The pipeline never talks to
//! the catalog itself; callers resolve the request's sensors here and hand
//! the resulting [`SensorMetadata`] list to the pipeline.
//!
//! ## Catalog Files
//!
//! Catalogs are plain JSON. Strategy names are parsed once, at load time,
//! into the closed [`MergeStrategy`] enum:
//!
//! ```json
//! {
//!   "entries": [
//!     { "category": "printer", "internalName": "Temp", "strategy": "avg",
//!       "thresholds": { "min": 0.0, "max": 80.0 } },
//!     { "category": "printer", "internalName": "Alarm", "strategy": "max",
//!       "headMounted": true }
//!   ]
//! }
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use fleetscope_catalog::SensorCatalog;
//!
//! let catalog = SensorCatalog::new();
//! catalog.load_defaults()?;
//!
//! let temp = catalog.lookup("printer", "Temp")?;
//! assert_eq!(temp.strategy.as_str(), "avg");
//! # Ok::<(), fleetscope_catalog::CatalogError>(())
//! ```

use serde::{Deserialize, Serialize};

use fleetscope_core::model::Thresholds;
use fleetscope_core::{MergeStrategy, SensorMetadata};

pub mod builtin;
pub mod registry;

pub use registry::{SensorCatalog, DEFAULT_CATALOG};

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No entry for the sensor in this category
    #[error("No catalog entry for sensor '{sensor}' in category '{category}'")]
    NotFound {
        /// Machinery category
        category: String,
        /// Internal sensor name
        sensor: String,
    },

    /// A strategy name outside the supported set
    #[error("Unknown merge strategy '{strategy}' for sensor '{sensor}'")]
    UnknownStrategy {
        /// Internal sensor name
        sensor: String,
        /// Strategy as written in the source
        strategy: String,
    },

    /// Malformed catalog document
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Catalog file could not be read
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// A writer panicked while holding the catalog lock
    #[error("Catalog lock poisoned")]
    LockPoisoned,
}

/// Catalog entry as written in a catalog file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Machinery category
    pub category: String,
    /// Internal (un-prefixed) sensor name
    pub internal_name: String,
    /// Merge strategy name, e.g. `avg` or `majority`
    pub strategy: String,
    /// Display thresholds
    #[serde(default)]
    pub thresholds: Option<Thresholds>,
    /// Whether the sensor is mounted once per head
    #[serde(default)]
    pub head_mounted: bool,
}

impl CatalogEntry {
    /// Resolve the strategy name into metadata
    pub fn into_metadata(self) -> CatalogResult<SensorMetadata> {
        let strategy: MergeStrategy =
            self.strategy
                .parse()
                .map_err(|_| CatalogError::UnknownStrategy {
                    sensor: self.internal_name.clone(),
                    strategy: self.strategy.clone(),
                })?;

        Ok(SensorMetadata {
            category: self.category,
            internal_name: self.internal_name,
            strategy,
            thresholds: self.thresholds,
            head_mounted: self.head_mounted,
        })
    }
}

/// Top-level shape of a catalog file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Entries in file order
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
}

impl CatalogDocument {
    /// Parse a catalog document from JSON
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve every entry, failing on the first unknown strategy
    pub fn into_metadata(self) -> CatalogResult<Vec<SensorMetadata>> {
        self.entries.into_iter().map(CatalogEntry::into_metadata).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_entries() {
        let json = r#"{
            "entries": [
                { "category": "printer", "internalName": "Temp", "strategy": "Average",
                  "thresholds": { "min": 0.0, "max": 80.0 } },
                { "category": "printer", "internalName": "Alarm", "strategy": "max", "headMounted": true }
            ]
        }"#;

        let metadata = CatalogDocument::from_json(json).unwrap().into_metadata().unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[0].strategy, MergeStrategy::Avg);
        assert_eq!(metadata[0].thresholds.unwrap().max, Some(80.0));
        assert!(!metadata[0].head_mounted);
        assert!(metadata[1].head_mounted);
    }

    #[test]
    fn unknown_strategy_names_the_sensor() {
        let entry = CatalogEntry {
            category: "printer".into(),
            internal_name: "Speed".into(),
            strategy: "median".into(),
            thresholds: None,
            head_mounted: false,
        };

        match entry.into_metadata() {
            Err(CatalogError::UnknownStrategy { sensor, strategy }) => {
                assert_eq!(sensor, "Speed");
                assert_eq!(strategy, "median");
            }
            other => panic!("expected unknown strategy, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            CatalogDocument::from_json("{ \"entries\": 3 }"),
            Err(CatalogError::Parse(_))
        ));
    }
}
