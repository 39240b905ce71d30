//! Sensor Catalog Registry
//!
//! Thread-safe point lookups of sensor metadata by (category, internal
//! name). A catalog is built once, shared behind an `Arc` or the global
//! [`DEFAULT_CATALOG`], and read by every request.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use log::{info, warn};

use fleetscope_core::{SensorFilterRequest, SensorMetadata, TelemetryError};

use crate::builtin::builtin_metadata;
use crate::{CatalogDocument, CatalogError, CatalogResult};

/// Thread-safe sensor metadata catalog
pub struct SensorCatalog {
    /// Entries indexed by (category, internal name)
    entries: RwLock<HashMap<(String, String), SensorMetadata>>,

    /// Internal names per category, in registration order
    categories: RwLock<HashMap<String, Vec<String>>>,
}

impl SensorCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            categories: RwLock::new(HashMap::new()),
        }
    }

    /// Register an entry, replacing any previous one for the same key
    pub fn register(&self, metadata: SensorMetadata) -> CatalogResult<Option<SensorMetadata>> {
        let key = (metadata.category.clone(), metadata.internal_name.clone());

        let previous = {
            let mut entries = self.entries.write().map_err(|_| CatalogError::LockPoisoned)?;
            entries.insert(key.clone(), metadata)
        };

        if previous.is_none() {
            let mut categories = self.categories.write().map_err(|_| CatalogError::LockPoisoned)?;
            categories.entry(key.0).or_default().push(key.1);
        }

        Ok(previous)
    }

    /// Metadata of `sensor` in `category`
    pub fn lookup(&self, category: &str, sensor: &str) -> CatalogResult<SensorMetadata> {
        let entries = self.entries.read().map_err(|_| CatalogError::LockPoisoned)?;

        entries
            .get(&(category.to_string(), sensor.to_string()))
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                category: category.to_string(),
                sensor: sensor.to_string(),
            })
    }

    /// Metadata for every distinct sensor `request` selects
    ///
    /// Misses are logged and skipped; the pipeline then excludes those
    /// sensors. Lock poisoning is still an error.
    pub fn resolve_for(
        &self,
        category: &str,
        request: &SensorFilterRequest,
    ) -> CatalogResult<Vec<SensorMetadata>> {
        let mut resolved: Vec<SensorMetadata> = Vec::new();

        for (group, filter) in request.filter_pairs() {
            for name in &filter.sensor_names {
                if resolved.iter().any(|m| &m.internal_name == name) {
                    continue;
                }
                match self.lookup(category, name) {
                    Ok(metadata) => resolved.push(metadata),
                    Err(CatalogError::NotFound { .. }) => {
                        let err = TelemetryError::MetadataMissing { sensor: name.clone() };
                        warn!("{} (category '{}', group '{}')", err, category, group.key);
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        Ok(resolved)
    }

    /// Internal names registered for `category`, in registration order
    pub fn sensors_in(&self, category: &str) -> CatalogResult<Vec<String>> {
        let categories = self.categories.read().map_err(|_| CatalogError::LockPoisoned)?;

        Ok(categories.get(category).cloned().unwrap_or_default())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the catalog holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register every entry of a JSON catalog document
    ///
    /// The document is resolved completely before anything is registered,
    /// so a bad strategy leaves the catalog untouched.
    pub fn load_json(&self, json: &str) -> CatalogResult<usize> {
        let metadata = CatalogDocument::from_json(json)?.into_metadata()?;
        let count = metadata.len();
        for entry in metadata {
            self.register(entry)?;
        }
        Ok(count)
    }

    /// Register every entry of a JSON catalog file
    pub fn load_file(&self, path: impl AsRef<Path>) -> CatalogResult<usize> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let count = self.load_json(&json)?;
        info!("loaded {} catalog entries from {}", count, path.display());
        Ok(count)
    }

    /// Register the built-in entries
    pub fn load_defaults(&self) -> CatalogResult<()> {
        let metadata = builtin_metadata()?;
        let count = metadata.len();
        for entry in metadata {
            self.register(entry)?;
        }
        info!("loaded {} built-in catalog entries", count);
        Ok(())
    }
}

impl Default for SensorCatalog {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    /// Global catalog with the built-in entries loaded
    pub static ref DEFAULT_CATALOG: SensorCatalog = {
        let catalog = SensorCatalog::new();
        if let Err(err) = catalog.load_defaults() {
            warn!("built-in catalog failed to load: {}", err);
        }
        catalog
    };
}
