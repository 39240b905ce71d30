//! Built-in catalog entries
//!
//! Entries for the machinery FleetScope ships dashboards for. Deployments
//! layer their own catalog files on top.

use fleetscope_core::SensorMetadata;

use crate::{CatalogEntry, CatalogResult};
use fleetscope_core::model::Thresholds;

/// `(category, internal name, strategy, head-mounted, min, max)`
type BuiltinRow = (&'static str, &'static str, &'static str, bool, Option<f64>, Option<f64>);

const BUILTIN_ROWS: &[BuiltinRow] = &[
    // Web printing presses
    ("printer", "Temp", "avg", false, Some(0.0), Some(80.0)),
    ("printer", "Pressure", "max", false, Some(0.0), Some(12.0)),
    ("printer", "ProductionSpeed", "avg", false, Some(0.0), Some(60000.0)),
    ("printer", "TotalProduct", "max", false, None, None),
    ("printer", "OperationState", "majority", false, None, None),
    ("printer", "OperationMode", "majority", false, None, None),
    ("printer", "Alarm", "max", true, None, None),
    ("printer", "InkLevel", "min", true, Some(0.0), Some(100.0)),
    ("printer", "NozzleTemp", "avg", true, Some(20.0), Some(65.0)),
    // Packaging lines
    ("packer", "Temp", "avg", false, Some(0.0), Some(60.0)),
    ("packer", "ProductionSpeed", "avg", false, Some(0.0), Some(120.0)),
    ("packer", "PackCount", "sum", false, None, None),
    ("packer", "RejectCount", "sum", false, None, None),
    ("packer", "OperationState", "majority", false, None, None),
    ("packer", "Alarm", "max", true, None, None),
    ("packer", "SealTemp", "avg", true, Some(120.0), Some(220.0)),
];

/// Catalog entries shipped with the crate
pub fn builtin_entries() -> Vec<CatalogEntry> {
    BUILTIN_ROWS
        .iter()
        .map(|&(category, name, strategy, head_mounted, min, max)| CatalogEntry {
            category: category.to_string(),
            internal_name: name.to_string(),
            strategy: strategy.to_string(),
            thresholds: (min.is_some() || max.is_some()).then_some(Thresholds { min, max }),
            head_mounted,
        })
        .collect()
}

/// Built-in entries resolved into metadata
pub fn builtin_metadata() -> CatalogResult<Vec<SensorMetadata>> {
    builtin_entries()
        .into_iter()
        .map(CatalogEntry::into_metadata)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetscope_core::MergeStrategy;

    #[test]
    fn builtin_strategies_all_parse() {
        let metadata = builtin_metadata().unwrap();
        assert_eq!(metadata.len(), BUILTIN_ROWS.len());
    }

    #[test]
    fn state_sensors_use_majority() {
        let metadata = builtin_metadata().unwrap();
        let state = metadata
            .iter()
            .find(|m| m.category == "printer" && m.internal_name == "OperationState")
            .unwrap();
        assert_eq!(state.strategy, MergeStrategy::Majority);
        assert!(state.thresholds.is_none());
    }
}
