//! Stored telemetry documents
//!
//! ```json
//! { "firstTime": 1000, "lastTime": 3000, "discriminator": { "folder": 2 },
//!   "samples": [ { "name": "Temp", "value": 30.1, "time": 1000 }, ... ] }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fleetscope_core::time::Timestamp;
use fleetscope_core::traits::SampleSelector;
use fleetscope_core::SensorSample;

use crate::{ConnectorError, ConnectorResult};

/// What a document holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discriminator {
    /// Every sensor of one head
    Folder(u32),
    /// One machine-level variable
    Variable(String),
}

/// One uploaded batch of samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    /// Earliest sample time (inclusive)
    pub first_time: Timestamp,
    /// Latest sample time (inclusive)
    pub last_time: Timestamp,
    /// Folder or variable
    pub discriminator: Discriminator,
    /// Samples in upload order
    pub samples: Vec<SensorSample>,
}

impl StoredDocument {
    /// Document over `samples`, span taken from the samples
    pub fn new(discriminator: Discriminator, samples: Vec<SensorSample>) -> Self {
        let first_time = samples.iter().map(|s| s.time).min().unwrap_or(0);
        let last_time = samples.iter().map(|s| s.time).max().unwrap_or(0);
        Self {
            first_time,
            last_time,
            discriminator,
            samples,
        }
    }

    /// Variable document from `(time, value)` pairs
    pub fn variable(name: &str, points: impl IntoIterator<Item = (Timestamp, f64)>) -> Self {
        let samples = points
            .into_iter()
            .map(|(time, value)| SensorSample::new(name, value, time))
            .collect();
        Self::new(Discriminator::Variable(name.to_string()), samples)
    }

    /// Folder document from `(sensor, time, value)` triples
    pub fn folder<'a>(head: u32, points: impl IntoIterator<Item = (&'a str, Timestamp, f64)>) -> Self {
        let samples = points
            .into_iter()
            .map(|(name, time, value)| SensorSample::new(name, value, time))
            .collect();
        Self::new(Discriminator::Folder(head), samples)
    }

    /// Reject documents whose samples fall outside their declared span
    pub fn validate(&self, collection: &str) -> ConnectorResult<()> {
        let invalid = |reason: String| ConnectorError::InvalidDocument {
            collection: collection.to_string(),
            reason,
        };

        if self.first_time > self.last_time {
            return Err(invalid(format!(
                "span [{}, {}] is inverted",
                self.first_time, self.last_time
            )));
        }
        if let Some(outside) = self
            .samples
            .iter()
            .find(|s| s.time < self.first_time || s.time > self.last_time)
        {
            return Err(invalid(format!(
                "sample '{}' at {} lies outside [{}, {}]",
                outside.name, outside.time, self.first_time, self.last_time
            )));
        }
        Ok(())
    }

    /// Whether the span can hold samples in `[min_time, max_time)`
    pub fn overlaps(&self, min_time: Timestamp, max_time: Timestamp) -> bool {
        self.first_time < max_time && self.last_time >= min_time
    }

    /// Whether the document belongs to `selector`
    pub fn matches(&self, selector: &SampleSelector) -> bool {
        match (&self.discriminator, selector) {
            (Discriminator::Folder(head), SampleSelector::Folder { head: wanted, .. }) => head == wanted,
            (Discriminator::Variable(name), SampleSelector::Variables { names }) => names.contains(name),
            _ => false,
        }
    }

    /// Sensor key a sample of this document is counted under
    ///
    /// Folder samples are keyed by their own name; variable samples by the
    /// variable, whatever name they were uploaded with.
    pub fn sensor_of<'a>(&'a self, sample: &'a SensorSample) -> &'a str {
        match &self.discriminator {
            Discriminator::Folder(_) => &sample.name,
            Discriminator::Variable(name) => name,
        }
    }

    /// Whether `sample` is one of the selector's sensors
    pub fn selects(&self, selector: &SampleSelector, sample: &SensorSample) -> bool {
        match selector {
            SampleSelector::Folder { sensors, .. } => sensors.iter().any(|s| s == &sample.name),
            SampleSelector::Variables { .. } => true,
        }
    }
}

/// Serialized form of a whole store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDump {
    /// Documents per collection key
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<StoredDocument>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_comes_from_samples() {
        let doc = StoredDocument::variable("Temp", [(3_000, 1.0), (1_000, 2.0), (2_000, 3.0)]);
        assert_eq!(doc.first_time, 1_000);
        assert_eq!(doc.last_time, 3_000);
        assert!(doc.validate("printerA").is_ok());
    }

    #[test]
    fn overlap_is_half_open_on_the_window() {
        let doc = StoredDocument::variable("Temp", [(1_000, 1.0), (2_000, 1.0)]);
        assert!(doc.overlaps(2_000, 3_000));
        assert!(!doc.overlaps(2_001, 3_000));
        assert!(!doc.overlaps(0, 1_000));
        assert!(doc.overlaps(0, 1_001));
    }

    #[test]
    fn discriminator_must_match_selector_kind() {
        let folder = StoredDocument::folder(2, [("Temp", 1_000, 1.0)]);
        let variable = StoredDocument::variable("Temp", [(1_000, 1.0)]);

        let head_two = SampleSelector::Folder { head: 2, sensors: vec!["Temp".into()] };
        let temp = SampleSelector::Variables { names: vec!["Temp".into()] };

        assert!(folder.matches(&head_two));
        assert!(!folder.matches(&temp));
        assert!(variable.matches(&temp));
        assert!(!variable.matches(&head_two));
    }

    #[test]
    fn samples_outside_span_are_rejected() {
        let mut doc = StoredDocument::variable("Temp", [(1_000, 1.0)]);
        doc.samples.push(SensorSample::new("Temp", 2.0, 5_000));
        assert!(matches!(
            doc.validate("printerA"),
            Err(ConnectorError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn discriminator_json_shape() {
        let json = r#"{ "firstTime": 1, "lastTime": 1, "discriminator": { "folder": 3 },
                        "samples": [ { "name": "Temp", "value": 1.0, "time": 1 } ] }"#;
        let doc: StoredDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.discriminator, Discriminator::Folder(3));
    }
}
