//! Raw and emitted sensor samples

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// One sensor value at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Sensor name (raw inside a folder, canonical once grouped)
    pub name: String,
    /// Reported value
    pub value: f64,
    /// Epoch milliseconds
    pub time: Timestamp,
}

impl SensorSample {
    /// Sample of `name` at `time`
    pub fn new(name: impl Into<String>, value: f64, time: Timestamp) -> Self {
        Self { name: name.into(), value, time }
    }
}

/// Samples returned by one matched store document set
///
/// Head-mounted sensors are stored per head folder with raw sensor names;
/// machine-level sensors are stored per variable.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSampleGroup {
    /// Samples of a head folder; sample names are raw sensor names
    Folder {
        /// Head number of the folder
        head: u32,
        /// Samples in store order
        samples: Vec<SensorSample>,
    },
    /// Samples of a single machine-level variable
    Variable {
        /// Variable name
        name: String,
        /// Samples in store order
        samples: Vec<SensorSample>,
    },
}

impl RawSampleGroup {
    /// Samples of this group
    pub fn samples(&self) -> &[SensorSample] {
        match self {
            Self::Folder { samples, .. } | Self::Variable { samples, .. } => samples,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples().len()
    }

    /// Whether the group carries no samples
    pub fn is_empty(&self) -> bool {
        self.samples().is_empty()
    }

    /// Consume the group, yielding samples under their canonical names
    pub fn into_canonical(self) -> Vec<SensorSample> {
        match self {
            Self::Folder { head, samples } => samples
                .into_iter()
                .map(|s| SensorSample {
                    name: canonical_sensor_name(head, &s.name),
                    ..s
                })
                .collect(),
            Self::Variable { name, samples } => samples
                .into_iter()
                .map(|s| SensorSample { name: name.clone(), ..s })
                .collect(),
        }
    }
}

/// `"H" + two-digit head + "_" + sensor`
pub fn canonical_sensor_name(head: u32, sensor: &str) -> String {
    format!("H{:02}_{}", head, sensor)
}

/// Strip an `Hnn_` head prefix if present
pub fn base_sensor_name(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() > 4
        && bytes[0] == b'H'
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit()
        && bytes[3] == b'_'
    {
        &name[4..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_samples_get_head_prefix() {
        let group = RawSampleGroup::Folder {
            head: 7,
            samples: vec![SensorSample::new("Temp", 1.0, 10)],
        };
        let samples = group.into_canonical();
        assert_eq!(samples[0].name, "H07_Temp");
    }

    #[test]
    fn variable_samples_take_variable_name() {
        let group = RawSampleGroup::Variable {
            name: "Pressure".into(),
            samples: vec![SensorSample::new("pressure_raw", 1.0, 10)],
        };
        assert_eq!(group.len(), 1);
        assert_eq!(group.into_canonical()[0].name, "Pressure");
    }

    #[test]
    fn base_name_strips_only_head_prefix() {
        assert_eq!(base_sensor_name("H01_Alarm"), "Alarm");
        assert_eq!(base_sensor_name("Alarm"), "Alarm");
        assert_eq!(base_sensor_name("HX1_Alarm"), "HX1_Alarm");
        assert_eq!(base_sensor_name("H01_"), "H01_");
    }
}
