//! Pipeline configuration
//!
//! Loaded from JSON by the service hosting the pipeline, or built in code:
//!
//! ```rust
//! use fleetscope_core::PipelineConfig;
//!
//! let config = PipelineConfig::default()
//!     .base_sample_period_ms(500)
//!     .max_concurrent_queries(4);
//! assert_eq!(config.duration_target_samples, 200);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_SAMPLE_PERIOD_MS, DEFAULT_DEMO_TIME_OFFSET_MS, DEFAULT_DURATION_TARGET_SAMPLES,
    DEFAULT_FETCH_OVERSAMPLING, DEFAULT_MAX_CONCURRENT_QUERIES, DEFAULT_ROUND_DECIMALS,
};
use crate::errors::{TelemetryError, TelemetryResult};

/// Tunables for one [`TelemetryPipeline`](crate::TelemetryPipeline)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Span of one requested sample for `sample`-unit ranges (ms)
    pub base_sample_period_ms: i64,
    /// Output buckets for duration and custom ranges
    pub duration_target_samples: usize,
    /// Raw samples fetched per requested output sample
    pub fetch_oversampling: usize,
    /// Concurrent store queries per request
    pub max_concurrent_queries: usize,
    /// Age of demo recordings relative to display time (ms)
    pub demo_time_offset_ms: i64,
    /// Decimal digits kept in emitted values
    pub round_decimals: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_sample_period_ms: DEFAULT_BASE_SAMPLE_PERIOD_MS,
            duration_target_samples: DEFAULT_DURATION_TARGET_SAMPLES,
            fetch_oversampling: DEFAULT_FETCH_OVERSAMPLING,
            max_concurrent_queries: DEFAULT_MAX_CONCURRENT_QUERIES,
            demo_time_offset_ms: DEFAULT_DEMO_TIME_OFFSET_MS,
            round_decimals: DEFAULT_ROUND_DECIMALS,
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document; missing keys keep their defaults
    pub fn from_json(json: &str) -> TelemetryResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TelemetryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> TelemetryResult<()> {
        if self.base_sample_period_ms <= 0 {
            return Err(TelemetryError::Config("baseSamplePeriodMs must be positive".into()));
        }
        if self.duration_target_samples == 0 {
            return Err(TelemetryError::Config("durationTargetSamples must be positive".into()));
        }
        if self.fetch_oversampling == 0 {
            return Err(TelemetryError::Config("fetchOversampling must be positive".into()));
        }
        if self.max_concurrent_queries == 0 {
            return Err(TelemetryError::Config("maxConcurrentQueries must be positive".into()));
        }
        Ok(())
    }

    /// Set the span of one requested sample
    pub fn base_sample_period_ms(mut self, ms: i64) -> Self {
        self.base_sample_period_ms = ms;
        self
    }

    /// Set the bucket count for duration ranges
    pub fn duration_target_samples(mut self, samples: usize) -> Self {
        self.duration_target_samples = samples;
        self
    }

    /// Set the raw fetch multiplier
    pub fn fetch_oversampling(mut self, factor: usize) -> Self {
        self.fetch_oversampling = factor;
        self
    }

    /// Set the fan-out bound
    pub fn max_concurrent_queries(mut self, queries: usize) -> Self {
        self.max_concurrent_queries = queries;
        self
    }

    /// Set the demo recording offset
    pub fn demo_time_offset_ms(mut self, ms: i64) -> Self {
        self.demo_time_offset_ms = ms;
        self
    }

    /// Set decimals kept on demo values
    pub fn round_decimals(mut self, decimals: u32) -> Self {
        self.round_decimals = decimals;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(r#"{ "maxConcurrentQueries": 2 }"#).unwrap();
        assert_eq!(config.max_concurrent_queries, 2);
        assert_eq!(config.base_sample_period_ms, DEFAULT_BASE_SAMPLE_PERIOD_MS);
        assert_eq!(config.round_decimals, 2);
    }

    #[test]
    fn rejects_zero_concurrency() {
        assert!(PipelineConfig::from_json(r#"{ "maxConcurrentQueries": 0 }"#).is_err());
        assert!(PipelineConfig::from_json(r#"{ "fetchOversampling": 0 }"#).is_err());
        assert!(PipelineConfig::from_json("not json").is_err());
    }

    #[test]
    fn builder_overrides() {
        let config = PipelineConfig::default()
            .base_sample_period_ms(250)
            .duration_target_samples(50)
            .fetch_oversampling(4)
            .demo_time_offset_ms(0)
            .round_decimals(3);
        assert_eq!(config.round_decimals, 3);
        assert_eq!(config.base_sample_period_ms, 250);
        assert_eq!(config.duration_target_samples, 50);
        assert_eq!(config.fetch_oversampling, 4);
        assert_eq!(config.demo_time_offset_ms, 0);
        assert!(config.validate().is_ok());
    }
}
