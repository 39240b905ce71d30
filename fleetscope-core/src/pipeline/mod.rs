//! Telemetry Query and Resampling Pipeline
//!
//! ## Overview
//!
//! One call turns a widget's filter request into a ready-to-render
//! response. Stages run in a fixed order; each is a plain function over
//! request-scoped values, so stages can be tested in isolation.
//!
//! ## Architecture
//!
//! ```text
//! Planner → Fetcher → Grouper → Binner → Vertical / Single → Demo → Formatter
//!             ↓          ↓                                            ↓
//!         store I/O   end-of-data (true / false / indefinite) ──→ Probe (store I/O)
//! ```
//!
//! ## Module Organization
//!
//! - `planner` - Time window and bucket layout
//! - `fetcher` - Bounded concurrent store queries, single-widget short-circuit
//! - `grouper` - Metadata resolution, canonical names, preliminary end-of-data
//! - `binner` - Horizontal (same-sensor) merging
//! - `vertical` - Cross-sensor alignment and aggregation
//! - `single` - Single-value widgets
//! - `demo` - Synthetic demo transform and rounding
//! - `formatter` - Cache/display/new partitioning
//! - `probe` - End-of-data existence queries

use std::sync::Arc;

use log::debug;
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;
use crate::errors::TelemetryResult;
use crate::model::{SensorDataResponse, SensorFilterRequest, SensorMetadata, WidgetCategory};
use crate::time::TimeSource;
use crate::traits::SampleSource;

pub mod binner;
pub mod demo;
pub mod fetcher;
pub mod formatter;
pub mod grouper;
pub mod planner;
pub mod probe;
pub mod single;
pub mod vertical;

pub use grouper::EndOfData;
pub use planner::TimeWindow;

/// Telemetry pipeline bound to a sample source and a clock
///
/// Cheap to share: the source is an `Arc` and the pipeline holds no
/// per-request state.
pub struct TelemetryPipeline<S: ?Sized, T> {
    source: Arc<S>,
    clock: T,
    config: PipelineConfig,
}

impl<S, T> TelemetryPipeline<S, T>
where
    S: SampleSource + ?Sized + 'static,
    T: TimeSource,
{
    /// Pipeline reading from `source`
    pub fn new(source: Arc<S>, clock: T, config: PipelineConfig) -> Self {
        Self { source, clock, config }
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compute the response for one widget refresh
    ///
    /// `metadata` holds the catalog entries of the selected sensors; sensors
    /// without an entry are excluded with a warning. `rng` only feeds the
    /// synthetic demo jitter. Cancelling `cancel` aborts every outstanding
    /// store query and fails the whole request.
    pub async fn compute_sensor_data_response<R: Rng>(
        &self,
        filters: &SensorFilterRequest,
        metadata: &[SensorMetadata],
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> TelemetryResult<SensorDataResponse> {
        self.config.validate()?;
        filters.validate()?;
        let window = planner::plan(filters, &self.clock, &self.config)?;
        let resolved = grouper::resolve_sensors(filters, metadata);

        let outcome = fetcher::fetch(
            &self.source,
            filters.category,
            &resolved,
            &window,
            &self.config,
            cancel,
        )
        .await?;
        let selected = outcome.selected;

        let grouped = grouper::group(filters, &resolved, outcome, &window);
        let binned = binner::bin_all(&grouped.series, &window)?;

        let mut samples = match filters.category {
            WidgetCategory::Multi => vertical::aggregate(&binned, filters.aggregation.as_ref())?,
            WidgetCategory::Single => single::latest(&binned),
        };
        demo::finalize(
            &mut samples,
            filters.request_type,
            window.offset,
            self.config.round_decimals,
            rng,
        );

        let earliest = grouped.min_sample_time.unwrap_or(window.min_time);
        let is_last_batch = match grouped.end_of_data {
            EndOfData::True => true,
            EndOfData::False => false,
            EndOfData::Indefinite => {
                let targets = match (filters.category, selected) {
                    (WidgetCategory::Single, Some(index)) => {
                        probe::probe_queries(&resolved[index..=index], earliest)
                    }
                    _ => probe::probe_queries(&resolved, earliest),
                };
                !probe::history_exists(&self.source, targets, &self.config, cancel).await?
            }
        };

        debug!(
            "computed {} samples for {} groups, last batch {}",
            samples.len(),
            filters.groups.len(),
            is_last_batch
        );

        Ok(formatter::format(
            samples,
            filters.request_type,
            &filters.hints,
            earliest + window.offset,
            is_last_batch,
        ))
    }
}
