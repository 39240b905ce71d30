//! Raw sample fetching
//!
//! One store query per resolved filter. Multi widgets fan the queries out
//! over a bounded `JoinSet`; single widgets walk the filters in declaration
//! order and stop at the first one that returns data, so later groups are
//! never queried.
//!
//! Single widgets run one query at a time regardless of
//! `max_concurrent_queries`. Any look-ahead would query groups past the
//! first match, so the latency of a long run of empty groups is accepted.
//!
//! Cancellation is cooperative: when the caller's token fires, the
//! `JoinSet` is dropped (aborting every outstanding query) and the whole
//! request fails with [`TelemetryError::Cancelled`].

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;
use crate::errors::{TelemetryError, TelemetryResult};
use crate::model::WidgetCategory;
use crate::pipeline::grouper::ResolvedFilter;
use crate::pipeline::planner::TimeWindow;
use crate::traits::{FetchedSamples, SampleQuery, SampleSource};

/// Samples fetched for one resolved filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterFetch {
    /// Index into the resolved filter list
    pub filter_index: usize,
    /// What the store returned
    pub samples: FetchedSamples,
}

/// All fetches of a request, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    /// Completed fetches
    pub fetches: Vec<FilterFetch>,
    /// For single widgets, the filter that produced the first match
    pub selected: Option<usize>,
}

/// Build the store query for one resolved filter
pub fn query_for(filter: &ResolvedFilter, window: &TimeWindow, config: &PipelineConfig) -> SampleQuery {
    SampleQuery {
        group_key: filter.group_key.clone(),
        selector: filter.selector(),
        min_time: window.min_time,
        max_time: window.max_time,
        limit_per_sensor: window.fetch_limit(config.fetch_oversampling),
    }
}

/// Fetch raw samples for every resolved filter
pub async fn fetch<S>(
    source: &Arc<S>,
    category: WidgetCategory,
    resolved: &[ResolvedFilter],
    window: &TimeWindow,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> TelemetryResult<FetchOutcome>
where
    S: SampleSource + ?Sized + 'static,
{
    if cancel.is_cancelled() {
        return Err(TelemetryError::Cancelled);
    }

    let outcome = match category {
        WidgetCategory::Single => fetch_first_match(source, resolved, window, config, cancel).await?,
        WidgetCategory::Multi => fetch_concurrently(source, resolved, window, config, cancel).await?,
    };

    for fetch in &outcome.fetches {
        if fetch.samples.truncated {
            warn!(
                "fetch for group '{}' hit the {}-sample cap",
                resolved[fetch.filter_index].group_key,
                window.fetch_limit(config.fetch_oversampling)
            );
        }
    }
    debug!(
        "fetched {} of {} filters, selected {:?}",
        outcome.fetches.len(),
        resolved.len(),
        outcome.selected
    );
    Ok(outcome)
}

/// Query filters strictly in order until one yields a sample
async fn fetch_first_match<S>(
    source: &Arc<S>,
    resolved: &[ResolvedFilter],
    window: &TimeWindow,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> TelemetryResult<FetchOutcome>
where
    S: SampleSource + ?Sized + 'static,
{
    let mut outcome = FetchOutcome::default();

    for (filter_index, filter) in resolved.iter().enumerate() {
        let query = query_for(filter, window, config);
        let samples = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TelemetryError::Cancelled),
            result = source.fetch(&query) => result.map_err(|source| TelemetryError::FetchFailure {
                group: filter.group_key.clone(),
                sensors: filter.filter.sensor_names.clone(),
                source,
            })?,
        };

        let matched = samples.sample_count() > 0;
        outcome.fetches.push(FilterFetch { filter_index, samples });
        if matched {
            outcome.selected = Some(filter_index);
            break;
        }
    }

    Ok(outcome)
}

/// Query every filter with at most `max_concurrent_queries` in flight
async fn fetch_concurrently<S>(
    source: &Arc<S>,
    resolved: &[ResolvedFilter],
    window: &TimeWindow,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> TelemetryResult<FetchOutcome>
where
    S: SampleSource + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(config.max_concurrent_queries.max(1)));
    let mut tasks = JoinSet::new();

    for (filter_index, filter) in resolved.iter().enumerate() {
        let query = query_for(filter, window, config);
        let source = Arc::clone(source);
        let permits = Arc::clone(&permits);
        let group = filter.group_key.clone();
        let sensors = filter.filter.sensor_names.clone();

        tasks.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| TelemetryError::TaskFailed("query permits closed".into()))?;
            let samples = source
                .fetch(&query)
                .await
                .map_err(|source| TelemetryError::FetchFailure { group, sensors, source })?;
            Ok::<_, TelemetryError>(FilterFetch { filter_index, samples })
        });
    }

    let mut slots: Vec<Option<FilterFetch>> = (0..resolved.len()).map(|_| None).collect();
    loop {
        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TelemetryError::Cancelled),
            joined = tasks.join_next() => joined,
        };

        match joined {
            None => break,
            Some(Ok(Ok(fetch))) => {
                let index = fetch.filter_index;
                slots[index] = Some(fetch);
            }
            Some(Ok(Err(err))) => return Err(err),
            Some(Err(join_err)) => return Err(TelemetryError::TaskFailed(join_err.to_string())),
        }
    }

    Ok(FetchOutcome {
        fetches: slots.into_iter().flatten().collect(),
        selected: None,
    })
}
