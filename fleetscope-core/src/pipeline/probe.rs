//! End-of-data probe
//!
//! Asks the store whether any selected sensor has samples strictly older
//! than the earliest sample returned. Queries run concurrently (bounded)
//! and the first positive answer stops the rest.

use std::sync::Arc;

use log::debug;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;
use crate::errors::{TelemetryError, TelemetryResult};
use crate::pipeline::grouper::ResolvedFilter;
use crate::time::Timestamp;
use crate::traits::{ProbeQuery, SampleSource};

/// Probe queries for `filters`, all bounded by `before`
pub fn probe_queries<'a>(
    filters: impl IntoIterator<Item = &'a ResolvedFilter>,
    before: Timestamp,
) -> Vec<ProbeQuery> {
    filters
        .into_iter()
        .map(|filter| ProbeQuery {
            group_key: filter.group_key.clone(),
            selector: filter.selector(),
            before,
        })
        .collect()
}

/// Whether any query finds older history
pub async fn history_exists<S>(
    source: &Arc<S>,
    queries: Vec<ProbeQuery>,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> TelemetryResult<bool>
where
    S: SampleSource + ?Sized + 'static,
{
    if cancel.is_cancelled() {
        return Err(TelemetryError::Cancelled);
    }

    let total = queries.len();
    let permits = Arc::new(Semaphore::new(config.max_concurrent_queries.max(1)));
    let mut tasks = JoinSet::new();

    for query in queries {
        let source = Arc::clone(source);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| TelemetryError::TaskFailed("probe permits closed".into()))?;
            source
                .exists_before(&query)
                .await
                .map_err(|source| TelemetryError::FetchFailure {
                    sensors: query.selector.sensor_names().to_vec(),
                    group: query.group_key,
                    source,
                })
        });
    }

    let mut answered = 0;
    loop {
        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TelemetryError::Cancelled),
            joined = tasks.join_next() => joined,
        };

        match joined {
            None => break,
            Some(Ok(Ok(true))) => {
                debug!("probe found older history after {} of {} answers", answered + 1, total);
                return Ok(true);
            }
            Some(Ok(Ok(false))) => answered += 1,
            Some(Ok(Err(err))) => return Err(err),
            Some(Err(join_err)) => return Err(TelemetryError::TaskFailed(join_err.to_string())),
        }
    }

    debug!("probe found no older history across {} queries", total);
    Ok(false)
}
