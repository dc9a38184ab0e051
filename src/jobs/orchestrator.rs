// src/jobs/orchestrator.rs
//! Fan-out to every adapter as its own task, joined against one shared deadline.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::time::{timeout_at, Instant};

use crate::jobs::types::{
    RawPosting, SourceAdapter, SourceError, SourceErrorCause, SourceQuery, SourceReport,
    SourceStatus,
};

/// Per-source result collected before any decision is taken.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: &'static str,
    pub result: Result<Vec<RawPosting>, SourceError>,
}

impl SourceOutcome {
    pub fn report(&self) -> SourceReport {
        let status = match &self.result {
            Ok(items) => SourceStatus::Ok { count: items.len() },
            Err(e) => SourceStatus::Failed {
                cause: e.cause,
                message: e.message.clone(),
            },
        };
        SourceReport {
            source: self.source.to_string(),
            status,
        }
    }
}

/// Run all adapters concurrently. Each one gets a single attempt; whatever has
/// not finished when `deadline` elapses is reported as `Timeout` and detached.
/// Outcomes come back in adapter order.
pub async fn fetch_all(
    adapters: &[Arc<dyn SourceAdapter>],
    query: &SourceQuery,
    deadline: Duration,
) -> Vec<SourceOutcome> {
    let until = Instant::now() + deadline;
    let query = Arc::new(query.clone());

    let handles: Vec<_> = adapters
        .iter()
        .map(|adapter| {
            let adapter = Arc::clone(adapter);
            let query = Arc::clone(&query);
            let name = adapter.name();
            (name, tokio::spawn(async move { adapter.fetch(&query).await }))
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (source, handle) in handles {
        let result = match timeout_at(until, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(SourceError::new(
                source,
                SourceErrorCause::InvalidResponse,
                format!("adapter task failed: {join_err}"),
            )),
            // Dropping the JoinHandle detaches the task; its result is discarded.
            Err(_elapsed) => Err(SourceError::new(
                source,
                SourceErrorCause::Timeout,
                format!("no result within {}ms deadline", deadline.as_millis()),
            )),
        };

        match &result {
            Ok(items) => {
                counter!("jobs_fetched_total", "source" => source).increment(items.len() as u64);
                tracing::debug!(target: "jobs", source, count = items.len(), "source ok");
            }
            Err(e) => {
                counter!(
                    "jobs_source_errors_total",
                    "source" => source,
                    "cause" => e.cause.as_str()
                )
                .increment(1);
                tracing::warn!(
                    target: "jobs",
                    source,
                    cause = %e.cause,
                    error = %e.message,
                    "source failed"
                );
            }
        }

        outcomes.push(SourceOutcome { source, result });
    }

    outcomes
}
