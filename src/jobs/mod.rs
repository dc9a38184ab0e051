// src/jobs/mod.rs
//! Job aggregation pipeline: adapters -> orchestrator -> normalize -> dedup -> rank.

pub mod dedup;
pub mod normalize;
pub mod orchestrator;
pub mod providers;
pub mod rank;
pub mod types;

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;

use crate::config::{AppConfig, SourceKind};
use crate::jobs::providers::{AdzunaAdapter, ArbeitnowAdapter, RemoteOkAdapter, RemotiveAdapter};
use crate::jobs::rank::{effective_limit, RankWeights};
use crate::jobs::types::{
    AggregationResult, AllSourcesFailedError, PipelineStats, RawPosting, SourceAdapter,
    SourceQuery,
};
use crate::profile::Profile;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("jobs_aggregations_total", "find_jobs calls.");
        describe_counter!("jobs_fetched_total", "Raw postings returned by sources.");
        describe_counter!(
            "jobs_dropped_total",
            "Raw postings dropped by normalization (no usable apply link)."
        );
        describe_counter!("jobs_dedup_total", "Postings collapsed as duplicates.");
        describe_counter!("jobs_source_errors_total", "Source failures by cause.");
        describe_counter!(
            "jobs_all_sources_failed_total",
            "Aggregations where no source produced results."
        );
        describe_histogram!("jobs_source_fetch_ms", "Provider round-trip in milliseconds.");
        describe_histogram!("jobs_pipeline_ms", "Full find_jobs duration in milliseconds.");
    });
}

/// Build the configured adapters, in configured priority order.
pub fn adapters_from_config(cfg: &AppConfig) -> Vec<Arc<dyn SourceAdapter>> {
    cfg.sources
        .iter()
        .map(|kind| -> Arc<dyn SourceAdapter> {
            match kind {
                SourceKind::Remotive => Arc::new(RemotiveAdapter::new(cfg.source_timeout)),
                SourceKind::RemoteOk => Arc::new(RemoteOkAdapter::new(cfg.source_timeout)),
                SourceKind::Arbeitnow => Arc::new(ArbeitnowAdapter::new(cfg.source_timeout)),
                SourceKind::Adzuna => Arc::new(AdzunaAdapter::from_config(cfg)),
            }
        })
        .collect()
}

/// The single operation exposed to the request layer.
pub struct JobFinder {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    deadline: Duration,
    weights: RankWeights,
}

impl JobFinder {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, deadline: Duration, weights: RankWeights) -> Self {
        Self {
            adapters,
            deadline,
            weights,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(
            adapters_from_config(cfg),
            cfg.deadline,
            RankWeights::load_from_file(&cfg.ranking_config_path),
        )
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Query every source, then normalize, dedup and rank.
    /// Fails only when every configured source failed.
    pub async fn find_jobs(
        &self,
        profile: &Profile,
        location: Option<&str>,
        limit: Option<i64>,
    ) -> Result<AggregationResult, AllSourcesFailedError> {
        ensure_metrics_described();
        counter!("jobs_aggregations_total").increment(1);
        let t0 = Instant::now();

        let limit = effective_limit(limit);
        let query = SourceQuery::from_profile(profile, location, limit);
        tracing::info!(
            target: "jobs",
            keywords = %query.keyword_string(),
            location = ?query.location,
            limit,
            sources = self.adapters.len(),
            "aggregation started"
        );

        let outcomes = orchestrator::fetch_all(&self.adapters, &query, self.deadline).await;
        let sources = outcomes.iter().map(|o| o.report()).collect::<Vec<_>>();

        let mut raw: Vec<RawPosting> = Vec::new();
        let mut causes = Vec::new();
        let mut any_ok = false;
        for outcome in outcomes {
            match outcome.result {
                Ok(mut items) => {
                    any_ok = true;
                    raw.append(&mut items);
                }
                Err(e) => causes.push(e),
            }
        }

        if !any_ok {
            counter!("jobs_all_sources_failed_total").increment(1);
            tracing::warn!(target: "jobs", failed = causes.len(), "all job sources failed");
            return Err(AllSourcesFailedError { causes });
        }

        let fetched = raw.len();
        let (normalized, dropped) = normalize::normalize_all(&raw);
        let priority = self.source_names();
        let (unique, duplicates) = dedup::dedup_postings(normalized, &priority);
        let jobs = rank::rank_postings(unique, profile, query.location.as_deref(), limit, &self.weights);

        counter!("jobs_dropped_total").increment(dropped as u64);
        counter!("jobs_dedup_total").increment(duplicates as u64);
        histogram!("jobs_pipeline_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        tracing::info!(
            target: "jobs",
            fetched,
            dropped,
            duplicates,
            returned = jobs.len(),
            failed_sources = causes.len(),
            "aggregation finished"
        );

        Ok(AggregationResult {
            jobs,
            sources,
            stats: PipelineStats {
                fetched,
                dropped,
                duplicates,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapters_follow_configured_order() {
        let cfg = AppConfig {
            sources: vec![SourceKind::Adzuna, SourceKind::Remotive],
            ..AppConfig::default()
        };
        let finder = JobFinder::from_config(&cfg);
        assert_eq!(finder.source_names(), vec!["Adzuna", "Remotive"]);
    }

    #[test]
    fn default_config_has_three_free_sources_and_adzuna() {
        let names: Vec<&str> = adapters_from_config(&AppConfig::default())
            .iter()
            .map(|a| a.name())
            .collect();
        assert_eq!(names, vec!["Remotive", "Remote OK", "Arbeitnow", "Adzuna"]);
    }
}
