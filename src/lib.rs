// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod extract;
pub mod jobs;
pub mod metrics;
pub mod profile;

pub use crate::api::router;
pub use crate::config::AppConfig;
pub use crate::jobs::JobFinder;

use axum::Router;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs for development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - JOBS_DEV_LOG=1
pub fn enable_dev_tracing() {
    let dev_flag = std::env::var("JOBS_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobs=debug,info"));

    // The Shuttle runtime may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

/// Full in-process app: API routes plus `/metrics`, configured from the environment.
pub async fn app() -> anyhow::Result<Router> {
    Ok(app_with_config(AppConfig::from_env()))
}

pub fn app_with_config(config: AppConfig) -> Router {
    let metrics = crate::metrics::Metrics::init();
    tracing::info!(
        sources = ?config.sources,
        adzuna = config.adzuna.is_some(),
        deadline_ms = config.deadline.as_millis() as u64,
        "job finder configured"
    );
    router(api::AppState::from_config(config)).merge(metrics.router())
}
