//! SmartCV job finder: binary entrypoint.
//! Boots the Axum HTTP server on the Shuttle runtime.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    smartcv_job_finder::enable_dev_tracing();

    let router = smartcv_job_finder::app().await?;
    Ok(router.into())
}
