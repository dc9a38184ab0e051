// tests/metrics.rs
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use serial_test::serial;
use tower::ServiceExt;

use smartcv_job_finder::jobs::rank::RankWeights;
use smartcv_job_finder::jobs::types::{
    RawPosting, SourceAdapter, SourceError, SourceErrorCause, SourceQuery,
};
use smartcv_job_finder::jobs::JobFinder;
use smartcv_job_finder::metrics::Metrics;
use smartcv_job_finder::profile::Profile;

struct Up;

#[async_trait]
impl SourceAdapter for Up {
    async fn fetch(&self, _q: &SourceQuery) -> Result<Vec<RawPosting>, SourceError> {
        Ok(vec![RawPosting {
            source: "Up",
            title: Some("Rust Engineer".into()),
            apply_link: Some("https://up.example/1".into()),
            ..RawPosting::default()
        }])
    }
    fn name(&self) -> &'static str {
        "Up"
    }
}

struct Down;

#[async_trait]
impl SourceAdapter for Down {
    async fn fetch(&self, _q: &SourceQuery) -> Result<Vec<RawPosting>, SourceError> {
        Err(SourceError::new("Down", SourceErrorCause::RateLimited, "429"))
    }
    fn name(&self) -> &'static str {
        "Down"
    }
}

async fn render(metrics: &Metrics) -> String {
    let resp = metrics
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
#[serial]
async fn metrics_endpoint_contains_pipeline_series() {
    let metrics = Metrics::init();
    let finder = JobFinder::new(
        vec![Arc::new(Up), Arc::new(Down)],
        Duration::from_secs(2),
        RankWeights::default(),
    );
    finder
        .find_jobs(&Profile::default(), None, None)
        .await
        .expect("one source up");

    let text = render(&metrics).await;
    for needle in [
        "jobs_aggregations_total",
        "jobs_fetched_total",
        "jobs_source_errors_total",
        "jobs_pipeline_ms",
    ] {
        assert!(text.contains(needle), "missing {needle} in:\n{text}");
    }
    assert!(text.contains(r#"cause="rate_limited""#));
}

#[tokio::test]
#[serial]
async fn app_from_env_serves_health_and_metrics() {
    std::env::set_var("JOB_SOURCES", "remotive");
    std::env::set_var("CORS_ORIGINS", "https://cv.example");

    let app = smartcv_job_finder::app()
        .await
        .expect("app() should build Router in tests");

    let resp = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    std::env::remove_var("JOB_SOURCES");
    std::env::remove_var("CORS_ORIGINS");
}
