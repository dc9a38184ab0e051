// src/jobs/providers/mod.rs
//! One adapter per job board. Provider JSON shapes stay private to each module;
//! the helpers here map transport failures onto `SourceErrorCause`.

pub mod adzuna;
pub mod arbeitnow;
pub mod remoteok;
pub mod remotive;

use std::time::{Duration, Instant};

use metrics::histogram;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::jobs::types::{SourceError, SourceErrorCause};

pub use adzuna::AdzunaAdapter;
pub use arbeitnow::ArbeitnowAdapter;
pub use remoteok::RemoteOkAdapter;
pub use remotive::RemotiveAdapter;

pub const USER_AGENT: &str = "SmartCVJobFinder/1.0";

/// Providers are never asked for more than this many results per call.
pub const PROVIDER_PAGE_MAX: usize = 50;

pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = ?e, "reqwest builder failed, using default client");
            Client::new()
        })
}

pub(crate) fn classify_reqwest_error(source: &str, e: &reqwest::Error) -> SourceError {
    let cause = if e.is_timeout() {
        SourceErrorCause::Timeout
    } else if e.is_decode() {
        SourceErrorCause::InvalidResponse
    } else if let Some(status) = e.status() {
        classify_status(status)
    } else {
        SourceErrorCause::Unreachable
    };
    SourceError::new(source, cause, e.to_string())
}

pub(crate) fn classify_status(status: StatusCode) -> SourceErrorCause {
    if status == StatusCode::TOO_MANY_REQUESTS {
        SourceErrorCause::RateLimited
    } else if status.is_server_error() {
        SourceErrorCause::Unreachable
    } else {
        SourceErrorCause::InvalidResponse
    }
}

/// Send one GET and decode its JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    source: &'static str,
    request: RequestBuilder,
) -> Result<T, SourceError> {
    let t0 = Instant::now();
    let resp = request
        .send()
        .await
        .map_err(|e| classify_reqwest_error(source, &e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::new(
            source,
            classify_status(status),
            format!("HTTP {status}"),
        ));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| classify_reqwest_error(source, &e))?;

    histogram!("jobs_source_fetch_ms", "source" => source)
        .record(t0.elapsed().as_secs_f64() * 1_000.0);

    serde_json::from_str(&body).map_err(|e| {
        SourceError::new(source, SourceErrorCause::InvalidResponse, format!("json: {e}"))
    })
}

/// Minimal relevance filter for feeds without server-side search:
/// keep the item when any keyword token occurs in the haystack.
pub(crate) fn matches_any_keyword(tokens: &[String], haystack: &str) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let hay = haystack.to_lowercase();
    tokens.iter().any(|t| hay.contains(t.as_str()))
}

/// Tags arrive as a list of strings, a single string, or something else entirely.
pub(crate) fn tags_to_string(tags: Option<&serde_json::Value>) -> String {
    match tags {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        Some(serde_json::Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Treat empty strings from providers as absent.
pub(crate) fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

pub(crate) fn page_size(limit: usize) -> usize {
    limit.clamp(1, PROVIDER_PAGE_MAX)
}
