// src/jobs/providers/arbeitnow.rs
//! Arbeitnow job board API (no key, no search). Filtered client-side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{build_client, get_json, matches_any_keyword, tags_to_string};
use crate::jobs::types::{RawPosting, SourceAdapter, SourceError, SourceErrorCause, SourceQuery};

pub const NAME: &str = "Arbeitnow";
pub const DEFAULT_BASE_URL: &str = "https://www.arbeitnow.com";

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    company_name: Option<String>,
    location: Option<String>,
    #[serde(default)]
    tags: Option<serde_json::Value>,
    description: Option<String>,
    url: Option<String>,
    created_at: Option<i64>,
}

pub struct ArbeitnowAdapter {
    client: Client,
    base_url: String,
}

impl ArbeitnowAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn convert(data: Vec<serde_json::Value>, query: &SourceQuery) -> Vec<RawPosting> {
        let tokens = query.keyword_tokens();
        let mut out = Vec::new();
        for value in data {
            let Ok(it) = serde_json::from_value::<Item>(value) else {
                continue;
            };
            let hay = format!(
                "{} {} {} {} {}",
                it.title.as_deref().unwrap_or_default(),
                it.company_name.as_deref().unwrap_or_default(),
                it.location.as_deref().unwrap_or_default(),
                tags_to_string(it.tags.as_ref()),
                it.description.as_deref().unwrap_or_default(),
            );
            if !matches_any_keyword(&tokens, &hay) {
                continue;
            }
            out.push(RawPosting {
                source: NAME,
                title: it.title,
                company: it.company_name,
                location: it.location,
                description: it.description,
                apply_link: it.url,
                posted_at: it.created_at.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            });
            if out.len() >= query.limit {
                break;
            }
        }
        out
    }
}

/// The board wraps its list as `{"data": [...]}`; a null or absent `data` means no jobs.
fn data_items(payload: serde_json::Value) -> Result<Vec<serde_json::Value>, SourceError> {
    use serde_json::Value;

    let invalid = |msg: &str| SourceError::new(NAME, SourceErrorCause::InvalidResponse, msg);
    let Value::Object(mut body) = payload else {
        return Err(invalid("body is not a JSON object"));
    };
    match body.remove("data") {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(_) => Err(invalid("`data` is not an array")),
    }
}

#[async_trait]
impl SourceAdapter for ArbeitnowAdapter {
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawPosting>, SourceError> {
        let request = self
            .client
            .get(format!("{}/api/job-board-api", self.base_url));
        let payload: serde_json::Value = get_json(NAME, request).await?;
        let data = data_items(payload)?;

        let out = Self::convert(data, query);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
