// src/jobs/providers/remotive.rs
//! Remotive public API (no key). Remote-only board, so a missing location means "Remote".

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{build_client, get_json, matches_any_keyword, non_empty, page_size};
use crate::jobs::types::{RawPosting, SourceAdapter, SourceError, SourceQuery};

pub const NAME: &str = "Remotive";
pub const DEFAULT_BASE_URL: &str = "https://remotive.com";

#[derive(Debug, Deserialize)]
struct Payload {
    // Items are decoded one by one so a single malformed entry is skipped.
    #[serde(default)]
    jobs: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    company_name: Option<String>,
    candidate_required_location: Option<String>,
    description: Option<String>,
    url: Option<String>,
    publication_date: Option<String>,
}

/// Remotive dates come as `2024-03-01T10:20:30` (no offset) or RFC 3339.
fn parse_publication_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|n| n.and_utc())
}

pub struct RemotiveAdapter {
    client: Client,
    base_url: String,
}

impl RemotiveAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn convert(payload: Payload, query: &SourceQuery) -> Vec<RawPosting> {
        let tokens = query.keyword_tokens();
        let mut out = Vec::new();
        for value in payload.jobs.unwrap_or_default() {
            let Ok(it) = serde_json::from_value::<Item>(value) else {
                continue;
            };
            let location = non_empty(it.candidate_required_location).or(Some("Remote".into()));
            let hay = format!(
                "{} {} {} {}",
                it.title.as_deref().unwrap_or_default(),
                it.company_name.as_deref().unwrap_or_default(),
                it.description.as_deref().unwrap_or_default(),
                location.as_deref().unwrap_or_default(),
            );
            if !matches_any_keyword(&tokens, &hay) {
                continue;
            }
            out.push(RawPosting {
                source: NAME,
                title: it.title,
                company: it.company_name,
                location,
                description: it.description,
                apply_link: it.url,
                posted_at: it.publication_date.as_deref().and_then(parse_publication_date),
            });
            if out.len() >= query.limit {
                break;
            }
        }
        out
    }
}

#[async_trait]
impl SourceAdapter for RemotiveAdapter {
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawPosting>, SourceError> {
        let limit = page_size(query.limit).to_string();
        let request = self
            .client
            .get(format!("{}/api/remote-jobs", self.base_url))
            .query(&[("search", query.keyword_string().as_str()), ("limit", limit.as_str())]);

        let payload: Payload = get_json(NAME, request).await?;
        Ok(Self::convert(payload, query))
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
