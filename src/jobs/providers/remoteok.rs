// src/jobs/providers/remoteok.rs
//! Remote OK public feed (no key, no search). The whole feed is fetched and
//! filtered client-side; the first array element is a legal/metadata notice.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{build_client, get_json, matches_any_keyword, non_empty, tags_to_string};
use crate::jobs::types::{RawPosting, SourceAdapter, SourceError, SourceErrorCause, SourceQuery};

pub const NAME: &str = "Remote OK";
pub const DEFAULT_BASE_URLS: [&str; 2] = ["https://remoteok.com/api", "https://remoteok.io/api"];

#[derive(Debug, Deserialize)]
struct Item {
    position: Option<String>,
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    #[serde(default)]
    tags: Option<serde_json::Value>,
    description: Option<String>,
    url: Option<String>,
    epoch: Option<i64>,
    date: Option<String>,
}

impl Item {
    fn posted_at(&self) -> Option<DateTime<Utc>> {
        if let Some(ts) = self.epoch {
            if let Some(dt) = DateTime::from_timestamp(ts, 0) {
                return Some(dt);
            }
        }
        self.date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc))
    }
}

pub struct RemoteOkAdapter {
    client: Client,
    urls: Vec<String>,
}

impl RemoteOkAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self::with_urls(DEFAULT_BASE_URLS.iter().map(|s| s.to_string()).collect(), timeout)
    }

    /// Feed URLs tried in order until one answers with JSON.
    pub fn with_urls(urls: Vec<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            urls,
        }
    }

    fn convert(payload: Vec<serde_json::Value>, query: &SourceQuery) -> Vec<RawPosting> {
        let tokens = query.keyword_tokens();
        let mut out = Vec::new();
        for value in payload.into_iter().skip(1) {
            if !value.is_object() {
                continue;
            }
            let Ok(it) = serde_json::from_value::<Item>(value) else {
                continue;
            };
            let posted_at = it.posted_at();
            let title = non_empty(it.position).or(it.title);
            let location = non_empty(it.location).or(Some("Remote".into()));
            let hay = format!(
                "{} {} {} {} {}",
                title.as_deref().unwrap_or_default(),
                it.company.as_deref().unwrap_or_default(),
                location.as_deref().unwrap_or_default(),
                tags_to_string(it.tags.as_ref()),
                it.description.as_deref().unwrap_or_default(),
            );
            if !matches_any_keyword(&tokens, &hay) {
                continue;
            }
            out.push(RawPosting {
                source: NAME,
                title,
                company: it.company,
                location,
                description: it.description,
                apply_link: it.url,
                posted_at,
            });
            if out.len() >= query.limit {
                break;
            }
        }
        out
    }
}

#[async_trait]
impl SourceAdapter for RemoteOkAdapter {
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawPosting>, SourceError> {
        let mut last_err = SourceError::new(
            NAME,
            SourceErrorCause::Unreachable,
            "no feed url configured",
        );

        for url in &self.urls {
            match get_json::<serde_json::Value>(NAME, self.client.get(url)).await {
                Ok(serde_json::Value::Array(items)) => return Ok(Self::convert(items, query)),
                Ok(_) => {
                    last_err = SourceError::new(
                        NAME,
                        SourceErrorCause::InvalidResponse,
                        "feed is not a JSON array",
                    );
                }
                Err(e) => {
                    tracing::debug!(target: "jobs", %url, error = %e, "remote ok mirror failed");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn skips_metadata_and_non_objects() {
        let feed = vec![
            json!({"legal": "notice"}),
            json!("garbage"),
            json!({"position": "Rust Engineer", "company": "Oxide", "tags": ["rust"],
                   "url": "https://remoteok.com/l/1", "epoch": 1_700_000_000}),
            json!({"position": "Designer", "company": "Pixel", "url": "https://remoteok.com/l/2"}),
        ];
        let q = SourceQuery {
            keywords: vec!["rust".into()],
            location: None,
            limit: 5,
        };
        let out = RemoteOkAdapter::convert(feed, &q);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title.as_deref(), Some("Rust Engineer"));
        assert_eq!(out[0].location.as_deref(), Some("Remote"));
        assert_eq!(out[0].posted_at.map(|d| d.timestamp()), Some(1_700_000_000));
    }
}
