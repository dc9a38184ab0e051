// src/jobs/providers/adzuna.rs
//! Adzuna search API. Needs an app id/key pair; without one the adapter
//! reports `AuthMissing` and never touches the network.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::{build_client, get_json, page_size};
use crate::config::{AdzunaCredentials, AppConfig};
use crate::jobs::types::{RawPosting, SourceAdapter, SourceError, SourceErrorCause, SourceQuery};

pub const NAME: &str = "Adzuna";
pub const DEFAULT_BASE_URL: &str = "https://api.adzuna.com";

#[derive(Debug, Deserialize)]
struct Payload {
    // Decoded per item; a malformed result is skipped.
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Named {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    company: Option<Named>,
    location: Option<Named>,
    description: Option<String>,
    redirect_url: Option<String>,
    created: Option<String>,
}

pub struct AdzunaAdapter {
    client: Client,
    base_url: String,
    credentials: Option<AdzunaCredentials>,
    country: String,
    default_location: String,
}

impl AdzunaAdapter {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, cfg)
    }

    pub fn with_base_url(base_url: &str, cfg: &AppConfig) -> Self {
        Self {
            client: build_client(cfg.source_timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: cfg.adzuna.clone(),
            country: cfg.adzuna_country.clone(),
            default_location: cfg.default_location.clone(),
        }
    }

    fn convert(payload: Payload, query: &SourceQuery) -> Vec<RawPosting> {
        payload
            .results
            .into_iter()
            .filter_map(|v| serde_json::from_value::<Item>(v).ok())
            .take(query.limit)
            .map(|it| RawPosting {
                source: NAME,
                title: it.title,
                company: it.company.and_then(|c| c.display_name),
                location: it
                    .location
                    .and_then(|l| l.display_name)
                    .or_else(|| query.location.clone()),
                description: it.description,
                apply_link: it.redirect_url,
                posted_at: it
                    .created
                    .as_deref()
                    .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                    .map(|d| d.with_timezone(&Utc)),
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for AdzunaAdapter {
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawPosting>, SourceError> {
        let Some(creds) = &self.credentials else {
            return Err(SourceError::new(
                NAME,
                SourceErrorCause::AuthMissing,
                "ADZUNA_APP_ID / ADZUNA_APP_KEY not configured",
            ));
        };

        let location = query
            .location
            .as_deref()
            .unwrap_or(self.default_location.as_str());
        let per_page = page_size(query.limit).to_string();
        let keywords = query.keyword_string();

        let request = self
            .client
            .get(format!("{}/v1/api/jobs/{}/search/1", self.base_url, self.country))
            .query(&[
                ("app_id", creds.app_id.as_str()),
                ("app_key", creds.app_key.as_str()),
                ("what", keywords.as_str()),
                ("where", location),
                ("results_per_page", per_page.as_str()),
                ("content-type", "application/json"),
            ]);

        let payload: Payload = get_json(NAME, request).await?;
        Ok(Self::convert(payload, query))
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> SourceQuery {
        SourceQuery {
            keywords: vec!["Data Analyst".into()],
            location: Some("London".into()),
            limit: 1,
        }
    }

    #[tokio::test]
    async fn missing_credentials_short_circuit() {
        let adapter = AdzunaAdapter::from_config(&AppConfig::default());
        let err = adapter.fetch(&query()).await.unwrap_err();
        assert_eq!(err.cause, SourceErrorCause::AuthMissing);
        assert_eq!(err.source_name, NAME);
    }

    #[test]
    fn nested_names_are_flattened_and_limit_applies() {
        let payload: Payload = serde_json::from_str(
            r#"{"results":[
                {"title":"Analyst","company":{"display_name":"Acme"},"location":{},
                 "redirect_url":"https://adzuna.co.uk/r/1","created":"2024-05-01T08:00:00Z"},
                {"title":"Second","redirect_url":"https://adzuna.co.uk/r/2"}
            ]}"#,
        )
        .unwrap();
        let out = AdzunaAdapter::convert(payload, &query());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].company.as_deref(), Some("Acme"));
        assert_eq!(out[0].location.as_deref(), Some("London"));
        assert!(out[0].posted_at.is_some());
    }

    #[test]
    fn malformed_result_does_not_hide_good_ones() {
        let payload: Payload = serde_json::from_str(
            r#"{"results":[
                {"title":["not","a","string"],"redirect_url":"https://adzuna.co.uk/r/0"},
                null,
                {"title":"Analyst","company":{"display_name":"Acme"},
                 "redirect_url":"https://adzuna.co.uk/r/1"}
            ]}"#,
        )
        .unwrap();
        let out = AdzunaAdapter::convert(payload, &query());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title.as_deref(), Some("Analyst"));
    }
}
