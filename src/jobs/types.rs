// src/jobs/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::profile::Profile;

/// Keywords are cut at this many characters when joined into one search string.
pub const KEYWORDS_MAX_CHARS: usize = 120;
pub const FALLBACK_KEYWORDS: &str = "software developer";

/// What one search request asks every source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub keywords: Vec<String>,
    pub location: Option<String>,
    pub limit: usize,
}

impl SourceQuery {
    /// Top 3 titles, top 5 skills and top 2 job types, de-duplicated case-insensitively.
    pub fn from_profile(profile: &Profile, location: Option<&str>, limit: usize) -> Self {
        let candidates = profile
            .job_titles
            .iter()
            .take(3)
            .chain(profile.skills.iter().take(5))
            .chain(profile.recommended_job_types.iter().take(2));

        let mut seen = std::collections::HashSet::new();
        let mut keywords = Vec::new();
        for c in candidates {
            let t = c.trim();
            if t.is_empty() {
                continue;
            }
            if seen.insert(t.to_lowercase()) {
                keywords.push(t.to_string());
            }
        }

        let location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        Self {
            keywords,
            location,
            limit,
        }
    }

    /// Space-joined keywords as sent to providers.
    pub fn keyword_string(&self) -> String {
        let joined: String = self
            .keywords
            .join(" ")
            .chars()
            .take(KEYWORDS_MAX_CHARS)
            .collect();
        let joined = joined.trim();
        if joined.is_empty() {
            FALLBACK_KEYWORDS.to_string()
        } else {
            joined.to_string()
        }
    }

    /// Lowercased single tokens of `keyword_string()`, used by client-side filters.
    pub fn keyword_tokens(&self) -> Vec<String> {
        self.keyword_string()
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// Adapter output before normalization. Fields are exactly what the provider sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPosting {
    pub source: &'static str,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub apply_link: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
}

/// Canonical, source-agnostic job listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub apply_link: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorCause {
    Timeout,
    RateLimited,
    InvalidResponse,
    AuthMissing,
    Unreachable,
}

impl SourceErrorCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::InvalidResponse => "invalid_response",
            Self::AuthMissing => "auth_missing",
            Self::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for SourceErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One adapter's failure. Always recovered by the orchestrator.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("{source_name}: {cause} ({message})")]
pub struct SourceError {
    #[serde(rename = "source")]
    pub source_name: String,
    pub cause: SourceErrorCause,
    pub message: String,
}

impl SourceError {
    pub fn new(source: &str, cause: SourceErrorCause, message: impl Into<String>) -> Self {
        Self {
            source_name: source.to_string(),
            cause,
            message: message.into(),
        }
    }
}

/// Returned only when no source produced results.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("all {} job sources failed", .causes.len())]
pub struct AllSourcesFailedError {
    pub causes: Vec<SourceError>,
}

#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawPosting>, SourceError>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Ok { count: usize },
    Failed { cause: SourceErrorCause, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(flatten)]
    pub status: SourceStatus,
}

impl SourceReport {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, SourceStatus::Ok { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub fetched: usize,
    pub dropped: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub jobs: Vec<Posting>,
    pub sources: Vec<SourceReport>,
    pub stats: PipelineStats,
}
