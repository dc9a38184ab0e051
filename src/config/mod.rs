// src/config/mod.rs
//! Process configuration, read once from the environment at start-up and then
//! shared read-only. `.env` is loaded by the binaries before `from_env()`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::jobs::rank::DEFAULT_RANKING_CONFIG_PATH;

pub const ENV_ADZUNA_APP_ID: &str = "ADZUNA_APP_ID";
pub const ENV_ADZUNA_APP_KEY: &str = "ADZUNA_APP_KEY";
pub const ENV_ADZUNA_COUNTRY: &str = "ADZUNA_COUNTRY";
pub const ENV_DEFAULT_JOB_LOCATION: &str = "DEFAULT_JOB_LOCATION";
pub const ENV_CORS_ORIGINS: &str = "CORS_ORIGINS";
pub const ENV_DEADLINE_SECS: &str = "JOBS_DEADLINE_SECS";
pub const ENV_SOURCE_TIMEOUT_SECS: &str = "JOBS_SOURCE_TIMEOUT_SECS";
pub const ENV_JOB_SOURCES: &str = "JOB_SOURCES";
pub const ENV_RANKING_CONFIG_PATH: &str = "RANKING_CONFIG_PATH";

pub const DEFAULT_DEADLINE_SECS: u64 = 10;
/// Per-request HTTP timeout; two attempts (Remote OK mirror fallback) fit in one deadline.
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 4;

/// Job boards the service knows how to query, in default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Remotive,
    RemoteOk,
    Arbeitnow,
    Adzuna,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Remotive,
        SourceKind::RemoteOk,
        SourceKind::Arbeitnow,
        SourceKind::Adzuna,
    ];
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let k: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match k.as_str() {
            "remotive" => Ok(Self::Remotive),
            "remoteok" => Ok(Self::RemoteOk),
            "arbeitnow" => Ok(Self::Arbeitnow),
            "adzuna" => Ok(Self::Adzuna),
            _ => Err(format!("unknown job source: {s}")),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AdzunaCredentials {
    pub app_id: String,
    pub app_key: String,
}

// Keep the key out of logs.
impl fmt::Debug for AdzunaCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdzunaCredentials")
            .field("app_id", &self.app_id)
            .field("app_key_len", &self.app_key.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub adzuna: Option<AdzunaCredentials>,
    pub adzuna_country: String,
    pub default_location: String,
    /// Empty means "allow any origin".
    pub cors_origins: Vec<String>,
    pub deadline: Duration,
    pub source_timeout: Duration,
    /// Enabled sources; order is the dedup priority order.
    pub sources: Vec<SourceKind>,
    pub ranking_config_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            adzuna: None,
            adzuna_country: "gb".to_string(),
            default_location: "Remote".to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
            source_timeout: Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS),
            sources: SourceKind::ALL.to_vec(),
            ranking_config_path: PathBuf::from(DEFAULT_RANKING_CONFIG_PATH),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup; unset, blank or invalid values keep their defaults.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Self::default();

        if let (Some(app_id), Some(app_key)) = (var(ENV_ADZUNA_APP_ID), var(ENV_ADZUNA_APP_KEY)) {
            cfg.adzuna = Some(AdzunaCredentials { app_id, app_key });
        }
        if let Some(c) = var(ENV_ADZUNA_COUNTRY) {
            cfg.adzuna_country = c.to_ascii_lowercase();
        }
        if let Some(l) = var(ENV_DEFAULT_JOB_LOCATION) {
            cfg.default_location = l;
        }
        if let Some(raw) = var(ENV_CORS_ORIGINS) {
            cfg.cors_origins = raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(secs) = parse_secs(ENV_DEADLINE_SECS, var(ENV_DEADLINE_SECS)) {
            cfg.deadline = secs;
        }
        if let Some(secs) = parse_secs(ENV_SOURCE_TIMEOUT_SECS, var(ENV_SOURCE_TIMEOUT_SECS)) {
            cfg.source_timeout = secs;
        }
        if let Some(raw) = var(ENV_JOB_SOURCES) {
            let mut sources = Vec::new();
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                match part.parse::<SourceKind>() {
                    Ok(k) if !sources.contains(&k) => sources.push(k),
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "ignoring {ENV_JOB_SOURCES} entry"),
                }
            }
            if sources.is_empty() {
                tracing::warn!("{ENV_JOB_SOURCES} names no known source, enabling all");
            } else {
                cfg.sources = sources;
            }
        }
        if let Some(p) = var(ENV_RANKING_CONFIG_PATH) {
            cfg.ranking_config_path = PathBuf::from(p);
        }

        cfg
    }
}

fn parse_secs(key: &str, raw: Option<String>) -> Option<Duration> {
    let raw = raw?;
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Some(Duration::from_secs(n)),
        _ => {
            tracing::warn!(%key, value = %raw, "invalid seconds value, keeping default");
            None
        }
    }
}
