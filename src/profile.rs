// src/profile.rs
//! CV profile and the rule-based extractor that produces it.
//! Extraction never fails: sparse input yields a sparse profile.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Summaries quote at most this many characters of the CV.
pub const SUMMARY_EXCERPT_CHARS: usize = 220;

const COMMON_SKILLS: &[&str] = &[
    // Programming
    "python", "java", "javascript", "typescript", "c++", "c#", "php", "ruby", "go", "rust", "sql",
    // Web / frameworks
    "react", "vue", "angular", "node.js", "django", "flask", "fastapi", "spring", "laravel",
    // Data / ML
    "pandas", "numpy", "scikit-learn", "tensorflow", "pytorch", "nlp", "computer vision",
    // Cloud / devops
    "docker", "kubernetes", "aws", "azure", "gcp", "ci/cd", "git",
    // Other
    "excel", "power bi", "tableau", "linux", "bash",
];

const COMMON_JOB_TITLES: &[&str] = &[
    "software engineer",
    "backend developer",
    "frontend developer",
    "full stack developer",
    "data analyst",
    "data scientist",
    "machine learning engineer",
    "devops engineer",
    "product manager",
    "project manager",
    "ui/ux designer",
    "qa engineer",
    "cybersecurity analyst",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Student,
    Junior,
    Mid,
    Senior,
    Lead,
    Executive,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub job_titles: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub recommended_job_types: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Whole-term match: `go` must not hit inside `good`, but `c++` and `node.js` still match.
fn term_regex(term: &str) -> Regex {
    let pattern = format!(r"(?:^|[^a-z0-9]){}(?:$|[^a-z0-9])", regex::escape(term));
    Regex::new(&pattern).expect("escaped term regex")
}

static SKILL_RES: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| COMMON_SKILLS.iter().map(|s| (*s, term_regex(s))).collect());

static TITLE_RES: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| COMMON_JOB_TITLES.iter().map(|t| (*t, term_regex(t))).collect());

static YEARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s*\+?\s*(?:years|yrs)\b").expect("years regex"));

fn matched_terms(text: &str, table: &[(&'static str, Regex)]) -> Vec<String> {
    let mut out: Vec<String> = table
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(t, _)| t.to_string())
        .collect();
    out.sort();
    out
}

fn experience_level(text: &str) -> ExperienceLevel {
    let max_years = YEARS_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    if text.contains("intern") || text.contains("student") {
        ExperienceLevel::Student
    } else if max_years >= 8 {
        ExperienceLevel::Senior
    } else if max_years >= 3 {
        ExperienceLevel::Mid
    } else if max_years > 0 {
        ExperienceLevel::Junior
    } else {
        ExperienceLevel::Unknown
    }
}

fn job_types(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    if ["remote", "work from home", "wfh"].iter().any(|k| text.contains(k)) {
        out.push("remote".to_string());
    }
    if ["part-time", "part time"].iter().any(|k| text.contains(k)) {
        out.push("part-time".to_string());
    }
    if ["full-time", "full time"].iter().any(|k| text.contains(k)) {
        out.push("full-time".to_string());
    }
    if out.is_empty() {
        out.push("any".to_string());
    }
    out
}

fn summary(cv_text: &str) -> String {
    let trimmed = cv_text.trim();
    let excerpt: String = trimmed.chars().take(SUMMARY_EXCERPT_CHARS).collect();
    let ellipsis = if trimmed.chars().count() > SUMMARY_EXCERPT_CHARS {
        "..."
    } else {
        ""
    };
    format!("Rule-based analysis (no API key). {excerpt}{ellipsis}")
}

/// Keyword/heuristic CV analysis.
pub fn analyze_cv_text(cv_text: &str) -> Profile {
    let text = cv_text.to_lowercase();
    let profile = Profile {
        job_titles: matched_terms(&text, &TITLE_RES),
        skills: matched_terms(&text, &SKILL_RES),
        experience_level: experience_level(&text),
        recommended_job_types: job_types(&text),
        summary: Some(summary(cv_text)),
    };

    tracing::debug!(
        cv = %anon_id(cv_text),
        titles = profile.job_titles.len(),
        skills = profile.skills.len(),
        level = ?profile.experience_level,
        "cv analyzed"
    );
    profile
}

/// Short anonymous id for log lines; CV text itself is never logged.
pub fn anon_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().take(6).map(|b| format!("{b:02x}")).collect()
}
