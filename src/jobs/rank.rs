// src/jobs/rank.rs
//! Relevance ordering of postings against a profile.
//!
//! Score = sum over profile terms of `title_weight` (term in title) and
//! `description_weight` (term in description), plus `location_bonus` when the
//! requested location is part of the posting location. Location never filters.

use serde::Deserialize;
use std::{fs, path::Path};

use crate::jobs::types::Posting;
use crate::profile::Profile;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 50;

pub const DEFAULT_RANKING_CONFIG_PATH: &str = "config/ranking.json";

/// Tunable ranking weights, loaded from JSON:
/// `{ "title_weight": 2.0, "description_weight": 1.0, "location_bonus": 1.5 }`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankWeights {
    pub title_weight: f32,
    pub description_weight: f32,
    pub location_bonus: f32,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            title_weight: 2.0,
            description_weight: 1.0,
            location_bonus: 1.5,
        }
    }
}

impl RankWeights {
    /// Load from a JSON file. Falls back to defaults on a missing or invalid file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let parsed = fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str::<RankWeights>(&s).ok());
        match parsed {
            Some(w) => w.sanitized(),
            None => {
                tracing::debug!(path = %path.display(), "ranking config not loaded, using defaults");
                Self::default()
            }
        }
    }

    // Negative or non-finite weights would invert the ordering.
    fn sanitized(self) -> Self {
        let d = Self::default();
        let fix = |v: f32, fallback: f32| if v.is_finite() && v >= 0.0 { v } else { fallback };
        Self {
            title_weight: fix(self.title_weight, d.title_weight),
            description_weight: fix(self.description_weight, d.description_weight),
            location_bonus: fix(self.location_bonus, d.location_bonus),
        }
    }
}

/// Missing or non-positive -> default; above `MAX_LIMIT` -> clamped.
pub fn effective_limit(limit: Option<i64>) -> usize {
    match limit {
        Some(n) if n > 0 => (n as u64).min(MAX_LIMIT as u64) as usize,
        _ => DEFAULT_LIMIT,
    }
}

/// Lowercased, de-duplicated title and skill terms of a profile.
pub fn profile_terms(profile: &Profile) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for t in profile.job_titles.iter().chain(profile.skills.iter()) {
        let t = t.trim().to_lowercase();
        if !t.is_empty() && !terms.contains(&t) {
            terms.push(t);
        }
    }
    terms
}

pub fn score_posting(
    posting: &Posting,
    terms: &[String],
    location: Option<&str>,
    w: &RankWeights,
) -> f32 {
    let title = posting.title.to_lowercase();
    let description = posting.description.to_lowercase();

    let mut score = 0.0;
    for term in terms {
        if title.contains(term.as_str()) {
            score += w.title_weight;
        }
        if description.contains(term.as_str()) {
            score += w.description_weight;
        }
    }

    if let Some(loc) = location.map(str::trim).filter(|l| !l.is_empty()) {
        if !posting.location.is_empty()
            && posting.location.to_lowercase().contains(&loc.to_lowercase())
        {
            score += w.location_bonus;
        }
    }

    score
}

/// Stable sort by score (ties keep input order), then truncate to `limit`.
pub fn rank_postings(
    postings: Vec<Posting>,
    profile: &Profile,
    location: Option<&str>,
    limit: usize,
    w: &RankWeights,
) -> Vec<Posting> {
    let terms = profile_terms(profile);
    let mut scored: Vec<(f32, Posting)> = postings
        .into_iter()
        .map(|p| (score_posting(&p, &terms, location, w), p))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, p)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn posting(title: &str, desc: &str, location: &str) -> Posting {
        Posting {
            title: title.into(),
            company: "Acme".into(),
            location: location.into(),
            description: desc.into(),
            apply_link: format!("https://example.com/{}", title.replace(' ', "-")),
            source: "Remotive".into(),
            posted_at: None,
        }
    }

    fn profile() -> Profile {
        Profile {
            job_titles: vec!["Backend Engineer".into()],
            skills: vec!["Python".into(), "SQL".into()],
            ..Profile::default()
        }
    }

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(effective_limit(None), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(0)), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(-3)), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(7)), 7);
        assert_eq!(effective_limit(Some(500)), MAX_LIMIT);
    }

    #[test]
    fn title_match_outweighs_description_match() {
        let w = RankWeights::default();
        let terms = profile_terms(&profile());
        let in_title = score_posting(&posting("Python Dev", "", ""), &terms, None, &w);
        let in_desc = score_posting(&posting("Dev", "python", ""), &terms, None, &w);
        assert!(in_title >= 2.0 * in_desc);
    }

    #[test]
    fn location_is_a_bonus_not_a_filter() {
        let out = rank_postings(
            vec![
                posting("Cook", "", ""),
                posting("Cook", "", "Berlin"),
                posting("Cook", "", "Remote - EU"),
            ],
            &profile(),
            Some("remote"),
            10,
            &RankWeights::default(),
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].location, "Remote - EU");
        // unknown location keeps its place ahead of the equally scored Berlin entry
        assert_eq!(out[1].location, "");
        assert_eq!(out[2].location, "Berlin");
    }

    #[test]
    fn ties_keep_input_order_and_limit_applies() {
        let input: Vec<Posting> = (0..5)
            .map(|i| posting(&format!("Role {i}"), "", ""))
            .collect();
        let out = rank_postings(input, &profile(), None, 3, &RankWeights::default());
        let titles: Vec<&str> = out.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Role 0", "Role 1", "Role 2"]);
    }

    #[test]
    fn weights_load_from_json_and_fall_back() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"title_weight": 3.0, "location_bonus": -1.0}}"#).unwrap();
        let w = RankWeights::load_from_file(f.path());
        assert_eq!(w.title_weight, 3.0);
        assert_eq!(w.description_weight, 1.0);
        assert_eq!(w.location_bonus, 1.5);

        let missing = RankWeights::load_from_file("does/not/exist.json");
        assert_eq!(missing, RankWeights::default());
    }
}
