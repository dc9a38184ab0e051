// src/jobs/normalize.rs
//! RawPosting -> Posting. Pure and infallible: bad records map to `None`.

use once_cell::sync::OnceCell;
use regex::Regex;
use reqwest::Url;

use crate::jobs::types::{Posting, RawPosting};

/// Descriptions in responses are cut at this many characters.
pub const DESCRIPTION_MAX_CHARS: usize = 400;

fn re_line_breaks() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)<\s*br\s*/?\s*>|</\s*(p|div|li)\s*>").unwrap())
}

fn re_tags() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap())
}

fn re_ws() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Normalize a provider text field: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) Block-level breaks become whitespace before tags are removed
    let out = re_line_breaks().replace_all(s, " ");

    // 2) Strip HTML tags
    let out = re_tags().replace_all(&out, "");

    // 3) HTML entity decode (after tag removal so "&lt;b&gt;" survives as text)
    let out = html_escape::decode_html_entities(&out);

    // 4) Normalize typographic quotes to ASCII
    let out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 5) Collapse whitespace (includes NBSP)
    re_ws().replace_all(&out, " ").trim().to_string()
}

/// Cut to at most `max` characters, never splitting a char.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect::<String>().trim_end().to_string()
}

/// Absolute http(s) URL or nothing.
pub fn usable_apply_link(raw: Option<&str>) -> Option<String> {
    let link = raw?.trim();
    if link.is_empty() {
        return None;
    }
    let url = Url::parse(link).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url.to_string()),
        _ => None,
    }
}

fn field(v: Option<&str>) -> String {
    v.map(normalize_text).unwrap_or_default()
}

/// Map one raw posting to the canonical shape; `None` when it has no usable apply link.
pub fn normalize_posting(raw: &RawPosting) -> Option<Posting> {
    let apply_link = usable_apply_link(raw.apply_link.as_deref())?;
    let description = truncate_chars(&field(raw.description.as_deref()), DESCRIPTION_MAX_CHARS);

    Some(Posting {
        title: field(raw.title.as_deref()),
        company: field(raw.company.as_deref()),
        location: field(raw.location.as_deref()),
        description,
        apply_link,
        source: raw.source.to_string(),
        posted_at: raw.posted_at,
    })
}

/// Normalize a batch, returning the kept postings and how many were dropped.
pub fn normalize_all(raw: &[RawPosting]) -> (Vec<Posting>, usize) {
    let kept: Vec<Posting> = raw.iter().filter_map(normalize_posting).collect();
    let dropped = raw.len() - kept.len();
    (kept, dropped)
}
