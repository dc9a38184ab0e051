// tests/jobs_normalize_dedup.rs
use smartcv_job_finder::jobs::dedup::{dedup_key, dedup_postings};
use smartcv_job_finder::jobs::normalize::{normalize_all, normalize_text, DESCRIPTION_MAX_CHARS};
use smartcv_job_finder::jobs::types::{Posting, RawPosting};

fn posting(title: &str, company: &str, location: &str, desc: &str, source: &str) -> Posting {
    Posting {
        title: title.into(),
        company: company.into(),
        location: location.into(),
        description: desc.into(),
        apply_link: format!("https://{}.example/{}", source.to_lowercase(), title.len()),
        source: source.into(),
        posted_at: None,
    }
}

#[test]
fn strips_html_and_unescapes() {
    let s = "<p>Hello&nbsp;<b>world</b> &ldquo;ok&rdquo;</p>";
    assert_eq!(normalize_text(s), r#"Hello world "ok""#);
}

#[test]
fn folds_whitespace_and_nbsp() {
    assert_eq!(normalize_text("A\u{00A0}\n\tB   C"), "A B C");
}

#[test]
fn long_descriptions_are_capped() {
    let raw = vec![RawPosting {
        source: "Remotive",
        title: Some("Writer".into()),
        description: Some("é".repeat(2_000)),
        apply_link: Some("https://remotive.com/j/9".into()),
        ..RawPosting::default()
    }];
    let (kept, dropped) = normalize_all(&raw);
    assert_eq!(dropped, 0);
    assert_eq!(kept[0].description.chars().count(), DESCRIPTION_MAX_CHARS);
}

#[test]
fn case_and_whitespace_variants_share_a_key() {
    let a = posting("Backend Engineer", "Acme", "Remote", "x", "A");
    let b = posting("backend  engineer", "ACME", "remote ", "x", "B");
    assert_eq!(dedup_key(&a), dedup_key(&b));
}

#[test]
fn longer_description_wins_then_source_priority() {
    let input = vec![
        posting("Backend Engineer", "Acme", "Remote", "short", "Arbeitnow"),
        posting("backend engineer", "ACME", "remote", "considerably longer text", "Remotive"),
        posting("Data Analyst", "Beta", "Berlin", "same", "Arbeitnow"),
        posting("Data Analyst", "Beta", "Berlin", "same", "Remotive"),
    ];
    let priority = ["Remotive", "Remote OK", "Arbeitnow", "Adzuna"];
    let (out, dups) = dedup_postings(input, &priority);

    assert_eq!(dups, 2);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].source, "Remotive");
    assert_eq!(out[0].description, "considerably longer text");
    // Equal descriptions: higher-priority source survives.
    assert_eq!(out[1].source, "Remotive");
}

#[test]
fn dedup_is_idempotent() {
    let input = vec![
        posting("Rust Dev", "Ferris", "Remote", "a", "A"),
        posting("rust dev", "ferris", "remote", "ab", "B"),
        posting("Go Dev", "Gopher", "Remote", "c", "A"),
    ];
    let (once, _) = dedup_postings(input, &["A", "B"]);
    let (twice, dups) = dedup_postings(once.clone(), &["A", "B"]);
    assert_eq!(dups, 0);
    assert_eq!(once, twice);
}
