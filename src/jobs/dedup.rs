// src/jobs/dedup.rs
//! Collapse postings that describe the same listing, whichever source surfaced them.

use std::collections::HashMap;

use crate::jobs::types::Posting;

/// Case-insensitive, whitespace-normalized `title|company|location`.
pub fn dedup_key(p: &Posting) -> String {
    fn norm(s: &str) -> String {
        s.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
    format!("{}|{}|{}", norm(&p.title), norm(&p.company), norm(&p.location))
}

fn priority_of(source: &str, priority: &[&str]) -> usize {
    priority
        .iter()
        .position(|s| s.eq_ignore_ascii_case(source))
        .unwrap_or(usize::MAX)
}

/// True when `candidate` should replace `current` as the representative.
fn wins_over(candidate: &Posting, current: &Posting, priority: &[&str]) -> bool {
    let cand_len = candidate.description.chars().count();
    let cur_len = current.description.chars().count();
    if cand_len != cur_len {
        return cand_len > cur_len;
    }
    priority_of(&candidate.source, priority) < priority_of(&current.source, priority)
}

/// Keep one posting per key. The survivor sits where the key first appeared.
/// Returns the survivors and the number of postings removed.
pub fn dedup_postings(postings: Vec<Posting>, priority: &[&str]) -> (Vec<Posting>, usize) {
    let mut slot_by_key: HashMap<String, usize> = HashMap::with_capacity(postings.len());
    let mut out: Vec<Posting> = Vec::with_capacity(postings.len());
    let mut removed = 0usize;

    for p in postings {
        let key = dedup_key(&p);
        match slot_by_key.get(&key) {
            Some(&slot) => {
                removed += 1;
                if wins_over(&p, &out[slot], priority) {
                    tracing::debug!(
                        target: "jobs",
                        winner = %p.source,
                        loser = %out[slot].source,
                        "duplicate posting replaced"
                    );
                    out[slot] = p;
                }
            }
            None => {
                slot_by_key.insert(key, out.len());
                out.push(p);
            }
        }
    }

    (out, removed)
}
