//! Search Pipeline (Component G).
//!
//! Blends TF-IDF candidates with min-max-normalized PageRank and attaches a
//! snippet, grounded verbatim on `original_source/api/main.py`'s
//! `search_tum`/`_make_snippet`.

use std::collections::HashMap;

use crate::core::errors::CrawlRankError;
use crate::core::types::{Page, RankRecord, SearchResponse, SearchResult};
use crate::index::TfIdfIndex;

const ALPHA: f64 = 0.8;
const BETA: f64 = 0.2;
const DEFAULT_SNIPPET_LEN: usize = 220;

/// Precomputed PageRank lookups, built once after rank ingest: raw score by
/// url plus its min-max normalization to `[0, 1]`.
pub struct RankLookup {
    raw: HashMap<String, f64>,
    norm: HashMap<String, f64>,
}

impl RankLookup {
    /// Build from ingested rank records, keeping the **higher** score on a
    /// duplicate URL (the source's `pagerank_by_url` dedup), then min-max
    /// normalizing the deduplicated raw scores.
    pub fn from_records(records: &[RankRecord]) -> Self {
        let mut raw: HashMap<String, f64> = HashMap::new();
        for r in records {
            raw.entry(r.url.clone())
                .and_modify(|existing| {
                    if r.score > *existing {
                        *existing = r.score;
                    }
                })
                .or_insert(r.score);
        }

        let norm = if raw.is_empty() {
            HashMap::new()
        } else {
            let pr_min = raw.values().cloned().fold(f64::INFINITY, f64::min);
            let pr_max = raw.values().cloned().fold(f64::NEG_INFINITY, f64::max);
            let span = if pr_max > pr_min { pr_max - pr_min } else { 1.0 };
            raw.iter().map(|(url, score)| (url.clone(), (score - pr_min) / span)).collect()
        };

        Self { raw, norm }
    }

    fn raw_score(&self, url: &str) -> f64 {
        self.raw.get(url).copied().unwrap_or(0.0)
    }

    fn norm_score(&self, url: &str) -> f64 {
        self.norm.get(url).copied().unwrap_or(0.0)
    }
}

/// `search_blended(q, k)`: over-fetch `3k` TF-IDF candidates, blend with
/// normalized PageRank, sort by combined score, attach snippets.
pub fn search_blended(
    index: &TfIdfIndex,
    pages_by_id: &HashMap<u32, Page>,
    ranks: &RankLookup,
    query: &str,
    top_k: usize,
) -> Result<SearchResponse, CrawlRankError> {
    let candidates = index.search(query, top_k * 3)?;

    let mut results: Vec<SearchResult> = Vec::new();
    for (doc_id, tfidf_score) in candidates {
        let Some(page) = pages_by_id.get(&doc_id) else { continue };

        let pr_raw = ranks.raw_score(&page.url);
        let pr_norm = ranks.norm_score(&page.url);
        let combined_score = ALPHA * tfidf_score + BETA * pr_norm;
        let snippet = make_snippet(&page.text, query, DEFAULT_SNIPPET_LEN);

        results.push(SearchResult {
            url: page.url.clone(),
            snippet,
            tfidf_score,
            pagerank_score: pr_raw,
            combined_score,
        });
    }

    results.sort_by(|a, b| {
        b.combined_score.partial_cmp(&a.combined_score).unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(top_k);

    Ok(SearchResponse { query: query.to_string(), count: results.len(), results })
}

/// Smallest-offset window around the first query term found in `text`
/// (case-insensitive); falls back to a leading truncation if no term
/// appears at all.
pub fn make_snippet(text: &str, query: &str, max_len: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    // ASCII-only case folding, not `to_lowercase()`: full Unicode lowercasing
    // can change a string's byte length (e.g. "ß" -> "ss", Turkish "İ"),
    // which would make a byte offset found in `lowered` meaningless against
    // `text`. `to_ascii_lowercase` only rewrites ASCII bytes in place, so
    // `lowered` keeps exactly the same length and char boundaries as `text`
    // and a byte offset is safe to reuse directly against it.
    let lowered = text.to_ascii_lowercase();
    let lowered_query = query.to_ascii_lowercase();
    let mut byte_pos: Option<usize> = None;
    for term in lowered_query.split_whitespace().filter(|t| !t.is_empty()) {
        if let Some(idx) = lowered.find(term) {
            byte_pos = Some(byte_pos.map_or(idx, |p| p.min(idx)));
        }
    }

    let chars: Vec<char> = text.chars().collect();
    let Some(byte_pos) = byte_pos else {
        return if chars.len() > max_len {
            let truncated: String = chars[..max_len].iter().collect();
            format!("{truncated}…")
        } else {
            text.to_string()
        };
    };
    // `byte_pos` is a valid char boundary in `text` (see above), so this
    // count is the matching char index — indexing `chars` stays consistent
    // in one char space regardless of multi-byte text preceding the match.
    let pos = text[..byte_pos].chars().count();

    let start = pos.saturating_sub(max_len / 3);
    let end = (start + max_len).min(chars.len());
    let mut snippet: String = chars[start..end].iter().collect::<String>().trim().to_string();

    if start > 0 {
        snippet = format!("… {snippet}");
    }
    if end < chars.len() {
        snippet = format!("{snippet} …");
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_snippet_window_around_match() {
        let snippet = make_snippet("A B C cat D E F", "cat", 11);
        assert!(snippet.contains("cat"));
        assert!(snippet.starts_with("… "));
    }

    #[test]
    fn snippet_does_not_panic_on_multibyte_text_before_match() {
        // Multi-byte German umlauts precede the query match; a byte offset
        // mistaken for a char offset would panic slicing `chars`.
        let text = "Überraschung München Köln Stuttgart cat sat on mat today";
        let snippet = make_snippet(text, "cat", 20);
        assert!(snippet.to_ascii_lowercase().contains("cat"));
    }

    #[test]
    fn snippet_falls_back_to_prefix_when_no_term_matches() {
        let text = "x".repeat(300);
        let snippet = make_snippet(&text, "nomatch", 220);
        assert!(snippet.ends_with('…'));
        assert_eq!(snippet.chars().count(), 221);
    }

    #[test]
    fn snippet_returns_whole_text_when_short_and_unmatched() {
        let snippet = make_snippet("short text", "nomatch", 220);
        assert_eq!(snippet, "short text");
    }

    #[test]
    fn rank_lookup_keeps_higher_score_on_duplicate_url() {
        let records = vec![
            RankRecord { id: 1, url: "a".into(), score: 0.2 },
            RankRecord { id: 2, url: "a".into(), score: 0.6 },
        ];
        let lookup = RankLookup::from_records(&records);
        assert_eq!(lookup.raw_score("a"), 0.6);
    }

    #[test]
    fn rank_lookup_normalizes_to_unit_interval() {
        let records = vec![
            RankRecord { id: 1, url: "lo".into(), score: 0.1 },
            RankRecord { id: 2, url: "hi".into(), score: 0.9 },
        ];
        let lookup = RankLookup::from_records(&records);
        assert!((lookup.norm_score("lo") - 0.0).abs() < 1e-9);
        assert!((lookup.norm_score("hi") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn s5_blended_ranking_orders_by_combined_score() {
        // tfidf(u1)=0.9, tfidf(u2)=0.2; pr_norm(u1)=0.0, pr_norm(u2)=1.0.
        // combined: u1 = 0.8*0.9 + 0.2*0.0 = 0.72, u2 = 0.8*0.2 + 0.2*1.0 = 0.36.
        let tf1 = ALPHA * 0.9 + BETA * 0.0;
        let tf2 = ALPHA * 0.2 + BETA * 1.0;
        assert!((tf1 - 0.72).abs() < 1e-9);
        assert!((tf2 - 0.36).abs() < 1e-9);
        assert!(tf1 > tf2);
    }
}
