//! Rank Ingestor (Component E).
//!
//! Parses raw ranker output, joins it to known pages, and renormalizes.
//! Grounded verbatim on `original_source/backend/data/parse_pagerank.py`.

use std::collections::HashMap;

use regex::Regex;

use crate::core::errors::CrawlRankError;
use crate::core::types::{Page, RankRecord};

fn line_regex() -> Regex {
    Regex::new(r"node\s+(\d+)\s*:\s*([0-9.eE+-]+)").expect("static rank-line regex is valid")
}

/// Parse `raw_output` (free-form text), keep only entries whose id is present
/// among `pages`, renormalize so kept scores sum to 1, and sort descending.
///
/// Fails if no lines parse, or if the parsed set is empty after the id join.
pub fn ingest(raw_output: &str, pages: &[Page]) -> Result<Vec<RankRecord>, CrawlRankError> {
    let id_to_url: HashMap<u32, &str> =
        pages.iter().map(|p| (p.id, p.url.as_str())).collect();

    let re = line_regex();
    let mut parsed: Vec<(u32, f64)> = Vec::new();
    for line in raw_output.lines() {
        if let Some(caps) = re.captures(line) {
            let id: u32 = match caps[1].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            let score: f64 = match caps[2].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            parsed.push((id, score));
        }
    }

    if parsed.is_empty() {
        return Err(CrawlRankError::pipeline("ranker output had no parsable lines"));
    }

    let mut kept: Vec<RankRecord> = Vec::new();
    let mut dropped = 0usize;
    for (id, score) in parsed {
        match id_to_url.get(&id) {
            Some(url) => kept.push(RankRecord { id, url: url.to_string(), score }),
            None => dropped += 1,
        }
    }

    if kept.is_empty() {
        return Err(CrawlRankError::pipeline("no ranker entries joined to a known page"));
    }
    if dropped > 0 {
        tracing::info!("rank ingest: dropped {dropped} entries with no matching page id");
    }

    let total: f64 = kept.iter().map(|r| r.score).sum();
    if total > 0.0 {
        for r in kept.iter_mut() {
            r.score /= total;
        }
    }

    kept.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    Ok(kept)
}
