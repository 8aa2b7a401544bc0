//! TF-IDF Index (Component F).
//!
//! A term-interned vocabulary with per-term posting lists, following a
//! Building -> Finalized lifecycle. Mirrors
//! `original_source/api/tfidf_index.py::TfidfSearchIndex` term-for-term.

use std::collections::HashMap;

use regex::Regex;

use crate::core::errors::CrawlRankError;

fn token_regex() -> Regex {
    Regex::new(r"\w+").expect("static token regex is valid")
}

/// Unicode word-character runs, lowercased.
pub fn tokenize(text: &str) -> Vec<String> {
    let re = token_regex();
    re.find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

#[derive(Default)]
struct Posting {
    /// doc_id -> weight. Raw term frequency while Building; `tf * idf` once
    /// Finalized.
    by_doc: HashMap<u32, f64>,
}

/// State-typed inverted index. `Building` accepts `add_document`;
/// `Finalized` accepts `search` and rejects further additions.
pub enum TfIdfIndex {
    Building(BuildingIndex),
    Finalized(FinalizedIndex),
}

#[derive(Default)]
pub struct BuildingIndex {
    postings: HashMap<String, Posting>,
    /// term -> document frequency (number of distinct docs containing it).
    df: HashMap<String, u32>,
    n_docs: u32,
}

pub struct FinalizedIndex {
    postings: HashMap<String, Posting>,
    idf: HashMap<String, f64>,
    doc_norm: HashMap<u32, f64>,
    n_docs: u32,
}

impl TfIdfIndex {
    pub fn new() -> Self {
        TfIdfIndex::Building(BuildingIndex::default())
    }

    /// Add a document while the index is Building. No-op if the document
    /// tokenizes to zero terms. Errors if the index has already been
    /// finalized (a programmer error — call sites must not add after
    /// `finalize`).
    pub fn add_document(&mut self, doc_id: u32, text: &str) -> Result<(), CrawlRankError> {
        match self {
            TfIdfIndex::Building(b) => {
                b.add_document(doc_id, text);
                Ok(())
            }
            TfIdfIndex::Finalized(_) => Err(CrawlRankError::index_state(
                "add_document called after finalize()",
            )),
        }
    }

    /// Transition Building -> Finalized. Requires at least one document.
    pub fn finalize(self) -> Result<Self, CrawlRankError> {
        match self {
            TfIdfIndex::Building(b) => Ok(TfIdfIndex::Finalized(b.finalize()?)),
            TfIdfIndex::Finalized(_) => Err(CrawlRankError::index_state(
                "finalize() called twice",
            )),
        }
    }

    /// Cosine-similarity search. Requires the index to be Finalized.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<(u32, f64)>, CrawlRankError> {
        match self {
            TfIdfIndex::Finalized(f) => Ok(f.search(query, k)),
            TfIdfIndex::Building(_) => Err(CrawlRankError::index_state(
                "search called before finalize()",
            )),
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self, TfIdfIndex::Finalized(_))
    }
}

impl Default for TfIdfIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildingIndex {
    fn add_document(&mut self, doc_id: u32, text: &str) {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return;
        }
        self.n_docs += 1;

        let mut tf: HashMap<String, u32> = HashMap::new();
        for t in tokens {
            *tf.entry(t).or_insert(0) += 1;
        }

        for (term, freq) in tf {
            *self.df.entry(term.clone()).or_insert(0) += 1;
            self.postings
                .entry(term)
                .or_default()
                .by_doc
                .insert(doc_id, freq as f64);
        }
    }

    fn finalize(self) -> Result<FinalizedIndex, CrawlRankError> {
        if self.n_docs == 0 {
            return Err(CrawlRankError::index_state(
                "finalize() requires at least one document",
            ));
        }

        let n = self.n_docs as f64;
        let mut idf = HashMap::with_capacity(self.df.len());
        for (term, df) in &self.df {
            let v = ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0;
            idf.insert(term.clone(), v);
        }

        let mut postings = self.postings;
        let mut doc_norm_sq: HashMap<u32, f64> = HashMap::new();
        for (term, posting) in postings.iter_mut() {
            let term_idf = idf.get(term).copied().unwrap_or(0.0);
            for (doc_id, weight) in posting.by_doc.iter_mut() {
                let w = *weight * term_idf;
                *weight = w;
                *doc_norm_sq.entry(*doc_id).or_insert(0.0) += w * w;
            }
        }

        let doc_norm = doc_norm_sq
            .into_iter()
            .map(|(doc_id, sq)| (doc_id, if sq > 0.0 { sq.sqrt() } else { 1.0 }))
            .collect();

        Ok(FinalizedIndex { postings, idf, doc_norm, n_docs: self.n_docs })
    }
}

impl FinalizedIndex {
    pub fn doc_count(&self) -> u32 {
        self.n_docs
    }

    fn search(&self, query: &str, k: usize) -> Vec<(u32, f64)> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut q_tf: HashMap<String, u32> = HashMap::new();
        for t in tokens {
            *q_tf.entry(t).or_insert(0) += 1;
        }

        let mut q_weights: HashMap<&str, f64> = HashMap::new();
        for (term, freq) in &q_tf {
            if let Some(idf) = self.idf.get(term) {
                q_weights.insert(term.as_str(), *freq as f64 * idf);
            }
        }

        let q_norm_sq: f64 = q_weights.values().map(|w| w * w).sum();
        let q_norm = if q_norm_sq > 0.0 { q_norm_sq.sqrt() } else { 1.0 };

        let mut dot: HashMap<u32, f64> = HashMap::new();
        for (term, q_w) in &q_weights {
            if let Some(posting) = self.postings.get(*term) {
                for (doc_id, d_w) in &posting.by_doc {
                    *dot.entry(*doc_id).or_insert(0.0) += q_w * d_w;
                }
            }
        }

        let mut results: Vec<(u32, f64)> = dot
            .into_iter()
            .map(|(doc_id, d)| {
                let norm = self.doc_norm.get(&doc_id).copied().unwrap_or(1.0);
                (doc_id, d / (q_norm * norm))
            })
            .collect();

        results.sort_by(|a, b| match b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal) {
            std::cmp::Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        results.truncate(k);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(docs: &[(u32, &str)]) -> TfIdfIndex {
        let mut idx = TfIdfIndex::new();
        for (id, text) in docs {
            idx.add_document(*id, text).unwrap();
        }
        idx.finalize().unwrap()
    }

    #[test]
    fn s1_three_doc_mini_corpus() {
        let idx = build(&[(1, "the cat sat"), (2, "the dog sat"), (3, "birds fly")]);

        let cat_results = idx.search("cat", 10).unwrap();
        assert_eq!(cat_results.len(), 1);
        assert_eq!(cat_results[0].0, 1);
        assert!(cat_results[0].1 > 0.6 && cat_results[0].1 <= 1.0 + 1e-9);

        let sat_results = idx.search("sat", 10).unwrap();
        let ids: Vec<u32> = sat_results.iter().map(|(id, _)| *id).collect();
        assert!(ids.contains(&1));
        assert!(ids.contains(&2));
        assert!(!ids.contains(&3));
    }

    #[test]
    fn idf_monotonicity() {
        // "the" appears in 2 of 3 docs, "birds" in 1 of 3: higher df -> lower idf.
        let idx = build(&[(1, "the cat sat"), (2, "the dog sat"), (3, "birds fly")]);
        let TfIdfIndex::Finalized(f) = &idx else { panic!("expected finalized") };
        assert!(f.idf["the"] < f.idf["birds"]);
    }

    #[test]
    fn cosine_identity_for_query_equal_to_document() {
        let idx = build(&[(1, "rust systems programming language"), (2, "python scripting language")]);
        let results = idx.search("rust systems programming language", 10).unwrap();
        assert_eq!(results[0].0, 1);
        assert!((results[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_query_short_circuits() {
        let idx = build(&[(1, "some text")]);
        assert_eq!(idx.search("", 10).unwrap(), Vec::new());
    }

    #[test]
    fn finalization_gate_errors() {
        let mut idx = TfIdfIndex::new();
        assert!(idx.search("anything", 10).is_err());
        idx.add_document(1, "hello world").unwrap();
        let idx = idx.finalize().unwrap();
        // idx is now Finalized; can't add_document any more.
        let mut idx = idx;
        assert!(idx.add_document(2, "more text").is_err());
    }

    #[test]
    fn finalize_with_zero_documents_errors() {
        let mut idx = TfIdfIndex::new();
        // Documents that tokenize to nothing don't count.
        idx.add_document(1, "   ").unwrap();
        assert!(idx.finalize().is_err());
    }

    #[test]
    fn ties_broken_by_doc_id_ascending() {
        let idx = build(&[(5, "alpha beta"), (2, "alpha beta"), (9, "alpha beta")]);
        let results = idx.search("alpha", 10).unwrap();
        let ids: Vec<u32> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn unknown_query_terms_are_skipped_not_errors() {
        let idx = build(&[(1, "known terms only")]);
        let results = idx.search("known unknownterm", 10).unwrap();
        assert_eq!(results[0].0, 1);
    }
}
