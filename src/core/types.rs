use serde::{Deserialize, Serialize};

/// A visited or link-target page. `text` is empty for link-only targets that
/// were discovered but never fetched (they exist only as graph nodes).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Page {
    pub id: u32,
    pub url: String,
    pub text: String,
}

/// A directed edge between two page ids, post-materialization: deduplicated,
/// self-loop-free.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub src_id: u32,
    pub dst_id: u32,
}

/// One PageRank record after ingest: renormalized so kept scores sum to 1.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RankRecord {
    pub id: u32,
    pub url: String,
    pub score: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchResult {
    pub url: String,
    pub snippet: String,
    pub tfidf_score: f64,
    pub pagerank_score: f64,
    pub combined_score: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RankedNode {
    pub id: u32,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RankedPage {
    pub node_id: u32,
    pub url: String,
    pub rank: usize,
    pub score: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RankedEdge {
    pub from: u32,
    pub to: u32,
}

/// Response shape for `rank_from_seed`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RankFromSeedResponse {
    pub start_url: String,
    pub page_count: usize,
    pub edge_count: usize,
    pub pages: Vec<RankedPage>,
    pub nodes: Vec<RankedNode>,
    pub edges: Vec<RankedEdge>,
}
