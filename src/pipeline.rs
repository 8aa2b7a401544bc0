//! Pipeline Orchestrator (Component H).
//!
//! Drives crawl -> materialize -> rank -> index -> serve, grounded on
//! `original_source/api/build_corpus.py` / `recompute_pagerank.py`'s step
//! sequencing (`step_crawl` -> external ranker -> `step_parse_pagerank` ->
//! index build), generalized to call the in-process [`crate::ranker`]
//! instead of shelling a remote cluster run out over `scp`/`ssh`.

use std::collections::HashMap;

use crate::core::config::CrawlRankConfig;
use crate::core::errors::CrawlRankError;
use crate::core::types::{Edge, Page, RankedEdge, RankedNode, RankedPage, RankFromSeedResponse, RankRecord};
use crate::graph;
use crate::index::TfIdfIndex;
use crate::ranker::{self, RankerParams};
use crate::rank;
use crate::search::{self, RankLookup};
use crate::crawler;

/// Everything needed to answer `search_blended` queries against a built
/// corpus, plus the raw artifacts (`pages.json`/`edges.txt`-equivalent data)
/// for callers that want to persist them.
pub struct Corpus {
    pub index: TfIdfIndex,
    pub pages_by_id: HashMap<u32, Page>,
    pub ranks: RankLookup,
    pub pages: Vec<Page>,
    pub edges: Vec<Edge>,
    pub rank_records: Vec<RankRecord>,
    /// The full id -> url table assigned during the crawl, including ids for
    /// pure link targets that were never fetched (and so have no `Page`).
    /// PageRank runs over every one of these ids (`n_nodes =
    /// url_to_id.len()`); the graph response needs the same full set, not
    /// just the visited/indexed subset in `pages`.
    pub id_to_url: HashMap<u32, String>,
}

impl Corpus {
    pub fn search(&self, query: &str, top_k: usize) -> Result<crate::core::types::SearchResponse, CrawlRankError> {
        search::search_blended(&self.index, &self.pages_by_id, &self.ranks, query, top_k)
    }

    /// Render the `rank_from_seed` response shape: the rank records
    /// truncated to `top_k`, plus the full node/edge lists for graph
    /// inspection — including dangling/link-only nodes absent from `pages`,
    /// mirroring `original_source/api/main.py`'s use of `id_to_url` (the full
    /// `url_to_id` table) rather than just the visited page set.
    pub fn to_rank_from_seed_response(&self, start_url: &str, top_k: usize) -> RankFromSeedResponse {
        let pages = self
            .rank_records
            .iter()
            .take(top_k)
            .enumerate()
            .map(|(i, r)| RankedPage { node_id: r.id, url: r.url.clone(), rank: i + 1, score: r.score })
            .collect();

        let mut nodes: Vec<RankedNode> = self
            .id_to_url
            .iter()
            .map(|(&id, url)| RankedNode { id, url: url.clone() })
            .collect();
        nodes.sort_by_key(|n| n.id);

        let edges = self.edges.iter().map(|e| RankedEdge { from: e.src_id, to: e.dst_id }).collect();

        RankFromSeedResponse {
            start_url: start_url.to_string(),
            page_count: self.id_to_url.len(),
            edge_count: self.edges.len(),
            pages,
            nodes,
            edges,
        }
    }
}

/// Crawl `seed`, materialize the link graph, rank it, and build a queryable
/// corpus. Each step is idempotent given the prior step's inputs.
pub async fn build_from_seed(
    client: &reqwest::Client,
    seed: &str,
    config: &CrawlRankConfig,
) -> Result<Corpus, CrawlRankError> {
    let max_pages = config.resolve_max_pages();
    let workers = config.resolve_workers();
    let target_lang = config.resolve_target_lang();
    let damping = config.resolve_damping();
    let tolerance = config.resolve_tolerance();
    let max_iter = config.resolve_max_iter();

    let crawl_output =
        crawler::crawl(client, seed, max_pages, target_lang.as_deref(), workers).await?;

    let edges = graph::materialize_edges(&crawl_output.edges_url, &crawl_output.url_to_id);

    tracing::info!(
        "crawl complete: {} pages, {} edges",
        crawl_output.pages.len(),
        edges.len()
    );

    let n_nodes = crawl_output.url_to_id.len() as u32;
    let ranker_params = RankerParams { damping, tolerance, max_iter };
    let ranker_output = ranker::run(&edges, n_nodes, &ranker_params);

    let rank_records = rank::ingest(&ranker_output, &crawl_output.pages)?;
    let ranks = RankLookup::from_records(&rank_records);

    let pages_by_id = merge_pages_keep_longer(crawl_output.pages.clone());

    let id_to_url: HashMap<u32, String> =
        crawl_output.url_to_id.iter().map(|(url, &id)| (id, url.clone())).collect();

    let mut index = TfIdfIndex::new();
    for page in &crawl_output.pages {
        index.add_document(page.id, &page.text)?;
    }
    let index = index.finalize()?;

    Ok(Corpus {
        index,
        pages_by_id,
        ranks,
        pages: crawl_output.pages,
        edges,
        rank_records,
        id_to_url,
    })
}

/// Defensive "keep longer text wins" merge applied again at ingest into the
/// search pipeline, per the Design Note covering duplicate-id page sets
/// loaded from outside a single crawl run.
fn merge_pages_keep_longer(pages: Vec<Page>) -> HashMap<u32, Page> {
    let mut by_id: HashMap<u32, Page> = HashMap::with_capacity(pages.len());
    for page in pages {
        by_id
            .entry(page.id)
            .and_modify(|existing| {
                if page.text.len() > existing.text.len() {
                    existing.text = page.text.clone();
                }
            })
            .or_insert(page);
    }
    by_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_pages_keeps_longer_text_on_duplicate_id() {
        let pages = vec![
            Page { id: 1, url: "a".into(), text: "short".into() },
            Page { id: 1, url: "a".into(), text: "a much longer replacement".into() },
        ];
        let merged = merge_pages_keep_longer(pages);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[&1].text, "a much longer replacement");
    }

    #[test]
    fn rank_from_seed_response_keeps_dangling_link_only_nodes() {
        // id 2 ("link-only") was discovered as an outlink target but never
        // fetched: it has an edge and an id, but no Page.
        let pages = vec![Page { id: 0, url: "https://x/".into(), text: "home".into() }];
        let pages_by_id: HashMap<u32, Page> = pages.iter().cloned().map(|p| (p.id, p)).collect();
        let edges = vec![Edge { src_id: 0, dst_id: 2 }];
        let rank_records = vec![
            RankRecord { id: 0, url: "https://x/".into(), score: 0.6 },
            RankRecord { id: 2, url: "https://x/link-only".into(), score: 0.4 },
        ];
        let ranks = RankLookup::from_records(&rank_records);
        let id_to_url: HashMap<u32, String> = [
            (0u32, "https://x/".to_string()),
            (2u32, "https://x/link-only".to_string()),
        ]
        .into_iter()
        .collect();

        let mut index = TfIdfIndex::new();
        index.add_document(0, "home").unwrap();
        let index = index.finalize().unwrap();

        let corpus = Corpus {
            index,
            pages_by_id,
            ranks,
            pages,
            edges,
            rank_records,
            id_to_url,
        };

        let response = corpus.to_rank_from_seed_response("https://x/", 10);
        assert_eq!(response.page_count, 2);
        assert_eq!(response.nodes.len(), 2);
        assert!(response.nodes.iter().any(|n| n.id == 2 && n.url == "https://x/link-only"));
        assert_eq!(response.edges.len(), 1);
        assert_eq!(response.edges[0].to, 2);
    }
}
