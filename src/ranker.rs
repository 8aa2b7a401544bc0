//! In-process PageRank ranker.
//!
//! The source pipeline treats PageRank as an external collaborator: a binary
//! that consumes `edges.txt` and emits free-form `node N : score` lines (see
//! `original_source/api/recompute_pagerank.py`, which shells the computation
//! out to a CUDA binary on a remote cluster via `scp`/`ssh`). This module
//! keeps that exact contract — `run` takes an edge list and produces the same
//! line format the Rank Ingestor already parses — but computes it in-process
//! with a standard power iteration, so the crate has no external runtime
//! dependency. Constants (damping 0.85, tolerance 1e-8, max_iter 100) match
//! the defaults baked into the original cluster invocation.

use std::collections::HashMap;

use crate::core::types::Edge;

pub struct RankerParams {
    pub damping: f64,
    pub tolerance: f64,
    pub max_iter: usize,
}

impl Default for RankerParams {
    fn default() -> Self {
        Self { damping: 0.85, tolerance: 1e-8, max_iter: 100 }
    }
}

/// Run power-iteration PageRank over `edges` spanning node ids `0..n_nodes`,
/// and render the result in the ranker output format the Rank Ingestor
/// expects: one `"node <id> : <score>\n"` line per node, unsorted.
pub fn run(edges: &[Edge], n_nodes: u32, params: &RankerParams) -> String {
    if n_nodes == 0 {
        return String::new();
    }
    let n = n_nodes as usize;

    let mut out_degree = vec![0u32; n];
    let mut out_links: Vec<Vec<u32>> = vec![Vec::new(); n];
    for e in edges {
        if (e.src_id as usize) < n && (e.dst_id as usize) < n {
            out_links[e.src_id as usize].push(e.dst_id);
            out_degree[e.src_id as usize] += 1;
        }
    }

    let mut rank = vec![1.0 / n as f64; n];
    let base = (1.0 - params.damping) / n as f64;

    for _ in 0..params.max_iter {
        let dangling_mass: f64 = (0..n)
            .filter(|&i| out_degree[i] == 0)
            .map(|i| rank[i])
            .sum();
        let dangling_share = params.damping * dangling_mass / n as f64;

        let mut next = vec![base + dangling_share; n];
        for (src, links) in out_links.iter().enumerate() {
            if links.is_empty() {
                continue;
            }
            let share = params.damping * rank[src] / links.len() as f64;
            for &dst in links {
                next[dst as usize] += share;
            }
        }

        let delta: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
        rank = next;
        if delta < params.tolerance {
            break;
        }
    }

    let mut id_to_score: HashMap<u32, f64> = HashMap::with_capacity(n);
    for (id, score) in rank.into_iter().enumerate() {
        id_to_score.insert(id as u32, score);
    }

    let mut buf = String::new();
    for id in 0..n_nodes {
        let score = id_to_score.get(&id).copied().unwrap_or(0.0);
        buf.push_str(&format!("node {id} : {score}\n"));
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_matches_rank_ingest_line_format() {
        let edges = vec![Edge { src_id: 0, dst_id: 1 }, Edge { src_id: 1, dst_id: 0 }];
        let output = run(&edges, 2, &RankerParams::default());
        assert!(output.contains("node 0 : "));
        assert!(output.contains("node 1 : "));
    }

    #[test]
    fn symmetric_cycle_splits_rank_evenly() {
        let edges = vec![
            Edge { src_id: 0, dst_id: 1 },
            Edge { src_id: 1, dst_id: 2 },
            Edge { src_id: 2, dst_id: 0 },
        ];
        let output = run(&edges, 3, &RankerParams::default());
        let scores: Vec<f64> = output
            .lines()
            .map(|l| l.rsplit(':').next().unwrap().trim().parse().unwrap())
            .collect();
        for s in &scores {
            assert!((s - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn dangling_node_mass_is_redistributed() {
        // node 1 has no outlinks; its rank mass must not vanish from the system.
        let edges = vec![Edge { src_id: 0, dst_id: 1 }];
        let output = run(&edges, 2, &RankerParams::default());
        let total: f64 = output
            .lines()
            .map(|l| l.rsplit(':').next().unwrap().trim().parse::<f64>().unwrap())
            .sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_nodes_yields_empty_output() {
        assert_eq!(run(&[], 0, &RankerParams::default()), "");
    }
}
