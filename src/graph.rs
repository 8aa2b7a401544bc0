//! Graph Materializer (Component D).
//!
//! Consumes raw `(src_url, dst_url)` edge pairs plus the url-to-id table built
//! during the crawl, and produces the deduplicated, self-loop-free edge list
//! and the `pages.json`/`edges.txt` serialized forms. Dedup happens at
//! materialization time, not at record time; see original_source
//! `api/build_corpus.py::step_crawl`'s `seen` set.

use std::collections::{HashMap, HashSet};

use crate::core::types::{Edge, Page};

/// Map `(src_url, dst_url)` pairs through `url_to_id`, drop self-loops and
/// any endpoint absent from the table, and deduplicate.
pub fn materialize_edges(
    edges_url: &[(String, String)],
    url_to_id: &HashMap<String, u32>,
) -> Vec<Edge> {
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut out = Vec::new();

    for (src_url, dst_url) in edges_url {
        let (Some(&src_id), Some(&dst_id)) = (url_to_id.get(src_url), url_to_id.get(dst_url))
        else {
            continue;
        };
        if src_id == dst_id {
            continue;
        }
        if seen.insert((src_id, dst_id)) {
            out.push(Edge { src_id, dst_id });
        }
    }

    out
}

/// Render `edges.txt`: one `"<src_id> <dst_id>\n"` line per edge.
pub fn render_edges_txt(edges: &[Edge]) -> String {
    let mut buf = String::new();
    for e in edges {
        buf.push_str(&e.src_id.to_string());
        buf.push(' ');
        buf.push_str(&e.dst_id.to_string());
        buf.push('\n');
    }
    buf
}

/// Render `pages.json`: pretty-printed, 2-space-indented JSON array, in
/// first-visit order (the order `pages` is already in).
pub fn render_pages_json(pages: &[Page]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(pairs: &[(&str, u32)]) -> HashMap<String, u32> {
        pairs.iter().map(|(u, id)| (u.to_string(), *id)).collect()
    }

    #[test]
    fn drops_self_loops() {
        let url_to_id = ids(&[("a", 1), ("b", 2)]);
        let edges = materialize_edges(
            &[("a".into(), "a".into()), ("a".into(), "b".into())],
            &url_to_id,
        );
        assert_eq!(edges, vec![Edge { src_id: 1, dst_id: 2 }]);
    }

    #[test]
    fn drops_endpoints_missing_from_id_table() {
        let url_to_id = ids(&[("a", 1)]);
        let edges = materialize_edges(&[("a".into(), "ghost".into())], &url_to_id);
        assert!(edges.is_empty());
    }

    #[test]
    fn deduplicates_repeated_edges() {
        let url_to_id = ids(&[("a", 1), ("b", 2)]);
        let edges = materialize_edges(
            &[
                ("a".into(), "b".into()),
                ("a".into(), "b".into()),
                ("a".into(), "b".into()),
            ],
            &url_to_id,
        );
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn edge_file_well_formedness() {
        let url_to_id = ids(&[("a", 1), ("b", 2), ("c", 3)]);
        let edges = materialize_edges(
            &[("a".into(), "b".into()), ("b".into(), "c".into()), ("a".into(), "b".into())],
            &url_to_id,
        );
        let text = render_edges_txt(&edges);
        assert_eq!(text, "1 2\n2 3\n");
        for e in &edges {
            assert_ne!(e.src_id, e.dst_id);
        }
    }

    #[test]
    fn pages_json_is_pretty_printed() {
        let pages = vec![Page { id: 0, url: "http://x/".into(), text: "hi".into() }];
        let json = render_pages_json(&pages).unwrap();
        assert!(json.contains("  \"id\""));
    }
}
