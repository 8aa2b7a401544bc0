//! Concurrent Crawler (Component C).
//!
//! Bounded BFS over same-domain links, a fixed-size worker pool of parallel
//! fetchers, with a single control loop that owns all shared mutable state
//! (`visited`, `url_to_id`, pages, edges) — worker tasks are pure
//! functions of `(url, base_domain, target_lang)` and never touch shared
//! state directly, returning `(url, outcome)` pairs for the control loop to
//! fold in. Batch fan-out is grounded on `tools/crawl.rs`'s
//! `stream::iter(..).buffer_unordered(..)` pattern, generalized to this
//! stricter single-aggregator contract.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use url::Url;

use crate::core::errors::CrawlRankError;
use crate::core::types::Page;
use crate::extract;
use crate::url_norm;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) crawlrank/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
const POLITE_PAUSE: Duration = Duration::from_millis(100);

/// Build the shared HTTP client used by every crawler worker: a desktop
/// User-Agent and a 2s request timeout, built once and shared across all
/// fetches.
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

pub struct CrawlOutput {
    pub pages: Vec<Page>,
    pub edges_url: Vec<(String, String)>,
    pub url_to_id: HashMap<String, u32>,
    pub visited: HashSet<String>,
}

/// A worker's result for one URL: `None` means a transient failure (network
/// error, non-200, wrong content-type, oversized body, parse error) — the
/// spec swallows these, the URL stays visited, and nothing else is recorded.
struct FetchOutcome {
    url: String,
    data: Option<PageFetchResult>,
}

struct PageFetchResult {
    text: String,
    lang: Option<String>,
    /// Candidate outlinks: resolved, canonical, same-domain, http(s) only.
    /// Not yet deduplicated or id-assigned — materialization handles dedup.
    outlinks: Vec<String>,
}

/// Crawl `seed` up to `max_pages` visited URLs, using up to `workers`
/// concurrent fetches in flight, optionally restricting indexed/expanded
/// pages to `target_lang` (a language-tag prefix, e.g. `"en"`).
pub async fn crawl(
    client: &reqwest::Client,
    seed: &str,
    max_pages: usize,
    target_lang: Option<&str>,
    workers: usize,
) -> Result<CrawlOutput, CrawlRankError> {
    let seed_canonical = url_norm::normalize(seed)
        .ok_or_else(|| CrawlRankError::configuration(format!("invalid seed URL: {seed}")))?;
    let seed_parsed = Url::parse(&seed_canonical)
        .map_err(|e| CrawlRankError::configuration(format!("invalid seed URL: {e}")))?;
    let seed_host = seed_parsed
        .host_str()
        .ok_or_else(|| CrawlRankError::configuration("seed URL has no host"))?;
    let base = url_norm::base_domain(seed_host);

    let workers = workers.max(1);

    let mut frontier: VecDeque<String> = VecDeque::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut url_to_id: HashMap<String, u32> = HashMap::new();
    let mut next_id: u32 = 0;
    let mut page_order: Vec<u32> = Vec::new();
    let mut pages_by_id: HashMap<u32, Page> = HashMap::new();
    let mut edges_url: Vec<(String, String)> = Vec::new();

    frontier.push_back(seed_canonical);

    while !frontier.is_empty() && visited.len() < max_pages {
        let remaining = max_pages - visited.len();
        let batch_size = workers.min(remaining);

        let mut batch: Vec<String> = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            let Some(url) = frontier.pop_front() else { break };
            if visited.contains(&url) {
                continue;
            }
            visited.insert(url.clone());
            batch.push(url);
        }

        if batch.is_empty() {
            break;
        }

        info!("crawl batch of {} (visited {}/{})", batch.len(), visited.len(), max_pages);

        let base_ref = base.clone();
        let outcomes: Vec<FetchOutcome> = stream::iter(batch)
            .map(|url| {
                let client = client.clone();
                let base = base_ref.clone();
                async move {
                    let data = fetch_and_process(&client, &url, &base).await;
                    FetchOutcome { url, data }
                }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        for outcome in outcomes {
            let FetchOutcome { url, data } = outcome;
            let Some(result) = data else { continue };

            if let Some(target) = target_lang {
                if let Some(detected) = &result.lang {
                    if !detected.starts_with(target) {
                        // Language filter: do not index, do not expand; URL
                        // stays visited (already marked above).
                        continue;
                    }
                }
            }

            let id = get_or_assign_id(&mut url_to_id, &mut next_id, &url);
            record_page(&mut pages_by_id, &mut page_order, id, &url, result.text);

            for target in result.outlinks {
                get_or_assign_id(&mut url_to_id, &mut next_id, &target);
                edges_url.push((url.clone(), target.clone()));
                if !visited.contains(&target) {
                    frontier.push_back(target);
                }
            }
        }

        if !frontier.is_empty() && visited.len() < max_pages {
            tokio::time::sleep(POLITE_PAUSE).await;
        }
    }

    let pages = page_order
        .into_iter()
        .filter_map(|id| pages_by_id.remove(&id))
        .collect();

    Ok(CrawlOutput { pages, edges_url, url_to_id, visited })
}

fn get_or_assign_id(url_to_id: &mut HashMap<String, u32>, next_id: &mut u32, url: &str) -> u32 {
    if let Some(&id) = url_to_id.get(url) {
        return id;
    }
    let id = *next_id;
    *next_id += 1;
    url_to_id.insert(url.to_string(), id);
    id
}

/// Keep the longer text on a second observation of the same id. In a single
/// run a canonical URL is fetched at most once (dedup via `visited`), so this
/// is a defensive no-op in practice — carried per the Design Note's
/// resolution of the "keep longer text" open question.
fn record_page(
    pages_by_id: &mut HashMap<u32, Page>,
    page_order: &mut Vec<u32>,
    id: u32,
    url: &str,
    text: String,
) {
    match pages_by_id.get_mut(&id) {
        Some(existing) => {
            if text.len() > existing.text.len() {
                existing.text = text;
            }
        }
        None => {
            pages_by_id.insert(id, Page { id, url: url.to_string(), text });
            page_order.push(id);
        }
    }
}

async fn fetch_and_process(
    client: &reqwest::Client,
    url: &str,
    base: &str,
) -> Option<PageFetchResult> {
    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!("fetch failed for {url}: {e}");
            return None;
        }
    };

    if response.status() != reqwest::StatusCode::OK {
        return None;
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.contains("text/html") {
        return None;
    }

    let bytes = match response.bytes().await {
        Ok(b) => b,
        Err(e) => {
            warn!("body read failed for {url}: {e}");
            return None;
        }
    };
    if bytes.len() > MAX_BODY_BYTES {
        return None;
    }

    let html = String::from_utf8_lossy(&bytes).into_owned();
    let extracted = extract::extract(&html);
    let outlinks = discover_outlinks(&html, url, base);

    Some(PageFetchResult { text: extracted.main_text, lang: extracted.detected_lang, outlinks })
}

fn discover_outlinks(html: &str, base_url: &str, base_domain: &str) -> Vec<String> {
    use scraper::{Html, Selector};

    let document = Html::parse_document(html);
    let Ok(sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for el in document.select(&sel) {
        let Some(href) = el.value().attr("href") else { continue };
        let Some(target) = url_norm::resolve(base_url, href) else { continue };
        if !url_norm::is_followable_scheme(&target) {
            continue;
        }
        if !url_norm::same_domain(&target, base_domain) {
            continue;
        }
        out.push(target);
    }
    out
}
