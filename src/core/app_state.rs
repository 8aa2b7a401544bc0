use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::config::CrawlRankConfig;
use crate::pipeline::Corpus;

/// Shared server state: one HTTP client reused by every crawl, the resolved
/// config, and the most recently built corpus. `/api/pagerank/url` rebuilds
/// the corpus from a fresh crawl and stores it here; `/api/search` reads
/// whatever corpus is currently held.
#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    pub config: Arc<CrawlRankConfig>,
    pub corpus: Arc<RwLock<Option<Corpus>>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(http_client: reqwest::Client, config: CrawlRankConfig) -> Self {
        Self { http_client, config: Arc::new(config), corpus: Arc::new(RwLock::new(None)) }
    }
}
