use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CrawlRankConfig — file-based config loader (crawlrank.json) with env-var
// fallback, mirroring the resolve-chain pattern: JSON field -> env var ->
// hardcoded default.
// ---------------------------------------------------------------------------

/// Top-level config loaded from `crawlrank.json`. Every field is optional so a
/// partial or absent file still works; `resolve_*` methods apply the fallback
/// chain.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct CrawlRankConfig {
    pub max_pages: Option<usize>,
    pub workers: Option<usize>,
    pub target_lang: Option<String>,
    pub damping: Option<f64>,
    pub tolerance: Option<f64>,
    pub max_iter: Option<usize>,
    pub top_k: Option<usize>,
}

impl CrawlRankConfig {
    /// Crawl budget: JSON field -> `CRAWLRANK_MAX_PAGES` env var -> 100.
    pub fn resolve_max_pages(&self) -> usize {
        if let Some(n) = self.max_pages {
            return n;
        }
        std::env::var("CRAWLRANK_MAX_PAGES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100)
    }

    /// Concurrent fetch workers: JSON field -> `CRAWLRANK_WORKERS` env var -> 5.
    pub fn resolve_workers(&self) -> usize {
        if let Some(n) = self.workers {
            return n.max(1);
        }
        std::env::var("CRAWLRANK_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(|n: usize| n.max(1))
            .unwrap_or(5)
    }

    /// Optional target-language filter: JSON field -> `CRAWLRANK_TARGET_LANG`
    /// env var -> `None` (no filtering).
    pub fn resolve_target_lang(&self) -> Option<String> {
        if let Some(l) = &self.target_lang {
            if !l.trim().is_empty() {
                return Some(l.trim().to_string());
            }
        }
        std::env::var("CRAWLRANK_TARGET_LANG")
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    /// PageRank damping factor alpha: JSON field -> `CRAWLRANK_DAMPING` env
    /// var -> 0.85.
    pub fn resolve_damping(&self) -> f64 {
        if let Some(d) = self.damping {
            return d;
        }
        std::env::var("CRAWLRANK_DAMPING")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.85)
    }

    /// PageRank convergence tolerance: JSON field -> `CRAWLRANK_TOLERANCE` env
    /// var -> 1e-8.
    pub fn resolve_tolerance(&self) -> f64 {
        if let Some(t) = self.tolerance {
            return t;
        }
        std::env::var("CRAWLRANK_TOLERANCE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1e-8)
    }

    /// Max PageRank iterations: JSON field -> `CRAWLRANK_MAX_ITER` env var -> 100.
    pub fn resolve_max_iter(&self) -> usize {
        if let Some(n) = self.max_iter {
            return n;
        }
        std::env::var("CRAWLRANK_MAX_ITER")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100)
    }

    /// Default `top_k` for search/rank responses: JSON field ->
    /// `CRAWLRANK_TOP_K` env var -> 10.
    pub fn resolve_top_k(&self) -> usize {
        if let Some(n) = self.top_k {
            return n;
        }
        std::env::var("CRAWLRANK_TOP_K")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10)
    }
}

/// Load `crawlrank.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `CRAWLRANK_CONFIG` env var path
/// 2. `./crawlrank.json` (process cwd)
/// 3. `../crawlrank.json` (one level up)
///
/// Missing file -> `CrawlRankConfig::default()` (silent, all env-var fallbacks
/// apply). Parse error -> log a warning, return `CrawlRankConfig::default()`.
pub fn load_config() -> CrawlRankConfig {
    let mut candidates: Vec<PathBuf> = vec![
        PathBuf::from("crawlrank.json"),
        PathBuf::from("../crawlrank.json"),
    ];
    if let Ok(env_path) = std::env::var("CRAWLRANK_CONFIG") {
        candidates.insert(0, PathBuf::from(env_path));
    }

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                return match serde_json::from_str::<CrawlRankConfig>(&contents) {
                    Ok(cfg) => {
                        tracing::info!("crawlrank.json loaded from {}", path.display());
                        cfg
                    }
                    Err(e) => {
                        tracing::warn!(
                            "crawlrank.json parse error at {}: {} — using defaults",
                            path.display(),
                            e
                        );
                        CrawlRankConfig::default()
                    }
                };
            }
            Err(_) => continue, // file not found at this path — try next
        }
    }

    CrawlRankConfig::default()
}
