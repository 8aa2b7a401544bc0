use thiserror::Error;

/// Error taxonomy for the crawl/index/search core.
///
/// Transient per-URL failures (timeouts, non-2xx, wrong content-type, oversized
/// bodies, HTML parse errors) never reach this type — the crawler swallows and
/// logs them internally (see `crawler::crawl`). `CrawlRankError` is reserved
/// for the three classes that need to surface to the caller: configuration,
/// index/ranker state, and pipeline-level ingest failures.
#[derive(Debug, Error)]
pub enum CrawlRankError {
    /// Invalid input that fails fast before any work starts: a malformed seed
    /// URL, a non-http(s) scheme, or a missing input file for an ingest step.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A caller violated the TF-IDF index's Building/Finalized state machine:
    /// `search` before `finalize`, `add_document` after `finalize`, or
    /// `finalize` with zero documents.
    #[error("index state error: {0}")]
    IndexState(String),

    /// The rank ingestor produced zero parsable or zero joinable entries.
    #[error("pipeline error: {0}")]
    Pipeline(String),
}

impl CrawlRankError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn index_state(msg: impl Into<String>) -> Self {
        Self::IndexState(msg.into())
    }

    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }
}
