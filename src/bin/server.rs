//! Thin HTTP façade over the crawl-rank-search pipeline: `/api/search` and
//! `/api/pagerank/url`, built on axum/tower-http. Kept intentionally
//! minimal — the HTTP layer is wiring around the pipeline, not a module of
//! the corpus-building logic itself.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crawlrank::core::app_state::AppState;
use crawlrank::core::config;
use crawlrank::core::types::{RankFromSeedResponse, SearchResponse};
use crawlrank::{crawler, pipeline};

#[derive(Debug, Deserialize)]
struct SearchQuery {
    query: String,
    top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct PageRankRequest {
    url: String,
    max_pages: Option<usize>,
    top_k: Option<usize>,
    lang: Option<String>,
    workers: Option<usize>,
}

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

fn port_from_env() -> u16 {
    std::env::var("CRAWLRANK_PORT")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(8080)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cfg = config::load_config();
    let http_client = crawler::build_http_client()?;
    let state = Arc::new(AppState::new(http_client, cfg));

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/search", get(search_handler))
        .route("/api/pagerank/url", post(pagerank_url_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let bind_addr = format!("0.0.0.0:{}", port_from_env());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("crawlrank server listening on http://{bind_addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let top_k = params.top_k.unwrap_or_else(|| state.config.resolve_top_k());
    let corpus_guard = state.corpus.read().await;
    let Some(corpus) = corpus_guard.as_ref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse { error: "no corpus built yet; POST /api/pagerank/url first".into() }),
        ));
    };

    corpus.search(&params.query, top_k).map(Json).map_err(|e| {
        error!("search error: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: e.to_string() }))
    })
}

async fn pagerank_url_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PageRankRequest>,
) -> Result<Json<RankFromSeedResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut cfg = (*state.config).clone();
    if let Some(v) = request.max_pages {
        cfg.max_pages = Some(v);
    }
    if let Some(v) = request.workers {
        cfg.workers = Some(v);
    }
    if let Some(v) = request.lang {
        cfg.target_lang = Some(v);
    }
    let top_k = request.top_k.unwrap_or_else(|| cfg.resolve_top_k());

    let built = pipeline::build_from_seed(&state.http_client, &request.url, &cfg).await.map_err(|e| {
        warn!("pagerank build failed for {}: {e}", request.url);
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e.to_string() }))
    })?;

    let response = built.to_rank_from_seed_response(&request.url, top_k);
    *state.corpus.write().await = Some(built);

    Ok(Json(response))
}
