use tracing::info;

use crawlrank::core::config;
use crawlrank::crawler;
use crawlrank::pipeline;

/// `--flag value` or `--flag=value`, teacher's manual arg-parsing style
/// (see the old `parse_port_from_args` convention) rather than a `clap`
/// dependency this crate has no other use for.
fn parse_flag(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == name {
            return it.next().cloned();
        }
        if let Some(rest) = a.strip_prefix(prefix.as_str()) {
            return Some(rest.to_string());
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = args.first().cloned().ok_or_else(|| {
        anyhow::anyhow!(
            "usage: crawlrank <seed_url> [--query <text>] [--top-k N] [--max-pages N] [--workers N] [--lang <tag>]"
        )
    })?;

    let mut cfg = config::load_config();
    if let Some(v) = parse_flag(&args, "--max-pages").and_then(|v| v.parse().ok()) {
        cfg.max_pages = Some(v);
    }
    if let Some(v) = parse_flag(&args, "--workers").and_then(|v| v.parse().ok()) {
        cfg.workers = Some(v);
    }
    if let Some(v) = parse_flag(&args, "--lang") {
        cfg.target_lang = Some(v);
    }
    let top_k = parse_flag(&args, "--top-k")
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| cfg.resolve_top_k());
    let query = parse_flag(&args, "--query");

    let client = crawler::build_http_client()?;
    info!("crawling from seed {seed}");
    let corpus = pipeline::build_from_seed(&client, &seed, &cfg).await?;
    info!("corpus ready: {} pages, {} edges", corpus.pages.len(), corpus.edges.len());

    match query {
        Some(q) => {
            let response = corpus.search(&q, top_k)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        None => {
            let response = corpus.to_rank_from_seed_response(&seed, top_k);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
