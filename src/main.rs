use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use chirp::config::Config;
use chirp::feed::SearchClient;

#[derive(Parser, Debug)]
#[command(name = "chirp", about = "Search a feed-style Atom endpoint from the terminal")]
struct Args {
    /// Keyword or phrase to search for
    keyword: String,

    /// Override the search endpoint URL
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Path to an alternative config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print at most N posts
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    let client = SearchClient::from_config(&config).context("failed to set up search client")?;
    let posts = client.search(&args.keyword).await?;

    if posts.is_empty() {
        println!("no results for {:?}", args.keyword);
        return Ok(());
    }

    let shown = args.limit.unwrap_or(posts.len());
    for post in posts.iter().take(shown) {
        println!("{post}");
    }

    Ok(())
}
