//! CLI binary for link-retriever.
//!
//! Prints the retrieval report as JSON on stdout. Logs go to stderr so
//! stdout stays machine-readable.

use std::path::PathBuf;

use clap::Parser;
use link_retriever::{Query, Retriever, RetrieverConfig, SearchBackend};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Retrieve live, de-duplicated web search results.
#[derive(Parser)]
#[command(name = "link-retriever", version, about)]
struct Cli {
    /// Path to TOML configuration file. Defaults to the user config path if it exists.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search backend, overriding the config file.
    #[arg(short, long)]
    backend: Option<SearchBackend>,

    /// Restrict results to URLs containing this domain. Repeatable.
    #[arg(short, long = "domain")]
    domains: Vec<String>,

    /// Number of results wanted.
    #[arg(short = 'n', long, default_value_t = 7)]
    max_results: usize,

    /// Search query.
    #[arg(required = true)]
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("link_retriever=info,warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => RetrieverConfig::from_file(path)?,
        None => {
            let default_path = RetrieverConfig::default_config_path();
            if default_path.exists() {
                RetrieverConfig::from_file(&default_path)?
            } else {
                RetrieverConfig::default()
            }
        }
    };
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    let retriever = Retriever::from_env(config)?;
    let query = Query::new(cli.query.join(" "), cli.max_results).with_domains(&cli.domains);

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, returning partial results");
            cancel_clone.cancel();
        }
    });

    let report = retriever.retrieve_report(&query, &cancel).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
