//! # Awful News Harvest
//!
//! A bulk collector for category news articles. It pages through an external
//! search API for a fixed set of topics, stores the raw results per category,
//! and flattens them into CSV for analysis.
//!
//! ## Usage
//!
//! ```sh
//! awful_news_harvest collect --from 2025-04-01 --to 2025-04-30
//! awful_news_harvest normalize --glob 'data/raw/*_articles_*.json' --out ./csv
//! ```
//!
//! ## Architecture
//!
//! Two stages, run separately and joined by files on disk:
//! 1. **Collect**: For each category, fetch up to `max_pages` pages and write
//!    `data/raw/<category>_articles_<YYYY-MM-DD>.json`
//! 2. **Normalize**: Flatten every matching batch into a canonical column set,
//!    write one CSV per batch plus a combined CSV
//!
//! Both stages are strictly sequential. Collection is best-effort: failed pages
//! count as empty. A missing API key or malformed batch JSON aborts the run.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod collector;
mod config;
mod error;
mod models;
mod normalizer;
mod outputs;
mod utils;

use api::NewsApiClient;
use cli::{Cli, CollectArgs, Command, NormalizeArgs};
use collector::Collector;
use config::{CollectorConfig, CollectorSettings, RunOptions};
use utils::{collection_date, ensure_writable_dir};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    // A missing .env file is fine; real environment variables still apply.
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }

    let start_time = std::time::Instant::now();
    let args = Cli::parse();

    let res = match args.command {
        Command::Collect(collect_args) => collect(collect_args).await,
        Command::Normalize(normalize_args) => normalize(normalize_args),
    };

    let elapsed = start_time.elapsed();
    match &res {
        Ok(()) => info!(?elapsed, secs = elapsed.as_secs(), "Execution complete"),
        Err(e) => error!(?elapsed, error = %e, "Execution failed"),
    }
    res
}

#[instrument(level = "info", skip_all, fields(mode = ?args.mode))]
async fn collect(args: CollectArgs) -> Result<(), Box<dyn Error>> {
    let mut settings = match &args.config {
        Some(path) => CollectorSettings::load(path).await?,
        None => CollectorSettings::default(),
    };
    if let Some(raw_dir) = args.raw_dir {
        settings.raw_dir = raw_dir;
    }
    if let Some(max_pages) = args.max_pages {
        settings.max_pages = max_pages;
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }
    if !args.categories.is_empty() {
        settings.categories = args.categories;
    }

    // Validated once, before any request is issued.
    let config = CollectorConfig::new(
        settings,
        RunOptions {
            api_key: args.api_key,
            mode: args.mode,
            from: args.from,
            to: args.to,
        },
    )?;
    info!(?config, "Collector configured");

    if let Err(e) = ensure_writable_dir(&config.raw_dir).await {
        error!(
            path = %config.raw_dir.display(),
            error = %e,
            "Raw output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let collector = Collector::new(NewsApiClient::new()?, config);
    let written = collector.run(collection_date()).await?;
    info!(files = written.len(), "Collection finished");
    Ok(())
}

#[instrument(level = "info", skip_all, fields(glob = %args.glob))]
fn normalize(args: NormalizeArgs) -> Result<(), Box<dyn Error>> {
    let summary = normalizer::process(&args.glob, &args.out, &args.combined)?;
    match &summary.combined {
        Some(path) => info!(
            files = summary.files.len(),
            rows = summary.combined_rows,
            path = %path.display(),
            "Normalization finished"
        ),
        None => info!("Normalization finished with no input files"),
    }
    Ok(())
}
