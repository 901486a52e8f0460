//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Credentials and the search window can also come from environment variables
//! (or a `.env` file loaded at startup).

use crate::models::{Category, CollectionMode};
use crate::normalizer::{DEFAULT_COMBINED, DEFAULT_GLOB};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Collect category news articles and normalize them into CSV.
///
/// # Examples
///
/// ```sh
/// # Search the last month of articles for every category
/// awful_news_harvest collect --from 2025-04-01 --to 2025-04-30
///
/// # Top headlines, two categories only
/// awful_news_harvest collect --mode headlines -C business -C health
///
/// # Flatten everything collected into ./csv
/// awful_news_harvest normalize --glob 'data/raw/*_articles_*.json' --out ./csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch articles per category and write raw JSON batches
    Collect(CollectArgs),
    /// Flatten raw JSON batches into per-file and combined CSVs
    Normalize(NormalizeArgs),
}

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// News API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Collection strategy
    #[arg(long, value_enum, default_value_t = CollectionMode::Search)]
    pub mode: CollectionMode,

    /// Start of the search window (YYYY-MM-DD, inclusive)
    #[arg(long, env = "NEWS_START_DATE")]
    pub from: Option<NaiveDate>,

    /// End of the search window (YYYY-MM-DD, inclusive)
    #[arg(long, env = "NEWS_END_DATE")]
    pub to: Option<NaiveDate>,

    /// Optional path to a collector config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for raw JSON batches (overrides config)
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Maximum pages per category (overrides config)
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Articles per page (overrides config)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Restrict collection to these categories (repeatable, overrides config)
    #[arg(short = 'C', long = "category", value_enum)]
    pub categories: Vec<Category>,
}

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Input file glob
    #[arg(long, default_value = DEFAULT_GLOB)]
    pub glob: String,

    /// Output directory
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Combined CSV filename
    #[arg(long, default_value = DEFAULT_COMBINED)]
    pub combined: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults() {
        let cli = Cli::parse_from(["awful_news_harvest", "normalize"]);
        let Command::Normalize(args) = cli.command else {
            panic!("expected normalize");
        };
        assert_eq!(args.glob, "*_articles_*.json");
        assert_eq!(args.out, PathBuf::from("."));
        assert_eq!(args.combined, "all_articles.csv");
    }

    #[test]
    fn test_collect_flags() {
        let cli = Cli::parse_from([
            "awful_news_harvest",
            "collect",
            "--api-key",
            "k",
            "--mode",
            "headlines",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
            "-C",
            "business",
            "--category",
            "science",
            "--max-pages",
            "3",
        ]);
        let Command::Collect(args) = cli.command else {
            panic!("expected collect");
        };
        assert_eq!(args.api_key.as_deref(), Some("k"));
        assert_eq!(args.mode, CollectionMode::Headlines);
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(args.to, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(args.categories, vec![Category::Business, Category::Science]);
        assert_eq!(args.max_pages, Some(3));
    }

    #[test]
    fn test_rejects_bad_date() {
        let res = Cli::try_parse_from([
            "awful_news_harvest",
            "collect",
            "--api-key",
            "k",
            "--from",
            "01/02/2024",
        ]);
        assert!(res.is_err());
    }
}
