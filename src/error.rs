//! Fatal error types.
//!
//! Only conditions that must abort a run live here: missing credentials,
//! invalid configuration, and malformed batch files during normalization.
//! Per-page fetch failures are not represented; the collector degrades
//! them to empty pages instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("NEWS_API_KEY is not set; pass --api-key or set it in the environment or .env file")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("Malformed JSON in {path}: {source}")]
    MalformedBatch {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
