//! Collector configuration.
//!
//! Configuration is assembled in two layers:
//!
//! 1. [`CollectorSettings`]: tunables with defaults, optionally loaded from a
//!    YAML file passed via `--config`.
//! 2. [`CollectorConfig`]: the validated, explicit configuration handed to the
//!    [`Collector`](crate::collector::Collector). It is built exactly once at
//!    startup; nothing downstream reads the process environment.
//!
//! # Example `config.yaml`
//!
//! ```yaml
//! base_url: https://newsapi.org/v2
//! page_size: 100
//! max_pages: 10
//! categories: [business, science]
//! raw_dir: data/raw
//! ```

use crate::error::{HarvestError, Result};
use crate::models::{Category, CollectionMode};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

/// Largest page size the upstream API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Tunables for the collector, all optional in the YAML file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CollectorSettings {
    pub base_url: String,
    /// Headline mode only.
    pub country: String,
    /// Search mode only.
    pub language: String,
    /// Search mode only.
    pub sort_by: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub categories: Vec<Category>,
    pub raw_dir: PathBuf,
    /// Per-request timeout in search mode. Headline requests have none.
    pub search_timeout_secs: u64,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            country: "us".to_string(),
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            page_size: MAX_PAGE_SIZE,
            max_pages: 10,
            categories: Category::ALL.to_vec(),
            raw_dir: PathBuf::from("data/raw"),
            search_timeout_secs: 30,
        }
    }
}

impl CollectorSettings {
    /// Load settings from a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let settings: CollectorSettings = serde_yaml::from_str(&raw)?;
        info!("Loaded collector settings");
        Ok(settings)
    }
}

/// Per-run values supplied on the command line or through the environment.
#[derive(Default)]
pub struct RunOptions {
    pub api_key: Option<String>,
    pub mode: CollectionMode,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Validated configuration for one collection run.
#[derive(Clone)]
pub struct CollectorConfig {
    pub api_key: String,
    pub mode: CollectionMode,
    pub endpoint: Url,
    pub country: String,
    pub language: String,
    pub sort_by: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub categories: Vec<Category>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub raw_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl CollectorConfig {
    /// Validate settings and run options into a usable configuration.
    ///
    /// # Errors
    ///
    /// - [`HarvestError::MissingApiKey`] when no non-blank key was supplied
    /// - [`HarvestError::InvalidBaseUrl`] when the base URL does not parse
    /// - [`HarvestError::InvalidConfig`] for out-of-range sizes, an empty
    ///   category list, or a reversed date range
    pub fn new(settings: CollectorSettings, opts: RunOptions) -> Result<Self> {
        let api_key = opts
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(HarvestError::MissingApiKey)?;

        if settings.page_size == 0 || settings.page_size > MAX_PAGE_SIZE {
            return Err(HarvestError::InvalidConfig(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                settings.page_size
            )));
        }
        if settings.max_pages == 0 {
            return Err(HarvestError::InvalidConfig(
                "max_pages must be at least 1".to_string(),
            ));
        }
        if settings.search_timeout_secs == 0 {
            return Err(HarvestError::InvalidConfig(
                "search_timeout_secs must be at least 1".to_string(),
            ));
        }
        if settings.categories.is_empty() {
            return Err(HarvestError::InvalidConfig(
                "at least one category is required".to_string(),
            ));
        }
        if let (Some(from), Some(to)) = (opts.from, opts.to) {
            if from > to {
                return Err(HarvestError::InvalidConfig(format!(
                    "date range is reversed: from {from} is after to {to}"
                )));
            }
        }

        // Url::join drops the last segment unless the base ends with '/'.
        let base = format!("{}/", settings.base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&base)?.join(opts.mode.endpoint())?;

        let timeout = match opts.mode {
            CollectionMode::Search => Some(Duration::from_secs(settings.search_timeout_secs)),
            CollectionMode::Headlines => None,
        };

        Ok(Self {
            api_key,
            mode: opts.mode,
            endpoint,
            country: settings.country,
            language: settings.language,
            sort_by: settings.sort_by,
            page_size: settings.page_size,
            max_pages: settings.max_pages,
            categories: settings.categories,
            from: opts.from,
            to: opts.to,
            raw_dir: settings.raw_dir,
            timeout,
        })
    }
}

impl fmt::Debug for CollectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorConfig")
            .field("api_key", &"<redacted>")
            .field("mode", &self.mode)
            .field("endpoint", &self.endpoint.as_str())
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("categories", &self.categories)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("raw_dir", &self.raw_dir)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(key: Option<&str>) -> RunOptions {
        RunOptions {
            api_key: key.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = CollectorConfig::new(CollectorSettings::default(), opts(None)).unwrap_err();
        assert!(matches!(err, HarvestError::MissingApiKey));
    }

    #[test]
    fn test_blank_api_key_is_fatal() {
        let err =
            CollectorConfig::new(CollectorSettings::default(), opts(Some("   "))).unwrap_err();
        assert!(matches!(err, HarvestError::MissingApiKey));
    }

    #[test]
    fn test_defaults_for_search_mode() {
        let config = CollectorConfig::new(CollectorSettings::default(), opts(Some("k"))).unwrap();
        assert_eq!(config.endpoint.as_str(), "https://newsapi.org/v2/everything");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.categories.len(), 7);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.raw_dir, PathBuf::from("data/raw"));
    }

    #[test]
    fn test_headline_mode_has_no_timeout() {
        let config = CollectorConfig::new(
            CollectorSettings::default(),
            RunOptions {
                api_key: Some("k".into()),
                mode: CollectionMode::Headlines,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            config.endpoint.as_str(),
            "https://newsapi.org/v2/top-headlines"
        );
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_rejects_oversized_page() {
        let settings = CollectorSettings {
            page_size: 101,
            ..Default::default()
        };
        let err = CollectorConfig::new(settings, opts(Some("k"))).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_zero_pages_and_empty_categories() {
        let settings = CollectorSettings {
            max_pages: 0,
            ..Default::default()
        };
        assert!(CollectorConfig::new(settings, opts(Some("k"))).is_err());

        let settings = CollectorSettings {
            categories: vec![],
            ..Default::default()
        };
        assert!(CollectorConfig::new(settings, opts(Some("k"))).is_err());
    }

    #[test]
    fn test_rejects_zero_search_timeout() {
        let settings = CollectorSettings {
            search_timeout_secs: 0,
            ..Default::default()
        };
        let err = CollectorConfig::new(settings, opts(Some("k"))).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_reversed_date_range() {
        let err = CollectorConfig::new(
            CollectorSettings::default(),
            RunOptions {
                api_key: Some("k".into()),
                from: NaiveDate::from_ymd_opt(2024, 2, 1),
                to: NaiveDate::from_ymd_opt(2024, 1, 1),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let settings = CollectorSettings {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        let err = CollectorConfig::new(settings, opts(Some("k"))).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_settings_from_yaml_keep_defaults() {
        let settings: CollectorSettings =
            serde_yaml::from_str("max_pages: 3\ncategories: [science, health]\n").unwrap();
        assert_eq!(settings.max_pages, 3);
        assert_eq!(
            settings.categories,
            vec![Category::Science, Category::Health]
        );
        assert_eq!(settings.page_size, 100);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config =
            CollectorConfig::new(CollectorSettings::default(), opts(Some("secret-key"))).unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("<redacted>"));
    }
}
