//! Data models for collected articles and category batches.
//!
//! This module defines the core data structures shared by both pipeline stages:
//! - [`Category`]: The fixed set of topics the collector walks
//! - [`CollectionMode`]: Headline vs. date-ranged search collection
//! - [`Article`]: A raw upstream record, kept as a dynamic JSON map
//! - [`ArticlesResponse`]: The envelope returned by the search API
//! - [`CategoryBatch`]: Everything collected for one category in one run
//!
//! Articles are deliberately not a fixed struct. The upstream schema is not
//! contractually fixed, so any field may be missing and undocumented fields
//! must survive the round trip to disk untouched.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;

/// A raw article record exactly as returned by the upstream API.
///
/// Key order is preserved (`serde_json` is built with `preserve_order`), so
/// extra columns discovered during normalization keep their first-seen order.
pub type Article = serde_json::Map<String, serde_json::Value>;

/// The topic categories supported by the collector.
///
/// The set mirrors the categories exposed by the top-headlines endpoint.
/// In search mode the lowercase label doubles as the free-text query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    /// Every category, in collection order.
    pub const ALL: [Category; 7] = [
        Category::Business,
        Category::Entertainment,
        Category::General,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    /// The lowercase label used in query parameters and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::General => "general",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the collector queries the upstream API.
///
/// - **Headlines**: current top headlines filtered by category. The endpoint
///   has no page parameter, so every iteration repeats the same request.
/// - **Search**: free-text search for the category label within a date range,
///   paging explicitly and stopping at the first empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CollectionMode {
    Headlines,
    #[default]
    Search,
}

impl CollectionMode {
    /// Path segment appended to the API base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            CollectionMode::Headlines => "top-headlines",
            CollectionMode::Search => "everything",
        }
    }
}

/// The JSON envelope returned by both endpoints.
///
/// Only `articles` matters to the collector; a payload without it is treated
/// as an empty page. Entries are kept as raw values so one malformed entry
/// does not fail the whole page.
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
pub struct ArticlesResponse {
    /// `"ok"` or `"error"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Total hits reported upstream (not the number returned in this page).
    #[serde(default)]
    pub totalResults: Option<u64>,
    #[serde(default)]
    pub articles: Vec<serde_json::Value>,
}

impl ArticlesResponse {
    /// Split the page into its object entries and the number of other entries
    /// (`null`, strings, ...) that were dropped.
    pub fn into_articles(self) -> (Vec<Article>, usize) {
        let total = self.articles.len();
        let articles: Vec<Article> = self
            .articles
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        let skipped = total - articles.len();
        (articles, skipped)
    }
}

/// All articles collected for one category in one run.
///
/// Identified by `(category, collected_on)`; written once and never
/// modified afterwards.
#[derive(Debug, Clone)]
pub struct CategoryBatch {
    pub category: Category,
    /// Wall-clock date at collection time, not the query window.
    pub collected_on: NaiveDate,
    /// Articles in upstream order, concatenated across pages.
    pub articles: Vec<Article>,
}

impl CategoryBatch {
    /// File name following the `<category>_articles_<YYYY-MM-DD>.json` convention.
    pub fn file_name(&self) -> String {
        format!(
            "{}_articles_{}.json",
            self.category,
            self.collected_on.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels_are_lowercase() {
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "business",
                "entertainment",
                "general",
                "health",
                "science",
                "sports",
                "technology"
            ]
        );
        assert_eq!(Category::Health.to_string(), "health");
    }

    #[test]
    fn test_category_deserializes_from_label() {
        let c: Category = serde_yaml::from_str("sports").unwrap();
        assert_eq!(c, Category::Sports);
    }

    #[test]
    fn test_mode_endpoints() {
        assert_eq!(CollectionMode::Headlines.endpoint(), "top-headlines");
        assert_eq!(CollectionMode::Search.endpoint(), "everything");
    }

    #[test]
    fn test_batch_file_name() {
        let batch = CategoryBatch {
            category: Category::Business,
            collected_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            articles: vec![],
        };
        assert_eq!(batch.file_name(), "business_articles_2024-01-01.json");
    }

    #[test]
    fn test_response_without_articles_is_empty() {
        let resp: ArticlesResponse =
            serde_json::from_str(r#"{"status": "ok", "totalResults": 0}"#).unwrap();
        assert!(resp.articles.is_empty());
        assert_eq!(resp.totalResults, Some(0));
    }

    #[test]
    fn test_response_keeps_unknown_fields_in_order() {
        let resp: ArticlesResponse = serde_json::from_str(
            r#"{"articles": [{"zeta": 1, "title": "A", "alpha": true}]}"#,
        )
        .unwrap();
        let (articles, skipped) = resp.into_articles();
        assert_eq!(skipped, 0);
        let keys: Vec<&String> = articles[0].keys().collect();
        assert_eq!(keys, vec!["zeta", "title", "alpha"]);
    }

    #[test]
    fn test_response_drops_non_object_entries() {
        let resp: ArticlesResponse = serde_json::from_str(
            r#"{"articles": [{"title": "A"}, null, "junk", {"title": "B"}]}"#,
        )
        .unwrap();
        let (articles, skipped) = resp.into_articles();
        assert_eq!(skipped, 2);
        let titles: Vec<&str> = articles
            .iter()
            .map(|a| a["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }
}
