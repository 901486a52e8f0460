//! Raw batch persistence.
//!
//! Each category batch is written as a single JSON array of the raw upstream
//! records, unmodified, indented with four spaces:
//!
//! ```text
//! data/raw/
//! ├── business_articles_2025-05-06.json
//! ├── health_articles_2025-05-06.json
//! └── ...
//! ```
//!
//! Re-running on the same day overwrites that day's file for the category.

use crate::error::Result;
use crate::models::CategoryBatch;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`CategoryBatch`] into `raw_dir`, creating the directory if needed.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip_all, fields(category = %batch.category, raw_dir = %raw_dir.display()))]
pub async fn write_batch(batch: &CategoryBatch, raw_dir: &Path) -> Result<PathBuf> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    batch.articles.serialize(&mut ser)?;

    if let Err(e) = fs::create_dir_all(raw_dir).await {
        error!(error = %e, "Failed to create raw output dir");
        return Err(e.into());
    }

    let path = raw_dir.join(batch.file_name());
    fs::write(&path, buf).await?;
    info!(path = %path.display(), count = batch.articles.len(), "Wrote category batch");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, Category};
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    fn article(v: Value) -> Article {
        v.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_write_batch_creates_dir_and_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let raw_dir = tmp.path().join("data").join("raw");
        let batch = CategoryBatch {
            category: Category::Science,
            collected_on: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            articles: vec![
                article(json!({"title": "A", "source": {"id": null, "name": "BBC"}})),
                article(json!({"title": "B", "undocumented": [1, 2]})),
            ],
        };

        let path = write_batch(&batch, &raw_dir).await.unwrap();
        assert_eq!(path, raw_dir.join("science_articles_2025-05-06.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {"));
        let back: Vec<Article> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, batch.articles);
    }

    #[tokio::test]
    async fn test_empty_batch_writes_empty_array() {
        let tmp = tempfile::tempdir().unwrap();
        let batch = CategoryBatch {
            category: Category::Sports,
            collected_on: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            articles: vec![],
        };
        let path = write_batch(&batch, tmp.path()).await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }
}
