//! Utility functions for dates, file naming, and file system checks.

use chrono::{Local, NaiveDate};
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Today's local calendar date, used to stamp batch files.
///
/// This is wall-clock time at write time, not the query window, so runs on
/// different days produce differently named files for the same window.
pub fn collection_date() -> NaiveDate {
    Local::now().date_naive()
}

/// Category label encoded in a batch file name: the text before the first `_`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(category_from_path(Path::new("raw/business_articles_2024-01-01.json")), "business");
/// ```
pub fn category_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('_') {
        Some((label, _)) => label.to_string(),
        None => name,
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_path() {
        assert_eq!(
            category_from_path(Path::new("data/raw/business_articles_2024-01-01.json")),
            "business"
        );
        assert_eq!(category_from_path(Path::new("health_x.json")), "health");
        assert_eq!(category_from_path(Path::new("plain.json")), "plain.json");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }
}
