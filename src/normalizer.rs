//! Flattening of category batches into a canonical tabular schema.
//!
//! # Pipeline
//!
//! 1. Resolve a glob to a sorted list of batch files
//! 2. Load each file (bare array, or an object wrapping an `articles` array)
//! 3. Flatten nested records with dot-joined keys (`source.name`, ...)
//! 4. Rename `source.id`/`source.name` to `source_id`/`source_name`
//! 5. Put the canonical columns first, extras after in first-seen order
//! 6. Tag every row with the category taken from the file name
//! 7. Write one CSV per file, then one combined CSV over the union of columns
//!
//! A missing field is a null cell, never a missing column. Malformed JSON in
//! any input aborts the whole run.

use crate::error::{HarvestError, Result};
use crate::models::Article;
use crate::outputs::csv::write_table;
use crate::utils::category_from_path;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Columns every flattened row exposes, in output order.
pub const CANONICAL_COLUMNS: [&str; 10] = [
    "category",
    "source_name",
    "source_id",
    "author",
    "title",
    "description",
    "url",
    "urlToImage",
    "publishedAt",
    "content",
];

pub const DEFAULT_GLOB: &str = "*_articles_*.json";
pub const DEFAULT_COMBINED: &str = "all_articles.csv";

const RENAMES: [(&str, &str); 2] = [("source.id", "source_id"), ("source.name", "source_name")];

/// One flattened article: column name to scalar (or array) value.
pub type Row = IndexMap<String, Value>;

static NULL: Value = Value::Null;

/// A table of flattened rows sharing one ordered column set.
///
/// Rows may omit columns; a missing cell reads as null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    columns: IndexSet<String>,
    rows: Vec<Row>,
}

impl FlatTable {
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row`/`column`; null when the row lacks the column.
    pub fn cell(&self, row: usize, column: &str) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// Stack tables vertically. Columns are the union in first-seen order.
    pub fn concat<'a>(tables: impl IntoIterator<Item = &'a FlatTable>) -> FlatTable {
        let mut out = FlatTable::default();
        for table in tables {
            out.columns.extend(table.columns.iter().cloned());
            out.rows.extend(table.rows.iter().cloned());
        }
        out
    }
}

/// Flatten one record, joining nested object keys with `.`.
///
/// Empty nested objects contribute nothing; arrays stay whole in one cell.
pub fn flatten_record(article: &Article) -> Row {
    let mut row = Row::new();
    for (key, value) in article {
        flatten_into(key, value, &mut row);
    }
    row
}

fn flatten_into(path: &str, value: &Value, row: &mut Row) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(&format!("{path}.{key}"), nested, row);
            }
        }
        other => {
            row.insert(path.to_string(), other.clone());
        }
    }
}

/// Project a batch onto the canonical schema and tag it with `category`.
///
/// An empty batch still yields the full canonical column set with zero rows.
pub fn normalize(articles: &[Article], category: &str) -> FlatTable {
    let mut rows: Vec<Row> = Vec::with_capacity(articles.len());
    let mut seen: IndexSet<String> = IndexSet::new();

    for article in articles {
        let mut row = Row::with_capacity(article.len() + 1);
        row.insert("category".to_string(), Value::String(category.to_string()));
        for (key, value) in flatten_record(article) {
            let renamed = RENAMES
                .iter()
                .find(|(from, _)| *from == key)
                .map(|(_, to)| to.to_string());
            let from_nested = renamed.is_some();
            let key = renamed.unwrap_or(key);
            if key == "category" {
                // The file name is authoritative for the category label.
                continue;
            }
            // A top-level field wins over a nested one renamed onto the same column.
            if row.contains_key(&key) {
                warn!(column = %key, %category, "Nested source field collides with top-level field; keeping top-level value");
                if from_nested {
                    continue;
                }
            }
            seen.insert(key.clone());
            row.insert(key, value);
        }
        rows.push(row);
    }

    let mut columns: IndexSet<String> = CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(seen);

    FlatTable { columns, rows }
}

/// Load the articles stored in a batch file.
///
/// Accepts a bare JSON array or an object with an `articles` array. Any other
/// shape yields no articles. Non-object entries are skipped.
///
/// # Errors
///
/// [`HarvestError::MalformedBatch`] when the file is not valid JSON, and
/// [`HarvestError::Io`] when it cannot be read.
pub fn load_articles(path: &Path) -> Result<Vec<Article>> {
    let text = fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&text).map_err(|source| HarvestError::MalformedBatch {
        path: path.to_path_buf(),
        source,
    })?;

    let items = match data {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("articles") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!(path = %path.display(), "Object without an articles array; treating as empty");
                Vec::new()
            }
        },
        _ => {
            warn!(path = %path.display(), "Unexpected JSON shape; treating as empty");
            Vec::new()
        }
    };

    let total = items.len();
    let articles: Vec<Article> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    if articles.len() < total {
        warn!(
            path = %path.display(),
            skipped = total - articles.len(),
            "Skipped non-object entries"
        );
    }
    Ok(articles)
}

/// Result of one normalization run.
#[derive(Debug, Default)]
pub struct NormalizeSummary {
    /// Each per-file CSV and its row count, in processing order.
    pub files: Vec<(PathBuf, usize)>,
    /// Combined CSV path, absent when no input matched.
    pub combined: Option<PathBuf>,
    pub combined_rows: usize,
}

/// Resolve `pattern` to input files in lexicographic order.
pub fn resolve_inputs(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable glob entry");
                None
            }
        })
        .filter(|p| p.is_file())
        .sorted()
        .collect();
    Ok(paths)
}

/// Normalize every batch file matching `pattern` into `out_dir`.
///
/// Writes `<stem>.csv` per input and `combined_name` over all of them. With no
/// matching input nothing but the output directory is created.
#[instrument(level = "info", skip_all, fields(%pattern, out_dir = %out_dir.display()))]
pub fn process(pattern: &str, out_dir: &Path, combined_name: &str) -> Result<NormalizeSummary> {
    let inputs = resolve_inputs(pattern)?;
    info!(count = inputs.len(), "Resolved input files");
    fs::create_dir_all(out_dir)?;

    let mut summary = NormalizeSummary::default();
    let mut tables: Vec<FlatTable> = Vec::with_capacity(inputs.len());

    for input in &inputs {
        let articles = load_articles(input)?;
        let category = category_from_path(input);
        let table = normalize(&articles, &category);
        debug!(path = %input.display(), columns = table.columns.len(), "Normalized batch");
        if table.is_empty() {
            warn!(path = %input.display(), "Batch has no articles; writing header only");
        }

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| category.clone());
        let out_path = out_dir.join(format!("{stem}.csv"));
        write_table(&table, &out_path)?;
        info!(path = %out_path.display(), rows = table.len(), %category, "Wrote CSV");

        summary.files.push((out_path, table.len()));
        tables.push(table);
    }

    if tables.is_empty() {
        info!("No input files matched; skipping combined CSV");
        return Ok(summary);
    }

    let combined = FlatTable::concat(&tables);
    let combined_path = out_dir.join(combined_name);
    write_table(&combined, &combined_path)?;
    info!(path = %combined_path.display(), rows = combined.len(), "Wrote combined CSV");

    summary.combined_rows = combined.len();
    summary.combined = Some(combined_path);
    Ok(summary)
}
