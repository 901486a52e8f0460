//! CSV output for flattened tables.
//!
//! Cells are rendered as:
//! - null: empty field
//! - string: verbatim
//! - number / bool: JSON text (`42`, `true`)
//! - array / object: compact JSON
//!
//! The writer is dropped (and the file closed) on every exit path.

use crate::error::Result;
use crate::normalizer::FlatTable;
use serde_json::Value;
use std::path::Path;
use tracing::instrument;

/// Render a single cell for CSV output.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Write `table` to `path` with a header row, overwriting any existing file.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), rows = table.len()))]
pub fn write_table(table: &FlatTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let columns: Vec<&str> = table.columns().collect();
    writer.write_record(&columns)?;

    for i in 0..table.len() {
        writer.write_record(columns.iter().map(|c| render_cell(table.cell(i, c))))?;
    }
    writer.flush()?;
    Ok(())
}
