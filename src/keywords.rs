//! Keyword table loading.

use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// Header of the column holding search keywords.
pub const KEYWORD_COLUMN: &str = "Keyword";

/// Loads keywords from a CSV file with a `Keyword` header column.
///
/// Values are trimmed; blank cells are kept so the collector can report them
/// as skipped.
pub fn load(path: &Path) -> Result<Vec<String>> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|err| Error::Keywords(format!("failed to open {}: {err}", path.display())))?;
    read_keywords(reader)
}

/// Reads keywords from any CSV source with a `Keyword` header column.
pub fn from_reader<R: Read>(source: R) -> Result<Vec<String>> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    read_keywords(reader)
}

fn read_keywords<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<String>> {
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|header| header.trim() == KEYWORD_COLUMN)
        .ok_or_else(|| Error::Keywords(format!("missing column '{KEYWORD_COLUMN}'")))?;

    let mut keywords = Vec::new();
    for record in reader.records() {
        let record = record?;
        keywords.push(record.get(column).unwrap_or_default().trim().to_string());
    }
    Ok(keywords)
}
