//! Shared helpers for reading headed CSV files.

use std::fs::File;
use std::path::Path;

use crate::error::{Error, Result};

/// Open a CSV file with a header row, mapping a missing file to `NotFound`.
pub fn open_csv(path: &Path) -> Result<csv::Reader<File>> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| Error::malformed(path, e))
}

/// Header row of an opened reader as owned strings.
pub fn headers(reader: &mut csv::Reader<File>, path: &Path) -> Result<Vec<String>> {
    let headers = reader.headers().map_err(|e| Error::malformed(path, e))?;
    Ok(headers.iter().map(str::to_string).collect())
}

/// Position of `column` in `headers`, or a `Schema` error naming it.
pub fn column_index(headers: &[String], column: &str, path: &Path) -> Result<usize> {
    headers.iter().position(|h| h == column).ok_or_else(|| Error::schema(path, column))
}

/// A cell value with surrounding whitespace removed, `None` when blank.
pub fn cell(record: &csv::StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|v| !v.is_empty())
}
