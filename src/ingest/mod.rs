//! File ingestion: uploaded bytes + filename → Table
//!
//! Delimited text (`*.csv`, `*.txt`) is sniffed for its delimiter; anything
//! else is handed to the spreadsheet importer.

pub mod delimited;

use crate::error::SalesboardResult;
use crate::excel::ExcelImporter;
use crate::types::Table;
use std::fs;
use std::path::Path;
use tracing::info;

/// Whether a filename should be decoded as delimited text
pub fn is_delimited(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.ends_with("csv") || lower.ends_with("txt")
}

/// Decode an uploaded file into a table
pub fn load_bytes(bytes: &[u8], filename: &str) -> SalesboardResult<Table> {
    let table = if is_delimited(filename) {
        delimited::decode(bytes)?
    } else {
        ExcelImporter::new(bytes).import()?
    };

    info!(
        file = filename,
        columns = table.column_count(),
        rows = table.row_count(),
        "file loaded"
    );
    Ok(table)
}

/// Read a file from disk and decode it
pub fn load_path(path: &Path) -> SalesboardResult<Table> {
    let bytes = fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    load_bytes(&bytes, &filename)
}
