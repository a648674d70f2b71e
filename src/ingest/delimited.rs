//! Delimited text decoding with delimiter sniffing

use crate::error::{SalesboardError, SalesboardResult};
use crate::types::{CellValue, Table};
use encoding_rs::WINDOWS_1252;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Delimiters tried in order; the first one producing more than one column wins
pub const DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Decode delimited text into a table.
///
/// Bytes are read as ISO-8859-1 (a UTF-8 byte-order mark switches to UTF-8).
/// Fails with `Decode("undetected delimiter")` when no candidate delimiter
/// yields a multi-column table.
pub fn decode(bytes: &[u8]) -> SalesboardResult<Table> {
    let (text, encoding, _) = WINDOWS_1252.decode(bytes);
    debug!(encoding = encoding.name(), bytes = bytes.len(), "decoded text");

    for delimiter in DELIMITERS {
        match parse_with_delimiter(&text, delimiter) {
            Ok(table) if table.column_count() > 1 => {
                debug!(
                    delimiter = %(delimiter as char).escape_default(),
                    columns = table.column_count(),
                    rows = table.row_count(),
                    "delimiter accepted"
                );
                return Ok(table);
            }
            Ok(table) => {
                debug!(
                    delimiter = %(delimiter as char).escape_default(),
                    columns = table.column_count(),
                    "delimiter rejected: single column"
                );
            }
            Err(e) => {
                debug!(
                    delimiter = %(delimiter as char).escape_default(),
                    error = %e,
                    "delimiter rejected"
                );
            }
        }
    }

    Err(SalesboardError::Decode("undetected delimiter".to_string()))
}

/// Parse text with one delimiter. The first record is the header row.
pub fn parse_with_delimiter(text: &str, delimiter: u8) -> SalesboardResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header_record = match records.next() {
        Some(record) => record.map_err(|e| SalesboardError::Decode(e.to_string()))?,
        None => return Err(SalesboardError::Decode("No columns to parse from file".to_string())),
    };

    let headers = normalize_headers(&header_record);
    let width = headers.len();
    let mut table = Table::new(headers);

    for record in records {
        let record = record.map_err(|e| SalesboardError::Decode(e.to_string()))?;
        // Whitespace-only lines are blank lines
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() > width {
            let line = record.position().map_or(0, |p| p.line());
            return Err(SalesboardError::Decode(format!(
                "Expected {} fields in line {}, saw {}",
                width,
                line,
                record.len()
            )));
        }
        table.push_row(record.iter().map(CellValue::from_text).collect());
    }

    Ok(table)
}

/// Name blank headers `Unnamed: {i}` and suffix repeated names with `.1`, `.2`, ...
pub(crate) fn normalize_headers<'a, I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        if used.contains(&candidate) {
            let count = counts.entry(base.clone()).or_insert(0);
            loop {
                *count += 1;
                candidate = format!("{}.{}", base, count);
                if !used.contains(&candidate) {
                    break;
                }
            }
        }
        used.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}
