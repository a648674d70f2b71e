//! Spreadsheet importer implementation - workbook bytes → Table (first sheet)

use crate::error::{SalesboardError, SalesboardResult};
use crate::ingest::delimited::normalize_headers;
use crate::types::{CellValue, Table};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::io::Cursor;
use tracing::debug;

/// Spreadsheet importer for uploaded workbooks (xlsx, xlsm, xlsb, xls, ods)
pub struct ExcelImporter {
    bytes: Vec<u8>,
}

impl ExcelImporter {
    /// Create a new importer over an in-memory workbook
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Import the first worksheet; its first row holds the headers
    pub fn import(&self) -> SalesboardResult<Table> {
        let cursor = Cursor::new(self.bytes.clone());
        let mut workbook = open_workbook_auto_from_rs(cursor).map_err(|e| {
            SalesboardError::Decode(format!("Failed to open spreadsheet: {}", e))
        })?;

        let sheet_names = workbook.sheet_names();
        let first = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| SalesboardError::Decode("Workbook has no sheets".to_string()))?;

        let range = workbook.worksheet_range(&first).map_err(|e| {
            SalesboardError::Decode(format!("Failed to read sheet '{}': {}", first, e))
        })?;

        debug!(sheet = %first, sheets = sheet_names.len(), "reading first sheet");
        self.process_sheet(&first, &range)
    }

    /// Convert a worksheet range into a table
    fn process_sheet(&self, sheet_name: &str, range: &Range<Data>) -> SalesboardResult<Table> {
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| SalesboardError::Decode(format!("Sheet '{}' is empty", sheet_name)))?;

        let raw_headers: Vec<String> = header_row.iter().map(Self::header_name).collect();
        let headers = normalize_headers(raw_headers.iter().map(String::as_str));
        let mut table = Table::new(headers);

        for row in rows {
            let cells: Vec<CellValue> = row.iter().map(Self::convert_cell).collect();
            if cells.iter().all(CellValue::is_empty) {
                continue;
            }
            table.push_row(cells);
        }

        Ok(table)
    }

    /// Header text for a cell (blank headers are named later)
    fn header_name(cell: &Data) -> String {
        match cell {
            Data::String(s) => s.clone(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => f.to_string(),
            Data::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Convert a calamine cell to a typed cell value
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::from_text(s),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => serial_to_date(dt.as_f64())
                .map(CellValue::Date)
                .unwrap_or(CellValue::Empty),
            Data::DateTimeIso(s) => parse_iso_date(s)
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::from_text(s)),
            Data::DurationIso(s) => CellValue::from_text(s),
            _ => CellValue::Empty,
        }
    }
}

/// Convert an Excel serial date (1900 system) to a calendar date
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_to_date() {
        assert_eq!(
            serial_to_date(45292.0),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        // Time-of-day fraction is dropped
        assert_eq!(
            serial_to_date(45292.75),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(serial_to_date(-1.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_convert_cells() {
        assert_eq!(
            ExcelImporter::convert_cell(&Data::Int(3)),
            CellValue::Number(3.0)
        );
        assert_eq!(
            ExcelImporter::convert_cell(&Data::String("East".to_string())),
            CellValue::Text("East".to_string())
        );
        assert_eq!(
            ExcelImporter::convert_cell(&Data::String(String::new())),
            CellValue::Empty
        );
        assert_eq!(ExcelImporter::convert_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(
            ExcelImporter::convert_cell(&Data::DateTimeIso("2024-02-29T10:00:00".to_string())),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
    }

    #[test]
    fn test_header_names() {
        assert_eq!(
            ExcelImporter::header_name(&Data::String("Sales".to_string())),
            "Sales"
        );
        assert_eq!(ExcelImporter::header_name(&Data::Int(2024)), "2024");
        assert_eq!(ExcelImporter::header_name(&Data::Empty), "");
    }

    #[test]
    fn test_blank_rows_skipped() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Region").unwrap();
        sheet.write_string(0, 1, "Sales").unwrap();
        sheet.write_string(1, 0, "East").unwrap();
        sheet.write_number(1, 1, 1.0).unwrap();
        // Row 2 left blank except for an empty string
        sheet.write_string(2, 0, "").unwrap();
        sheet.write_string(3, 0, "West").unwrap();
        sheet.write_number(3, 1, 2.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = ExcelImporter::new(&bytes).import().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, "Region"), Some(&CellValue::Text("West".to_string())));
    }

    #[test]
    fn test_garbage_bytes_are_decode_error() {
        let err = ExcelImporter::new(b"definitely not a workbook")
            .import()
            .unwrap_err();
        assert!(err.is_decode());
    }
}
