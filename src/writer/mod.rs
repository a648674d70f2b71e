use crate::error::{SalesboardError, SalesboardResult};
use crate::excel::ExcelExporter;
use crate::types::Table;
use std::fs;
use std::path::Path;
use tracing::info;

/// Download name offered for the filtered table
pub const FILTERED_DATA_FILENAME: &str = "Filtered_Data.csv";

/// Serialize a table as comma-separated UTF-8 text (header row first)
pub fn csv_bytes(table: &Table) -> SalesboardResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(table.headers())
        .map_err(|e| SalesboardError::Export(e.to_string()))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(|e| SalesboardError::Export(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| SalesboardError::Export(e.to_string()))
}

/// Write a table as CSV
pub fn write_csv(table: &Table, path: &Path) -> SalesboardResult<()> {
    fs::write(path, csv_bytes(table)?)?;
    Ok(())
}

/// Write a table to `path`, choosing the format from the extension.
///
/// `.xlsx` goes through the workbook exporter; everything else is CSV.
pub fn export_table(table: &Table, path: &Path) -> SalesboardResult<()> {
    let is_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));

    if is_xlsx {
        ExcelExporter::new(table.clone()).export(path)?;
    } else {
        write_csv(table, path)?;
    }

    info!(
        path = %path.display(),
        rows = table.row_count(),
        format = if is_xlsx { "xlsx" } else { "csv" },
        "table exported"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn table() -> Table {
        Table::from_rows(
            vec!["Date".to_string(), "City".to_string(), "Sales".to_string()],
            vec![
                vec![
                    CellValue::Date(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap()),
                    CellValue::from_text("Portland, OR"),
                    CellValue::Number(1234.5),
                ],
                vec![CellValue::Empty, CellValue::from_text("Boston"), CellValue::Number(0.0)],
            ],
        )
    }

    #[test]
    fn test_csv_bytes() {
        let text = String::from_utf8(csv_bytes(&table()).unwrap()).unwrap();
        assert_eq!(
            text,
            "Date,City,Sales\n2023-01-05,\"Portland, OR\",1234.5\n,Boston,0\n"
        );
    }

    #[test]
    fn test_csv_bytes_header_only() {
        let empty = Table::new(vec!["A".to_string(), "B".to_string()]);
        assert_eq!(csv_bytes(&empty).unwrap(), b"A,B\n");
    }

    #[test]
    fn test_export_table_by_extension() {
        let dir = TempDir::new().unwrap();

        let csv_path = dir.path().join(FILTERED_DATA_FILENAME);
        export_table(&table(), &csv_path).unwrap();
        assert!(fs::read_to_string(&csv_path).unwrap().starts_with("Date,City,Sales"));

        let xlsx_path = dir.path().join("filtered.XLSX");
        export_table(&table(), &xlsx_path).unwrap();
        // xlsx files are zip archives
        assert_eq!(&fs::read(&xlsx_path).unwrap()[..2], b"PK");
    }
}
