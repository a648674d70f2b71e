//! File ingestion tests against real files on disk

use royalbit_salesboard::core::pipeline;
use royalbit_salesboard::excel::ExcelExporter;
use royalbit_salesboard::ingest;
use royalbit_salesboard::{CellValue, FilterSelection, Role, SalesboardError, Table};
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_semicolon_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "sales.csv", b"Region;Sales\nEast;10\nWest;20\n");

    let table = ingest::load_path(&path).unwrap();
    assert_eq!(table.headers(), ["Region", "Sales"]);
    assert_eq!(table.row_count(), 2);
}

#[test]
fn test_tab_separated_txt() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "export.TXT", b"Region\tCity\tSales\nEast\tBoston\t10\n");

    let table = ingest::load_path(&path).unwrap();
    assert_eq!(table.column_count(), 3);
    assert_eq!(table.cell(0, "City"), Some(&CellValue::Text("Boston".to_string())));
}

#[test]
fn test_latin1_bytes_decode() {
    let dir = TempDir::new().unwrap();
    // "Café" in ISO-8859-1
    let path = write(&dir, "sales.csv", b"City,Sales\nCaf\xe9,5\n");

    let table = ingest::load_path(&path).unwrap();
    assert_eq!(table.cell(0, "City"), Some(&CellValue::Text("Café".to_string())));
}

#[test]
fn test_single_column_file_is_decode_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "sales.csv", b"Sales\n1\n2\n");

    let err = ingest::load_path(&path).unwrap_err();
    assert!(matches!(err, SalesboardError::Decode(ref m) if m == "undetected delimiter"));
}

#[test]
fn test_garbage_spreadsheet_is_decode_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "sales.xlsx", b"definitely not a workbook");

    assert!(ingest::load_path(&path).unwrap_err().is_decode());
}

#[test]
fn test_workbook_keeps_native_types() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sales.xlsx");

    let table = Table::from_rows(
        vec!["Order Date".to_string(), "Region".to_string(), "Sales".to_string()],
        vec![
            vec![
                CellValue::Date(chrono::NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()),
                CellValue::from_text("East"),
                CellValue::Number(120.0),
            ],
            vec![
                CellValue::Date(chrono::NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()),
                CellValue::from_text("West"),
                CellValue::Number(80.0),
            ],
        ],
    );
    ExcelExporter::new(table).export(&path).unwrap();

    let dashboard = pipeline::run_path(&path, &FilterSelection::default()).unwrap();
    assert_eq!(dashboard.binding.get(Role::Date), Some("Order Date"));
    assert_eq!(dashboard.aggregates.kpis.total_sales, 200.0);
    assert_eq!(dashboard.filtered.row_count(), 2);
}
