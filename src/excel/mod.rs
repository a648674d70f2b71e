//! Spreadsheet import/export
//!
//! - Import: first worksheet of an uploaded workbook → Table
//! - Export: filtered Table → Excel (.xlsx)

mod exporter;
mod importer;

pub use exporter::ExcelExporter;
pub use importer::ExcelImporter;
