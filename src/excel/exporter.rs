//! Excel exporter implementation - filtered Table → .xlsx

use crate::error::{SalesboardError, SalesboardResult};
use crate::types::{CellValue, Table};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::path::Path;

/// Name of the single worksheet in an exported workbook
pub const SHEET_NAME: &str = "Filtered Data";

/// Excel exporter for a filtered table
pub struct ExcelExporter {
    table: Table,
}

impl ExcelExporter {
    /// Create a new Excel exporter
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// Export the table to an Excel .xlsx file
    pub fn export(&self, output_path: &Path) -> SalesboardResult<()> {
        let mut workbook = Workbook::new();
        self.write_sheet(&mut workbook)?;

        workbook
            .save(output_path)
            .map_err(|e| SalesboardError::Export(format!("Failed to save Excel file: {}", e)))?;

        Ok(())
    }

    fn write_sheet(&self, workbook: &mut Workbook) -> SalesboardResult<()> {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(SHEET_NAME)
            .map_err(|e| SalesboardError::Export(format!("Failed to set worksheet name: {}", e)))?;

        let header_format = Format::new().set_bold();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        for (col_idx, name) in self.table.headers().iter().enumerate() {
            worksheet
                .write_string_with_format(0, col_idx as u16, name, &header_format)
                .map_err(|e| SalesboardError::Export(format!("Failed to write header: {}", e)))?;
        }

        for (row_idx, row) in self.table.rows().iter().enumerate() {
            let excel_row = (row_idx + 1) as u32; // +1 for header row
            for (col_idx, cell) in row.iter().enumerate() {
                Self::write_cell(worksheet, excel_row, col_idx as u16, cell, &date_format)?;
            }
        }

        Ok(())
    }

    /// Write a single cell value based on its type
    fn write_cell(
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        cell: &CellValue,
        date_format: &Format,
    ) -> SalesboardResult<()> {
        let result = match cell {
            CellValue::Empty => return Ok(()),
            CellValue::Number(n) => worksheet.write_number(row, col, *n).map(|_| ()),
            CellValue::Text(s) => worksheet.write_string(row, col, s).map(|_| ()),
            CellValue::Bool(b) => worksheet.write_boolean(row, col, *b).map(|_| ()),
            CellValue::Date(d) => {
                use chrono::Datelike;
                let date = ExcelDateTime::from_ymd(d.year() as u16, d.month() as u8, d.day() as u8)
                    .map_err(|e| SalesboardError::Export(format!("Invalid date {}: {}", d, e)))?;
                worksheet
                    .write_datetime_with_format(row, col, &date, date_format)
                    .map(|_| ())
            }
        };
        result.map_err(|e| SalesboardError::Export(format!("Failed to write cell: {}", e)))
    }
}
