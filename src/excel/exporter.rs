//! Excel exporter implementation
//!
//! Writes the selected columns of a record set to a single worksheet. `TTL`
//! cells are written as strings with the text number format (`@`) so a
//! spreadsheet tool never re-reads `dd/mm/yyyy` as a locale date.

use rust_xlsxwriter::{DocProperties, Format, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

use crate::core::fields::{check_selection, render_row, sheet_width, ExportCell};
use crate::error::{RegistryError, RegistryResult};
use crate::types::WorkerRecord;

pub const DEFAULT_SHEET_NAME: &str = "DataPekerja";

/// Excel exporter for a fixed, ordered column selection
#[derive(Debug, Clone)]
pub struct ExcelExporter {
    columns: Vec<String>,
    title: String,
    sheet_name: String,
}

impl ExcelExporter {
    /// Create an exporter; the selection must be non-empty and free of
    /// repeats. Unselected fields never appear in the output.
    pub fn new(columns: Vec<String>, title: impl Into<String>) -> RegistryResult<Self> {
        check_selection(&columns)?;
        Ok(Self {
            columns,
            title: title.into(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        })
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Build the workbook and return the .xlsx bytes
    pub fn to_bytes(&self, records: &[WorkerRecord]) -> RegistryResult<Vec<u8>> {
        let mut workbook = self.build_workbook(records)?;
        workbook
            .save_to_buffer()
            .map_err(|e| RegistryError::Export(format!("Failed to encode Excel file: {}", e)))
    }

    /// Export the records to an .xlsx file
    pub fn export(&self, records: &[WorkerRecord], output_path: &Path) -> RegistryResult<()> {
        let mut workbook = self.build_workbook(records)?;
        workbook
            .save(output_path)
            .map_err(|e| RegistryError::Export(format!("Failed to save Excel file: {}", e)))?;

        info!(
            path = %output_path.display(),
            rows = records.len(),
            columns = self.columns.len(),
            "spreadsheet exported"
        );
        Ok(())
    }

    fn build_workbook(&self, records: &[WorkerRecord]) -> RegistryResult<Workbook> {
        let mut workbook = Workbook::new();
        let properties = DocProperties::new().set_title(&self.title);
        workbook.set_properties(&properties);

        let text_format = Format::new().set_num_format("@");
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&self.sheet_name)
            .map_err(|e| RegistryError::Export(format!("Failed to set worksheet name: {}", e)))?;

        // Header row (row 0) holds the field keys
        for (col_idx, key) in self.columns.iter().enumerate() {
            let col = col_idx as u16;
            worksheet
                .write_string(0, col, key)
                .map_err(|e| RegistryError::Export(format!("Failed to write header: {}", e)))?;
            worksheet
                .set_column_width(col, sheet_width(key))
                .map_err(|e| RegistryError::Export(format!("Failed to set width: {}", e)))?;
        }

        for (row_idx, record) in records.iter().enumerate() {
            let row = (row_idx + 1) as u32;
            for (col_idx, cell) in render_row(record, &self.columns).iter().enumerate() {
                Self::write_cell(worksheet, row, col_idx as u16, cell, &text_format)?;
            }
        }

        Ok(workbook)
    }

    /// Write a single cell based on its rendered kind
    fn write_cell(
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        cell: &ExportCell,
        text_format: &Format,
    ) -> RegistryResult<()> {
        match cell {
            ExportCell::Blank => {}
            ExportCell::Text(value) => {
                worksheet
                    .write_string(row, col, value)
                    .map_err(|e| RegistryError::Export(format!("Failed to write text: {}", e)))?;
            }
            ExportCell::DateText(value) => {
                worksheet
                    .write_string_with_format(row, col, value, text_format)
                    .map_err(|e| RegistryError::Export(format!("Failed to write date: {}", e)))?;
            }
            ExportCell::Number(value) => {
                worksheet
                    .write_number(row, col, *value)
                    .map_err(|e| RegistryError::Export(format!("Failed to write number: {}", e)))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_selection_rejected() {
        let err = ExcelExporter::new(Vec::new(), "t").unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
    }

    #[test]
    fn test_duplicate_selection_rejected() {
        assert!(ExcelExporter::new(cols(&["NAMA", "TTL", "NAMA"]), "t").is_err());
    }

    #[test]
    fn test_columns_kept_in_order() {
        let exporter = ExcelExporter::new(cols(&["TTL", "NAMA"]), "t").unwrap();
        assert_eq!(exporter.columns(), &cols(&["TTL", "NAMA"])[..]);
    }

    #[test]
    fn test_to_bytes_produces_zip() {
        let exporter = ExcelExporter::new(cols(&["NAMA", "TTL"]), "Laporan").unwrap();
        let records = vec![WorkerRecord::new().with("NAMA", "Budi").with("TTL", "1990-08-15")];
        let bytes = exporter.to_bytes(&records).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }
}
