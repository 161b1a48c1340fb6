//! Spreadsheet import and export
//!
//! - Import: first worksheet → [`ImportBatch`](crate::types::ImportBatch)
//!   with per-field cleanup and date validation
//! - Export: selected columns → .xlsx (or the PDF report) via [`ExportRequest`]
//! - Template: blank import workbook with a sample row and instructions

mod exporter;
mod importer;
mod session;
pub mod template;

pub use exporter::{ExcelExporter, DEFAULT_SHEET_NAME};
pub use importer::{process_records, process_row, process_sheet, ExcelImporter, RawRow, RawSheet};
pub use session::{submit_batch, ImportSession};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::core::dates::today_canonical;
use crate::core::fields::DETAIL_COLUMNS;
use crate::core::records::default_file_name;
use crate::error::{RegistryError, RegistryResult};
use crate::pdf::PdfReport;
use crate::types::WorkerRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Format implied by an output path's extension, if recognised.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(RegistryError::Validation(format!(
                "Unknown export format '{}', use xlsx or pdf",
                other
            ))),
        }
    }
}

/// What to export: the column selection, the report title and the format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
    pub title: String,
    #[serde(default)]
    pub format: ExportFormat,
    /// Worksheet name for xlsx output; ignored for PDF.
    #[serde(default)]
    pub sheet_name: Option<String>,
}

fn default_columns() -> Vec<String> {
    DETAIL_COLUMNS.iter().map(|c| c.to_string()).collect()
}

impl ExportRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            columns: default_columns(),
            title: title.into(),
            format: ExportFormat::default(),
            sheet_name: None,
        }
    }

    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    fn excel(&self) -> RegistryResult<ExcelExporter> {
        let exporter = ExcelExporter::new(self.columns.clone(), &self.title)?;
        Ok(match &self.sheet_name {
            Some(name) => exporter.with_sheet_name(name),
            None => exporter,
        })
    }

    /// Suggested download name, stamped with today's date.
    pub fn file_name(&self) -> String {
        default_file_name(None, self.format.extension(), &today_canonical())
    }

    pub fn to_bytes(&self, records: &[WorkerRecord]) -> RegistryResult<Vec<u8>> {
        match self.format {
            ExportFormat::Xlsx => self.excel()?.to_bytes(records),
            ExportFormat::Pdf => PdfReport::new(self.columns.clone(), &self.title)?.to_bytes(records),
        }
    }

    pub fn write(&self, records: &[WorkerRecord], output_path: &Path) -> RegistryResult<()> {
        match self.format {
            ExportFormat::Xlsx => self.excel()?.export(records, output_path),
            ExportFormat::Pdf => {
                PdfReport::new(self.columns.clone(), &self.title)?.export(records, output_path)
            }
        }
    }
}
