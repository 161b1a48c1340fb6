//! Excel importer implementation - uploaded workbook → ImportBatch
//!
//! Only the first sheet is read. Its first row names the fields; every later
//! non-blank row becomes one [`WorkerRecord`]. Cells surface as raw strings
//! and numbers (date cells as serial numbers) so the day-first rules in
//! [`crate::core::dates`] decide what a date means, not the workbook's
//! number format.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::core::dates::is_valid_date;
use crate::core::fields::FieldKind;
use crate::error::{RegistryError, RegistryResult};
use crate::types::{CellValue, ImportBatch, ValidationError, WorkerRecord};

/// A decoded data row and its 1-based sheet row number.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row_number: usize,
    pub cells: WorkerRecord,
}

/// First sheet of a workbook before any cleanup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Spreadsheet importer over a fully buffered upload
pub struct ExcelImporter {
    bytes: Vec<u8>,
}

impl ExcelImporter {
    /// Create an importer over bytes already in memory
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Read the whole file, then release it
    pub async fn read<P: AsRef<Path>>(path: P) -> RegistryResult<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        debug!(path = %path.as_ref().display(), size = bytes.len(), "spreadsheet buffered");
        Ok(Self::new(bytes))
    }

    /// Decode and process the upload into a batch with its date errors.
    ///
    /// A file that is not a readable workbook fails as a whole; no rows are
    /// returned in that case.
    pub fn import(&self) -> RegistryResult<ImportBatch> {
        let sheet = self.decode()?;
        let batch = process_sheet(sheet);

        if batch.errors.is_empty() {
            info!(rows = batch.rows.len(), "spreadsheet loaded");
        } else {
            warn!(
                rows = batch.rows.len(),
                errors = batch.errors.len(),
                "spreadsheet loaded with invalid dates"
            );
        }
        Ok(batch)
    }

    /// Decode the first worksheet into header-keyed rows
    pub fn decode(&self) -> RegistryResult<RawSheet> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(self.bytes.as_slice()))
            .map_err(|e| RegistryError::Decode(format!("Not a readable workbook: {}", e)))?;

        let first = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| RegistryError::Decode("Workbook has no sheets".to_string()))?;

        let range = workbook
            .worksheet_range(&first)
            .map_err(|e| RegistryError::Decode(format!("Cannot read sheet '{}': {}", first, e)))?;

        self.decode_range(&range)
    }

    fn decode_range(&self, range: &Range<Data>) -> RegistryResult<RawSheet> {
        if range.is_empty() {
            return Err(RegistryError::Decode(
                "First sheet is empty, expected a header row".to_string(),
            ));
        }

        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let mut rows = range.rows();

        let header_cells = rows
            .next()
            .ok_or_else(|| RegistryError::Decode("Missing header row".to_string()))?;
        let headers = self.read_headers(header_cells);
        if headers.iter().all(Option::is_none) {
            return Err(RegistryError::Decode("Header row is blank".to_string()));
        }

        let mut sheet = RawSheet {
            headers: headers.iter().flatten().cloned().collect(),
            rows: Vec::new(),
        };

        for (offset, cells) in rows.enumerate() {
            // Header sits on `first_row + 1` (1-based); data starts one below.
            let row_number = first_row + offset + 2;
            let mut record = WorkerRecord::new();

            for (col, cell) in cells.iter().enumerate() {
                let Some(Some(key)) = headers.get(col) else {
                    continue;
                };
                if let Some(value) = cell_value(cell) {
                    record.set(key.clone(), value);
                }
            }

            if record.is_empty() {
                continue;
            }
            sheet.rows.push(RawRow {
                row_number,
                cells: record,
            });
        }

        debug!(
            headers = sheet.headers.len(),
            rows = sheet.rows.len(),
            "first sheet decoded"
        );
        Ok(sheet)
    }

    /// Header names by column; blank headers drop their column and repeated
    /// names get a numeric suffix.
    fn read_headers(&self, cells: &[Data]) -> Vec<Option<String>> {
        let mut seen: HashSet<String> = HashSet::new();
        cells
            .iter()
            .map(|cell| {
                let name = match cell {
                    Data::Empty => return None,
                    other => other.to_string().trim().to_string(),
                };
                if name.is_empty() {
                    return None;
                }

                let mut unique = name.clone();
                let mut n = 1;
                while !seen.insert(unique.clone()) {
                    unique = format!("{}_{}", name, n);
                    n += 1;
                }
                Some(unique)
            })
            .collect()
    }
}

/// Raw cell → value; `None` for empty cells so they stay absent.
fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::text(if *b { "TRUE" } else { "FALSE" })),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(e) => Some(CellValue::Text(format!("#{:?}", e))),
    }
}

/// Run the per-row cleanup over a decoded sheet.
pub fn process_sheet(sheet: RawSheet) -> ImportBatch {
    let mut errors = Vec::new();
    let rows = sheet
        .rows
        .iter()
        .map(|row| process_row(&sheet.headers, row, &mut errors))
        .collect();

    ImportBatch {
        headers: sheet.headers,
        rows,
        errors,
    }
}

/// Re-run the pipeline on rows that arrive already decoded (e.g. a preview
/// sent back for submission). Rows are numbered as if the first one sat
/// under a header on row 1.
pub fn process_records(records: Vec<WorkerRecord>) -> ImportBatch {
    let mut headers: Vec<String> = Vec::new();
    for record in &records {
        for (key, _) in record.iter() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .into_iter()
        .enumerate()
        .map(|(idx, cells)| RawRow {
            row_number: idx + 2,
            cells,
        })
        .collect();

    process_sheet(RawSheet { headers, rows })
}

/// Clean one row in column order. Invalid dates are reported but the
/// normalized value is kept so the preview still shows the row.
pub fn process_row(
    headers: &[String],
    row: &RawRow,
    errors: &mut Vec<ValidationError>,
) -> WorkerRecord {
    let mut processed = row.cells.clone();

    for key in headers {
        let raw = row.cells.get(key);
        if raw.is_blank() {
            continue;
        }

        let kind = FieldKind::of(key);
        let cleaned = kind.clean(raw);

        if kind == FieldKind::Date && !is_valid_date(&cleaned.to_string()) {
            errors.push(date_error(row.row_number, key, raw));
        }

        processed.set(key.clone(), cleaned);
    }

    processed
}

fn date_error(row: usize, field: &str, raw: &CellValue) -> ValidationError {
    let value = raw.to_string();
    ValidationError {
        row,
        field: field.to_string(),
        message: format!(
            "Row {}: invalid {} date format ({}). Use dd/mm/yyyy",
            row, field, value
        ),
        value,
    }
}
