//! Field catalog and per-field formatting
//!
//! Import cleanup, spreadsheet export and the PDF report all look fields up
//! here, so the rule for each column is written once.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::core::dates::normalize_date;
use crate::error::{RegistryError, RegistryResult};
use crate::types::{CellValue, WorkerRecord};

pub const NAMA: &str = "NAMA";
pub const NIK: &str = "NIK";
pub const TTL: &str = "TTL";
pub const RT_RW: &str = "RT_RW";
pub const TINGGI_BADAN: &str = "TINGGI_BADAN";
pub const BERAT_BADAN: &str = "BERAT_BADAN";

/// Static description of a known column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    /// Spreadsheet column width in characters.
    pub sheet_width: f64,
    /// PDF report column width in millimetres.
    pub pdf_width_mm: f32,
}

const fn field(key: &'static str, label: &'static str, sheet_width: f64, pdf_width_mm: f32) -> FieldSpec {
    FieldSpec {
        key,
        label,
        sheet_width,
        pdf_width_mm,
    }
}

/// Every field the registry knows, in import template order.
pub const FIELDS: &[FieldSpec] = &[
    field("NAMA", "Nama", 25.0, 25.0),
    field("NIK", "NIK", 18.0, 20.0),
    field("TEMPAT_LAHIR", "Tempat Lahir", 15.0, 18.0),
    field("TTL", "Tanggal Lahir", 12.0, 15.0),
    field("SEKOLAH", "Sekolah", 25.0, 20.0),
    field("KTP", "KTP", 15.0, 8.0),
    field("KK", "KK", 15.0, 8.0),
    field("IJAZAH", "Ijazah", 15.0, 8.0),
    field("AKTA_KELAHIRAN", "Akta Lahir", 15.0, 12.0),
    field("BSTFII", "BSTF II", 15.0, 10.0),
    field("ALAMAT", "Alamat", 35.0, 30.0),
    field("PROVINSI", "Provinsi", 15.0, 15.0),
    field("KOTA", "Kota", 15.0, 15.0),
    field("KECAMATAN", "Kecamatan", 15.0, 15.0),
    field("KELURAHAN", "Kelurahan", 15.0, 15.0),
    field("RT_RW", "RT/RW", 15.0, 12.0),
    field("WARNA_RAMBUT", "Warna Rambut", 15.0, 12.0),
    field("WARNA_MATA", "Warna Mata", 15.0, 12.0),
    field("WARNA_KULIT", "Warna Kulit", 15.0, 12.0),
    field("TINGGI_BADAN", "Tinggi Badan", 15.0, 12.0),
    field("BERAT_BADAN", "Berat Badan", 15.0, 12.0),
    field("GOLONGAN_DARAH", "Golongan Darah", 15.0, 10.0),
    field("NAMA_KAPAL", "Nama Kapal", 15.0, 15.0),
    field("NAMA_IBU", "Nama Ibu", 15.0, 20.0),
    field("AGAMA", "Agama", 15.0, 12.0),
    field("PENDIDIKAN_TERAKHIR", "Pendidikan Terakhir", 15.0, 15.0),
];

/// Columns of the basic worker list.
pub const BASE_COLUMNS: &[&str] = &["NAMA", "NIK", "TEMPAT_LAHIR", "TTL", "ALAMAT", "SEKOLAH"];

/// Columns of the detail list and its default export selection.
pub const DETAIL_COLUMNS: &[&str] = &[
    "NAMA",
    "NIK",
    "TEMPAT_LAHIR",
    "TTL",
    "AGAMA",
    "NAMA_IBU",
    "PENDIDIKAN_TERAKHIR",
    "SEKOLAH",
    "KTP",
    "KK",
    "IJAZAH",
    "AKTA_KELAHIRAN",
    "BSTFII",
    "ALAMAT",
    "PROVINSI",
    "KOTA",
    "KECAMATAN",
    "RT_RW",
    "WARNA_RAMBUT",
    "WARNA_MATA",
    "WARNA_KULIT",
    "TINGGI_BADAN",
    "BERAT_BADAN",
    "GOLONGAN_DARAH",
    "NAMA_KAPAL",
];

const DEFAULT_SHEET_WIDTH: f64 = 15.0;
const DEFAULT_PDF_WIDTH_MM: f32 = 15.0;

pub fn field_spec(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.key == key)
}

/// Keys of every catalogued field, in template order.
pub fn import_columns() -> Vec<&'static str> {
    FIELDS.iter().map(|f| f.key).collect()
}

/// Display label, falling back to the key itself for unknown fields.
pub fn label(key: &str) -> &str {
    field_spec(key).map(|f| f.label).unwrap_or(key)
}

pub fn sheet_width(key: &str) -> f64 {
    field_spec(key)
        .map(|f| f.sheet_width)
        .unwrap_or(DEFAULT_SHEET_WIDTH)
}

pub fn pdf_width_mm(key: &str) -> f32 {
    field_spec(key)
        .map(|f| f.pdf_width_mm)
        .unwrap_or(DEFAULT_PDF_WIDTH_MM)
}

/// An export selection must name at least one column and none twice.
pub fn check_selection(columns: &[String]) -> RegistryResult<()> {
    if columns.is_empty() {
        return Err(RegistryError::Validation(
            "Select at least one column to export".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for key in columns {
        if key.trim().is_empty() {
            return Err(RegistryError::Validation("Blank column name".to_string()));
        }
        if !seen.insert(key.as_str()) {
            return Err(RegistryError::Validation(format!(
                "Column '{}' selected more than once",
                key
            )));
        }
    }
    Ok(())
}

/// A formatted value ready for a spreadsheet or report cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Blank,
    Text(String),
    /// Canonical date that must be stored as text, never as a date cell.
    DateText(String),
    Number(f64),
}

impl ExportCell {
    pub fn is_blank(&self) -> bool {
        matches!(self, ExportCell::Blank)
    }
}

impl std::fmt::Display for ExportCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportCell::Blank => Ok(()),
            ExportCell::Text(s) | ExportCell::DateText(s) => f.write_str(s),
            ExportCell::Number(n) => write!(f, "{}", n),
        }
    }
}

/// How a column is cleaned on import and rendered on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `TTL`: day-first date.
    Date,
    /// Body measurement with a display unit.
    Measure { unit: &'static str },
    /// `NIK`: digits only.
    Nik,
    /// `RT_RW`: two groups joined by `/`.
    RtRw,
    Text,
}

impl FieldKind {
    pub fn of(key: &str) -> Self {
        match key {
            TTL => FieldKind::Date,
            TINGGI_BADAN => FieldKind::Measure { unit: "CM" },
            BERAT_BADAN => FieldKind::Measure { unit: "KG" },
            NIK => FieldKind::Nik,
            RT_RW => FieldKind::RtRw,
            _ => FieldKind::Text,
        }
    }

    /// Import-side cleanup. Blank cells pass through untouched; dates are
    /// normalized here but validated by the caller.
    pub fn clean(&self, value: &CellValue) -> CellValue {
        if value.is_blank() {
            return value.clone();
        }
        match self {
            FieldKind::Date => CellValue::Text(normalize_date(value)),
            FieldKind::Measure { .. } => parse_localized_number(value),
            FieldKind::Nik => CellValue::Text(digits_only(&value.to_string())),
            FieldKind::RtRw => split_rt_rw(value),
            FieldKind::Text => value.clone(),
        }
    }

    /// Export-side formatting shared by the spreadsheet and the PDF report.
    pub fn render(&self, value: &CellValue) -> ExportCell {
        if value.is_blank() {
            return ExportCell::Blank;
        }
        match self {
            FieldKind::Date => ExportCell::DateText(normalize_date(value)),
            FieldKind::Measure { unit } => ExportCell::Text(format!("{} {}", value, unit)),
            FieldKind::Nik | FieldKind::RtRw => ExportCell::Text(value.to_string()),
            FieldKind::Text => match value {
                CellValue::Number(n) => ExportCell::Number(*n),
                other => ExportCell::Text(other.to_string()),
            },
        }
    }
}

/// Format one record for export, one cell per selected column in order.
pub fn render_row(record: &WorkerRecord, columns: &[String]) -> Vec<ExportCell> {
    columns
        .iter()
        .map(|key| FieldKind::of(key).render(record.get(key)))
        .collect()
}

fn leading_number() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?").ok())
        .as_ref()
}

/// Parse an Indonesian-formatted number (`1.250,5` → `1250.5`).
///
/// The leading numeric part is read and any trailing unit dropped, so
/// `170 cm` gives `170`. Text without a leading number is returned
/// unchanged; numbers pass through.
pub fn parse_localized_number(value: &CellValue) -> CellValue {
    match value {
        CellValue::Text(s) => {
            let cleaned = s.trim().replace('.', "").replace(',', ".");
            let parsed = leading_number()
                .and_then(|re| re.find(&cleaned))
                .and_then(|m| m.as_str().parse::<f64>().ok());
            match parsed {
                Some(n) if n.is_finite() => CellValue::Number(n),
                _ => value.clone(),
            }
        }
        other => other.clone(),
    }
}

pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Split an unseparated RT/RW value at the midpoint: `001002` → `001/002`.
pub fn split_rt_rw(value: &CellValue) -> CellValue {
    let text = value.to_string();
    let text = text.trim();
    if text.contains('/') {
        return value.clone();
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 2 {
        return value.clone();
    }

    let mid = chars.len() / 2;
    let rt: String = chars[..mid].iter().collect();
    let rw: String = chars[mid..].iter().collect();
    CellValue::Text(format!("{}/{}", rt, rw))
}
