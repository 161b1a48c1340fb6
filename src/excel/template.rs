//! Import template workbook
//!
//! Sheet `Template` carries every import header with one sample row; sheet
//! `Petunjuk` explains the expected formats, above all the day-first date
//! convention.

use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::info;

use crate::core::fields::{FieldKind, FIELDS};
use crate::error::{RegistryError, RegistryResult};

pub const TEMPLATE_SHEET: &str = "Template";
pub const INSTRUCTIONS_SHEET: &str = "Petunjuk";
pub const TEMPLATE_FILE_NAME: &str = "Template_Data_Pekerja_Indonesia.xlsx";

const TEMPLATE_COLUMN_WIDTH: f64 = 20.0;

/// Sample value per column; every key in the field catalog has one.
pub const SAMPLE_ROW: &[(&str, &str)] = &[
    ("NAMA", "Contoh Nama Lengkap"),
    ("NIK", "1234567890123456"),
    ("TEMPAT_LAHIR", "Jakarta"),
    ("TTL", "15/08/1990"),
    ("SEKOLAH", "SMA Negeri 1"),
    ("KTP", "Ada"),
    ("KK", "Ada"),
    ("IJAZAH", "Ada"),
    ("AKTA_KELAHIRAN", "Ada"),
    ("BSTFII", "Ada"),
    ("ALAMAT", "Jl. Contoh No. 123"),
    ("PROVINSI", "DKI Jakarta"),
    ("KOTA", "Jakarta Pusat"),
    ("KECAMATAN", "Gambir"),
    ("KELURAHAN", "Kelurahan Contoh"),
    ("RT_RW", "001/002"),
    ("WARNA_RAMBUT", "Hitam"),
    ("WARNA_MATA", "Hitam"),
    ("WARNA_KULIT", "Sawo Matang"),
    ("TINGGI_BADAN", "170"),
    ("BERAT_BADAN", "65"),
    ("GOLONGAN_DARAH", "O"),
    ("NAMA_KAPAL", "KM Contoh"),
    ("NAMA_IBU", "Nama Ibu Kandung"),
    ("AGAMA", "Islam"),
    ("PENDIDIKAN_TERAKHIR", "SMA"),
];

pub const INSTRUCTIONS: &[&str] = &[
    "FORMAT DATA PEKERJA",
    "",
    "1. TTL harus dalam format dd/mm/yyyy (contoh: 15/08/1990)",
    "2. NIK harus 16 digit angka",
    "3. TINGGI_BADAN dan BERAT_BADAN dalam angka",
    "4. RT_RW dalam format 001/002",
    "5. Hapus baris contoh ini sebelum mengisi data",
    "",
    "CATATAN PENTING:",
    "- Semua tanggal akan diperlakukan sebagai format Indonesia (dd/mm/yyyy)",
    "- Contoh: 13/1/2001 akan menjadi 13/01/2001 (13 Januari 2001)",
    "- Jangan gunakan format Amerika (mm/dd/yyyy)",
    "- dd/mm/yyyy (15/08/1990)",
    "- dd-mm-yyyy (15-08-1990)",
    "- dd.mm.yyyy (15.08.1990)",
];

fn sample_value(key: &str) -> &'static str {
    SAMPLE_ROW
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or("")
}

fn build_template() -> RegistryResult<Workbook> {
    let mut workbook = Workbook::new();
    let text_format = Format::new().set_num_format("@");
    let bold = Format::new().set_bold();
    let err = |e: rust_xlsxwriter::XlsxError| {
        RegistryError::Export(format!("Failed to build template: {}", e))
    };

    let sheet = workbook.add_worksheet();
    sheet.set_name(TEMPLATE_SHEET).map_err(err)?;
    for (idx, spec) in FIELDS.iter().enumerate() {
        let col = idx as u16;
        sheet.write_string(0, col, spec.key).map_err(err)?;
        sheet
            .set_column_width(col, TEMPLATE_COLUMN_WIDTH)
            .map_err(err)?;

        let sample = sample_value(spec.key);
        if FieldKind::of(spec.key) == FieldKind::Date {
            sheet
                .write_string_with_format(1, col, sample, &text_format)
                .map_err(err)?;
        } else {
            sheet.write_string(1, col, sample).map_err(err)?;
        }
    }

    let notes = workbook.add_worksheet();
    notes.set_name(INSTRUCTIONS_SHEET).map_err(err)?;
    notes.set_column_width(0, 80).map_err(err)?;
    notes
        .write_string_with_format(0, 0, "PETUNJUK", &bold)
        .map_err(err)?;
    for (idx, line) in INSTRUCTIONS.iter().enumerate() {
        if !line.is_empty() {
            notes
                .write_string((idx + 1) as u32, 0, *line)
                .map_err(err)?;
        }
    }

    Ok(workbook)
}

/// Template workbook as .xlsx bytes
pub fn template_bytes() -> RegistryResult<Vec<u8>> {
    build_template()?
        .save_to_buffer()
        .map_err(|e| RegistryError::Export(format!("Failed to encode template: {}", e)))
}

/// Write the template workbook to disk
pub fn write_template(output_path: &Path) -> RegistryResult<()> {
    build_template()?
        .save(output_path)
        .map_err(|e| RegistryError::Export(format!("Failed to save template: {}", e)))?;
    info!(path = %output_path.display(), "import template written");
    Ok(())
}
