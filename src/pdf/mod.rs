//! Printable worker report
//!
//! Landscape A4 with a `DIKLAT {title}` heading, the batch/date lines and a
//! fixed-width table. Column widths come from the field catalog and are
//! scaled down when the selection does not fit the printable width.

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use std::path::Path;
use tracing::info;

use crate::core::dates::today_canonical;
use crate::core::fields::{check_selection, label, pdf_width_mm, render_row};
use crate::error::{RegistryError, RegistryResult};
use crate::types::WorkerRecord;

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 14.0;
const TABLE_TOP: f32 = 38.0;
const ROW_HEIGHT: f32 = 7.0;
const TITLE_SIZE: f32 = 16.0;
const META_SIZE: f32 = 10.0;
const CELL_SIZE: f32 = 7.0;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_RATIO: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;
const CELL_PADDING: f32 = 1.0;

fn pdf_err<E: std::fmt::Debug>(context: &str) -> impl Fn(E) -> RegistryError + '_ {
    move |e| RegistryError::Export(format!("{}: {:?}", context, e))
}

/// Approximate rendered width of `text` in millimetres.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_RATIO * PT_TO_MM
}

/// Cut `text` so it fits inside a cell of `width` millimetres.
pub fn truncate_to_width(text: &str, width: f32, size: f32) -> String {
    let usable = (width - 2.0 * CELL_PADDING).max(0.0);
    let per_char = size * GLYPH_RATIO * PT_TO_MM;
    let max_chars = (usable / per_char).floor() as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

/// Catalog widths for the selection, shrunk proportionally to the printable
/// width when they would overflow it.
pub fn column_widths(columns: &[String]) -> Vec<f32> {
    let widths: Vec<f32> = columns.iter().map(|c| pdf_width_mm(c)).collect();
    let total: f32 = widths.iter().sum();
    let printable = PAGE_WIDTH - 2.0 * MARGIN;
    if total <= printable {
        return widths;
    }
    let scale = printable / total;
    widths.into_iter().map(|w| w * scale).collect()
}

/// Rows that fit between the table top and the bottom margin, header included.
fn rows_per_page() -> usize {
    ((PAGE_HEIGHT - MARGIN - TABLE_TOP) / ROW_HEIGHT).floor() as usize
}

/// Page coordinates are measured from the bottom edge.
fn from_top(y: f32) -> Mm {
    Mm(PAGE_HEIGHT - y)
}

#[derive(Debug, Clone)]
pub struct PdfReport {
    columns: Vec<String>,
    title: String,
    date: String,
}

impl PdfReport {
    pub fn new(columns: Vec<String>, title: impl Into<String>) -> RegistryResult<Self> {
        check_selection(&columns)?;
        Ok(Self {
            columns,
            title: title.into(),
            date: today_canonical(),
        })
    }

    /// Override the generation date printed under the title.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn heading(&self) -> String {
        format!("DIKLAT {}", self.title)
    }

    /// Number of pages the records need, never less than one.
    pub fn page_count(&self, records: usize) -> usize {
        let per_page = rows_per_page().saturating_sub(1).max(1);
        records.div_ceil(per_page).max(1)
    }

    pub fn to_bytes(&self, records: &[WorkerRecord]) -> RegistryResult<Vec<u8>> {
        let doc = self.render(records)?;
        doc.save_to_bytes().map_err(pdf_err("Failed to encode PDF"))
    }

    pub fn export(&self, records: &[WorkerRecord], output_path: &Path) -> RegistryResult<()> {
        let bytes = self.to_bytes(records)?;
        std::fs::write(output_path, bytes)?;
        info!(
            path = %output_path.display(),
            rows = records.len(),
            "PDF report written"
        );
        Ok(())
    }

    fn render(&self, records: &[WorkerRecord]) -> RegistryResult<PdfDocumentReference> {
        let (doc, page, layer) =
            PdfDocument::new(self.heading(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_err("Failed to load font"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err("Failed to load font"))?;

        let widths = column_widths(&self.columns);
        let per_page = rows_per_page().saturating_sub(1).max(1);

        let first = doc.get_page(page).get_layer(layer);
        self.draw_heading(&first, &regular, &bold);
        let mut current = first;
        let mut y = self.draw_header(&current, &bold, &widths, TABLE_TOP);

        for (idx, record) in records.iter().enumerate() {
            if idx > 0 && idx % per_page == 0 {
                let (next_page, next_layer) =
                    doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
                current = doc.get_page(next_page).get_layer(next_layer);
                y = self.draw_header(&current, &bold, &widths, MARGIN);
            }

            let cells: Vec<String> = render_row(record, &self.columns)
                .iter()
                .map(|c| c.to_string())
                .collect();
            draw_cells(&current, &regular, &widths, &cells, y);
            y += ROW_HEIGHT;
        }

        Ok(doc)
    }

    fn draw_heading(
        &self,
        layer: &PdfLayerReference,
        regular: &IndirectFontRef,
        bold: &IndirectFontRef,
    ) {
        let heading = self.heading();
        let x = ((PAGE_WIDTH - text_width(&heading, TITLE_SIZE)) / 2.0).max(MARGIN);
        layer.use_text(heading, TITLE_SIZE, Mm(x), from_top(15.0), bold);
        layer.use_text("Angkatan :", META_SIZE, Mm(MARGIN), from_top(25.0), regular);
        layer.use_text(
            format!("Tanggal   : {}", self.date),
            META_SIZE,
            Mm(MARGIN),
            from_top(32.0),
            regular,
        );
    }

    /// Draw the header row at `top`, returning where the first data row goes.
    fn draw_header(
        &self,
        layer: &PdfLayerReference,
        bold: &IndirectFontRef,
        widths: &[f32],
        top: f32,
    ) -> f32 {
        let labels: Vec<String> = self.columns.iter().map(|c| label(c).to_string()).collect();
        draw_cells(layer, bold, widths, &labels, top);
        top + ROW_HEIGHT
    }
}

fn draw_cells(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    widths: &[f32],
    cells: &[String],
    top: f32,
) {
    let mut x = MARGIN;
    for (text, width) in cells.iter().zip(widths) {
        let clipped = truncate_to_width(text, *width, CELL_SIZE);
        if !clipped.is_empty() {
            let baseline = from_top(top + ROW_HEIGHT - 2.0);
            layer.use_text(clipped, CELL_SIZE, Mm(x + CELL_PADDING), baseline, font);
        }
        layer.add_line(cell_border(x, top, *width));
        x += width;
    }
}

fn cell_border(x: f32, top: f32, width: f32) -> Line {
    let bottom = top + ROW_HEIGHT;
    Line {
        points: vec![
            (Point::new(Mm(x), from_top(top)), false),
            (Point::new(Mm(x + width), from_top(top)), false),
            (Point::new(Mm(x + width), from_top(bottom)), false),
            (Point::new(Mm(x), from_top(bottom)), false),
        ],
        is_closed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_widths_fit_page() {
        let narrow = column_widths(&cols(&["NAMA", "TTL"]));
        assert_eq!(narrow, vec![25.0, 15.0]);

        let all: Vec<String> = crate::core::fields::FIELDS
            .iter()
            .map(|f| f.key.to_string())
            .collect();
        let total: f32 = column_widths(&all).iter().sum();
        assert!(total <= PAGE_WIDTH - 2.0 * MARGIN + 0.01);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate_to_width("Budi", 25.0, CELL_SIZE), "Budi");
        let long = "Jalan Panjang Sekali Nomor Seratus Dua Puluh Tiga";
        let cut = truncate_to_width(long, 15.0, CELL_SIZE);
        assert!(cut.len() < long.len());
        assert!(long.starts_with(&cut));
    }

    #[test]
    fn test_page_count() {
        let report = PdfReport::new(cols(&["NAMA"]), "BSTF II").unwrap();
        assert_eq!(report.page_count(0), 1);
        assert_eq!(report.page_count(1), 1);
        assert!(report.page_count(200) > 1);
    }

    #[test]
    fn test_heading() {
        let report = PdfReport::new(cols(&["NAMA"]), "BSTF II").unwrap();
        assert_eq!(report.heading(), "DIKLAT BSTF II");
    }

    #[test]
    fn test_to_bytes_is_pdf() {
        let report = PdfReport::new(cols(&["NAMA", "TTL", "TINGGI_BADAN"]), "BSTF II")
            .unwrap()
            .with_date("15/08/2025");
        let records: Vec<WorkerRecord> = (0..60)
            .map(|i| {
                WorkerRecord::new()
                    .with("NAMA", format!("Pekerja {}", i))
                    .with("TTL", "1990-08-15")
                    .with("TINGGI_BADAN", 170.0)
            })
            .collect();
        let bytes = report.to_bytes(&records).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_rejects_empty_selection() {
        assert!(PdfReport::new(Vec::new(), "x").is_err());
    }
}
