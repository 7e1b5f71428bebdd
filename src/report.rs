use printpdf::{
    BuiltinFont, CustomPdfConformance, IndirectFontRef, Line, Mm, OffsetDateTime, PdfConformance,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Point,
};
use thiserror::Error;

use crate::model::ScanRecord;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 15.0;
const TITLE_SIZE_PT: f64 = 14.0;
const BODY_SIZE_PT: f64 = 9.0;
const ROW_HEIGHT_MM: f64 = 6.0;
const PT_TO_MM: f64 = 0.352_778;

struct Column {
    header: &'static str,
    x: f64,
}

const COLUMNS: [Column; 6] = [
    Column { header: "Date", x: 15.0 },
    Column { header: "Item", x: 45.0 },
    Column { header: "Client", x: 85.0 },
    Column { header: "Department", x: 120.0 },
    Column { header: "Quantity", x: 155.0 },
    Column { header: "Barcode", x: 175.0 },
];

/// Render the filtered records as an A4 portrait table.
///
/// One row per record, in input order, values verbatim. The Barcode column
/// appears only when at least one record carries a barcode. Rows flow onto
/// continuation pages with the header repeated; the title is printed once on
/// the first page.
pub fn render(records: &[ScanRecord], title: &str) -> Result<Vec<u8>, RenderError> {
    let with_barcode = records
        .iter()
        .any(|r| r.barcode.as_deref().map_or(false, |b| !b.is_empty()));

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "report");
    let doc = pin_metadata(doc);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    layer.use_text(
        title,
        TITLE_SIZE_PT,
        centered_x(title, TITLE_SIZE_PT),
        Mm(PAGE_HEIGHT_MM - 10.0),
        &bold,
    );

    let mut y = PAGE_HEIGHT_MM - 20.0;
    draw_header(&layer, &bold, y, with_barcode);
    y -= ROW_HEIGHT_MM;

    for record in records {
        if y < MARGIN_MM {
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "report");
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
            draw_header(&layer, &bold, y, with_barcode);
            y -= ROW_HEIGHT_MM;
        }
        draw_row(&layer, &regular, y, record, with_barcode);
        y -= ROW_HEIGHT_MM;
    }

    doc.save_to_bytes().map_err(pdf_err)
}

// printpdf stamps documents with the wall clock; pin the dates so identical
// input produces identical bytes.
fn pin_metadata(doc: PdfDocumentReference) -> PdfDocumentReference {
    doc.with_conformance(PdfConformance::Custom(CustomPdfConformance {
        requires_icc_profile: false,
        requires_xmp_metadata: false,
        ..Default::default()
    }))
    .with_creation_date(OffsetDateTime::unix_epoch())
    .with_mod_date(OffsetDateTime::unix_epoch())
}

fn columns(with_barcode: bool) -> &'static [Column] {
    if with_barcode {
        &COLUMNS
    } else {
        &COLUMNS[..5]
    }
}

fn draw_header(layer: &PdfLayerReference, font: &IndirectFontRef, y: f64, with_barcode: bool) {
    for col in columns(with_barcode) {
        layer.use_text(col.header, BODY_SIZE_PT, Mm(col.x), Mm(y), font);
    }
    let rule = Line {
        points: vec![
            (Point::new(Mm(MARGIN_MM), Mm(y - 1.5)), false),
            (Point::new(Mm(PAGE_WIDTH_MM - MARGIN_MM), Mm(y - 1.5)), false),
        ],
        is_closed: false,
        has_fill: false,
        has_stroke: true,
        is_clipping_path: false,
    };
    layer.add_shape(rule);
}

fn draw_row(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    y: f64,
    record: &ScanRecord,
    with_barcode: bool,
) {
    let qty = record.qty.to_string();
    let mut cells: Vec<(&str, f64)> = vec![
        (record.date.as_str(), COLUMNS[0].x),
        (record.item.as_str(), COLUMNS[1].x),
        (record.client.as_str(), COLUMNS[2].x),
        (record.department.as_str(), COLUMNS[3].x),
        (qty.as_str(), COLUMNS[4].x),
    ];
    if with_barcode {
        cells.push((record.barcode.as_deref().unwrap_or(""), COLUMNS[5].x));
    }
    for (text, x) in cells {
        layer.use_text(text, BODY_SIZE_PT, Mm(x), Mm(y), font);
    }
}

// Builtin fonts ship without metrics, so approximate Helvetica at roughly
// half the point size per character for title centering.
fn centered_x(text: &str, size_pt: f64) -> Mm {
    let width_mm = text.chars().count() as f64 * size_pt * 0.5 * PT_TO_MM;
    Mm(((PAGE_WIDTH_MM - width_mm) / 2.0).max(MARGIN_MM))
}

fn pdf_err(err: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Quantity;

    fn record(n: usize) -> ScanRecord {
        ScanRecord {
            date: "2024-03-05".into(),
            item: format!("Item {n}"),
            client: "Acme".into(),
            department: "Mach".into(),
            qty: Quantity::Count(n as i64),
            barcode: Some(format!("B{n}")),
        }
    }

    #[test]
    fn renders_a_pdf_document() {
        let bytes = render(&[record(1)], "Daily Barcode Report - 3/5/2024").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn identical_input_renders_identical_bytes() {
        let records: Vec<ScanRecord> = (0..5).map(record).collect();
        let a = render(&records, "Daily Barcode Report - 3/5/2024").unwrap();
        let b = render(&records, "Daily Barcode Report - 3/5/2024").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn long_feeds_paginate_without_error() {
        let one_page = render(&[record(1)], "Daily Barcode Report").unwrap();
        let records: Vec<ScanRecord> = (0..150).map(record).collect();
        let many_pages = render(&records, "Daily Barcode Report").unwrap();
        assert!(many_pages.len() > one_page.len());
    }

    #[test]
    fn barcode_column_is_optional() {
        let mut no_barcode = record(1);
        no_barcode.barcode = None;
        let without = render(&[no_barcode], "Daily Barcode Report").unwrap();
        let with = render(&[record(1)], "Daily Barcode Report").unwrap();
        assert!(without.starts_with(b"%PDF"));
        assert_ne!(without, with);
    }
}
