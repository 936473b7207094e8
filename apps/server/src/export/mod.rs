//! # Document Renderer
//!
//! Turns an [`ExportDocument`] into the file the browser downloads.
//!
//! ```text
//! ExportDocument ──► layout::full_page ───────┬──► pdf::render(A4)           ─► .pdf
//!                                             └──► raster::render            ─► .png
//!                ──► layout::thermal_receipt ─────► pdf::render(RECEIPT_58MM) ─► .pdf
//! ```
//!
//! Text is limited to printable ASCII; other characters print as `?`.

pub mod layout;
pub mod pdf;
pub mod raster;

use kassa_core::export::{
    DocumentRenderer, ExportDocument, ExportError, ExportFormat, RenderedDocument,
};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Renders every [`ExportFormat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceRenderer;

impl InvoiceRenderer {
    pub fn new() -> Self {
        InvoiceRenderer
    }
}

impl DocumentRenderer for InvoiceRenderer {
    fn render(
        &self,
        document: &ExportDocument,
        format: ExportFormat,
    ) -> Result<RenderedDocument, ExportError> {
        let stem = format.file_stem(&document.header.name, &document.issue_date());

        let (bytes, extension, content_type) = match format {
            ExportFormat::FullPage => {
                let lines = layout::full_page(document);
                (pdf::render(&stem, &lines, pdf::A4)?, "pdf", PDF_CONTENT_TYPE)
            }
            ExportFormat::ThermalReceipt => {
                let lines = layout::thermal_receipt(document);
                (pdf::render(&stem, &lines, pdf::RECEIPT_58MM)?, "pdf", PDF_CONTENT_TYPE)
            }
            ExportFormat::RasterImage => {
                let lines = layout::full_page(document);
                (raster::render(&lines, layout::PAGE_WIDTH)?, "png", PNG_CONTENT_TYPE)
            }
        };

        Ok(RenderedDocument {
            file_name: format!("{}.{}", stem, extension),
            content_type,
            bytes,
        })
    }
}

/// Printable ASCII only.
fn printable(s: &str) -> String {
    s.chars()
        .map(|c| if c == ' ' || c.is_ascii_graphic() { c } else { '?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::layout::tests::document;

    #[test]
    fn test_full_page_is_pdf() {
        let rendered = InvoiceRenderer::new()
            .render(&document(Some("077 123 4567")), ExportFormat::FullPage)
            .unwrap();

        assert_eq!(rendered.file_name, "Kassa_Electronics_Invoice_2024-03-01.pdf");
        assert_eq!(rendered.content_type, "application/pdf");
        assert!(rendered.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_thermal_receipt_is_pdf() {
        let rendered = InvoiceRenderer::new()
            .render(&document(None), ExportFormat::ThermalReceipt)
            .unwrap();

        assert_eq!(rendered.file_name, "Receipt_2024-03-01.pdf");
        assert_eq!(rendered.content_type, "application/pdf");
        assert!(rendered.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_raster_image_is_png() {
        let doc = document(None);
        let rendered = InvoiceRenderer::new()
            .render(&doc, ExportFormat::RasterImage)
            .unwrap();

        assert_eq!(rendered.file_name, "Kassa_Electronics_Invoice_2024-03-01.png");
        assert_eq!(rendered.content_type, "image/png");

        let image = image::load_from_memory(&rendered.bytes).unwrap();
        let rows = layout::full_page(&doc).len();
        assert_eq!(
            (image.width(), image.height()),
            raster::dimensions(layout::PAGE_WIDTH, rows)
        );
    }

    #[test]
    fn test_same_document_renders_same_bytes() {
        let doc = document(None);
        let renderer = InvoiceRenderer::new();
        let first = renderer.render(&doc, ExportFormat::RasterImage).unwrap();
        let second = renderer.render(&doc, ExportFormat::RasterImage).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_printable() {
        assert_eq!(printable("Café 50% off"), "Caf? 50% off");
        assert_eq!(printable("tab\there"), "tab?here");
    }
}
