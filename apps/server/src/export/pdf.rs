//! PDF output for the A4 invoice and the 58mm receipt.
//!
//! Both are laid out as monospace lines and set in the built-in Courier
//! face, so no font file ships with the server.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use kassa_core::export::ExportError;

use super::printable;

const PT_TO_MM: f32 = 0.352_778;

/// Paper and type settings for one kind of document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    /// `None` sizes a single page to its content (continuous roll).
    pub height_mm: Option<f32>,
    pub margin_mm: f32,
    pub font_size_pt: f32,
}

/// A4 portrait, 10pt.
pub const A4: PageGeometry = PageGeometry {
    width_mm: 210.0,
    height_mm: Some(297.0),
    margin_mm: 20.0,
    font_size_pt: 10.0,
};

/// 58mm roll, 8pt. 32 Courier columns fit between the margins.
pub const RECEIPT_58MM: PageGeometry = PageGeometry {
    width_mm: 58.0,
    height_mm: None,
    margin_mm: 1.5,
    font_size_pt: 8.0,
};

impl PageGeometry {
    pub fn line_height_mm(&self) -> f32 {
        self.font_size_pt * 1.2 * PT_TO_MM
    }

    /// Lines that fit on one page; everything for a roll.
    pub fn lines_per_page(&self, total: usize) -> usize {
        match self.height_mm {
            Some(height) => {
                let usable = height - 2.0 * self.margin_mm;
                ((usable / self.line_height_mm()).floor() as usize).max(1)
            }
            None => total.max(1),
        }
    }

    pub fn page_height_mm(&self, lines_on_page: usize) -> f32 {
        self.height_mm.unwrap_or_else(|| {
            2.0 * self.margin_mm + lines_on_page.max(1) as f32 * self.line_height_mm()
        })
    }
}

/// Sets `lines` on as many pages as they need.
pub fn render(title: &str, lines: &[String], geometry: PageGeometry) -> Result<Vec<u8>, ExportError> {
    let per_page = geometry.lines_per_page(lines.len());
    let mut pages = lines.chunks(per_page);
    let first = pages.next().unwrap_or(&[]);

    let height = geometry.page_height_mm(first.len());
    let (doc, page, layer) =
        PdfDocument::new(title, Mm(geometry.width_mm), Mm(height), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| ExportError::RenderFailed(format!("PDF font: {}", e)))?;

    let layers = std::iter::once((page, layer, height, first)).chain(pages.map(|chunk| {
        let height = geometry.page_height_mm(chunk.len());
        let (page, layer) = doc.add_page(Mm(geometry.width_mm), Mm(height), "Layer 1");
        (page, layer, height, chunk)
    }));

    let line_height = geometry.line_height_mm();
    for (page, layer, height, chunk) in layers {
        let canvas = doc.get_page(page).get_layer(layer);
        for (i, line) in chunk.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            // baseline sits a fifth of a line above the slot bottom
            let y = height - geometry.margin_mm - (i as f32 + 0.8) * line_height;
            canvas.use_text(
                printable(line),
                geometry.font_size_pt,
                Mm(geometry.margin_mm),
                Mm(y),
                &font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::RenderFailed(format!("PDF write: {}", e)))
}
