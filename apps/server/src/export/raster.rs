//! PNG output: the full-page layout drawn with an 8x8 bitmap font.

use std::io::Cursor;

use font8x8::legacy::BASIC_LEGACY;
use image::{GrayImage, ImageFormat, Luma};

use kassa_core::export::ExportError;

use super::printable;

const GLYPH: u32 = 8;
const LINE_GAP: u32 = 4;
const MARGIN: u32 = 16;
/// Pixels per font pixel.
pub const SCALE: u32 = 3;

const PAPER: Luma<u8> = Luma([255]);
const INK: Luma<u8> = Luma([0]);

/// Image size for `columns` x `rows` of text.
pub fn dimensions(columns: usize, rows: usize) -> (u32, u32) {
    let width = 2 * MARGIN + columns as u32 * GLYPH;
    let height = 2 * MARGIN + rows.max(1) as u32 * (GLYPH + LINE_GAP) - LINE_GAP;
    (width * SCALE, height * SCALE)
}

/// Draws `lines` on white, `columns` characters wide.
pub fn render(lines: &[String], columns: usize) -> Result<Vec<u8>, ExportError> {
    let (width, height) = dimensions(columns, lines.len());
    let mut img = GrayImage::from_pixel(width, height, PAPER);

    for (row, line) in lines.iter().enumerate() {
        let top = MARGIN + row as u32 * (GLYPH + LINE_GAP);
        for (col, ch) in printable(line).chars().take(columns).enumerate() {
            let left = MARGIN + col as u32 * GLYPH;
            draw_glyph(&mut img, ch, left, top);
        }
    }

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ExportError::RenderFailed(format!("PNG encode: {}", e)))?;
    Ok(bytes)
}

/// `left`/`top` are in font pixels.
fn draw_glyph(img: &mut GrayImage, ch: char, left: u32, top: u32) {
    let glyph = BASIC_LEGACY[(ch as usize) & 0x7f];
    for (y, bits) in glyph.iter().enumerate() {
        for x in 0..GLYPH {
            if bits & (1 << x) == 0 {
                continue;
            }
            let px = (left + x) * SCALE;
            let py = (top + y as u32) * SCALE;
            for dy in 0..SCALE {
                for dx in 0..SCALE {
                    img.put_pixel(px + dx, py + dy, INK);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_has_expected_size_and_ink() {
        let lines = vec!["INVOICE".to_string(), String::new(), "TOTAL".to_string()];
        let bytes = render(&lines, 64).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), dimensions(64, 3));

        let dark = decoded.pixels().filter(|p| p.0[0] < 128).count();
        assert!(dark > 0);

        // the blank middle row stays paper
        let blank_top = (MARGIN + GLYPH + LINE_GAP) * SCALE;
        let blank_rows = blank_top..blank_top + GLYPH * SCALE;
        assert!(decoded
            .enumerate_pixels()
            .filter(|(_, y, _)| blank_rows.contains(y))
            .all(|(_, _, p)| p.0[0] == 255));
    }

    #[test]
    fn test_overlong_lines_are_clipped() {
        let bytes = render(&["x".repeat(200)], 10).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), dimensions(10, 1).0);
    }
}
