//! Monospace line layouts shared by the PDF and PNG backends.
//!
//! ```text
//! FullPage (64 columns)                    ThermalReceipt (32 columns)
//! ┌──────────────────────────────────┐     ┌────────────────────────┐
//! │ Store                    INVOICE │     │         Store          │
//! │ Tel: ...           Date: ...     │     │       Tel: ...         │
//! │                    Time: ...     │     │    date time           │
//! │ ================================ │     │ ---------------------- │
//! │ Item     Price (LKR)  Qty  Total │     │ USB Cable              │
//! │ -------------------------------- │     │ 2 x 500.00     1000.00 │
//! │ USB Cable     500.00    2 1000.00│     │ ---------------------- │
//! │ -------------------------------- │     │ TOTAL:     LKR 1000.00 │
//! │          Subtotal:   LKR 1000.00 │     │ ---------------------- │
//! │   Thank you for your business!   │     │       Thank you!       │
//! └──────────────────────────────────┘     │      Shop Again.       │
//!                                          └────────────────────────┘
//! ```

use kassa_core::export::ExportDocument;

/// Characters per line on an A4 page.
pub const PAGE_WIDTH: usize = 64;

/// Characters per line on a 58mm roll.
pub const RECEIPT_WIDTH: usize = 32;

// =============================================================================
// Layout Helpers
// =============================================================================

fn text_width(s: &str) -> usize {
    s.chars().count()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    s.chars().take(max_width).collect()
}

fn pad_to_width(s: &str, width: usize, align_right: bool) -> String {
    let current = text_width(s);
    if current >= width {
        return truncate_to_width(s, width);
    }
    let spaces = " ".repeat(width - current);
    if align_right {
        format!("{}{}", spaces, s)
    } else {
        format!("{}{}", s, spaces)
    }
}

/// Fixed-width line buffer.
struct TextLayout {
    lines: Vec<String>,
    width: usize,
}

impl TextLayout {
    fn new(width: usize) -> Self {
        Self {
            lines: Vec::new(),
            width,
        }
    }

    fn write_line(&mut self, s: &str) {
        self.lines.push(s.trim_end().to_string());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn eq_sep(&mut self) {
        self.write_line(&"=".repeat(self.width));
    }

    fn dash_sep(&mut self) {
        self.write_line(&"-".repeat(self.width));
    }

    fn text_center(&mut self, s: &str) {
        let w = text_width(s);
        if w >= self.width {
            self.wrapped(s);
        } else {
            let left = (self.width - w) / 2;
            self.write_line(&format!("{}{}", " ".repeat(left), s));
        }
    }

    /// Left text and right text on one line, right text flush with the edge.
    fn line_lr(&mut self, left: &str, right: &str) {
        let lw = text_width(left);
        let rw = text_width(right);
        if lw + rw >= self.width {
            self.wrapped(left);
            self.write_line(&pad_to_width(right, self.width, true));
        } else {
            let spaces = self.width - lw - rw;
            self.write_line(&format!("{}{}{}", left, " ".repeat(spaces), right));
        }
    }

    /// Splits long text over several lines.
    fn wrapped(&mut self, s: &str) {
        let chars: Vec<char> = s.chars().collect();
        if chars.is_empty() {
            self.blank();
            return;
        }
        for chunk in chars.chunks(self.width) {
            let line: String = chunk.iter().collect();
            self.write_line(&line);
        }
    }

    fn finish(self) -> Vec<String> {
        self.lines
    }
}

// =============================================================================
// Layouts
// =============================================================================

/// The A4 invoice, also used for the PNG image.
pub fn full_page(doc: &ExportDocument) -> Vec<String> {
    const NAME_W: usize = 28;
    const PRICE_W: usize = 14;
    const QTY_W: usize = 8;
    const TOTAL_W: usize = 14;

    let header = &doc.header;
    let mut out = TextLayout::new(PAGE_WIDTH);

    out.line_lr(&header.name, "INVOICE");
    let date = format!("Date: {:>10}", doc.issued_at.format("%Y-%m-%d"));
    let time = format!("Time: {:>10}", doc.issued_at.format("%H:%M:%S"));
    match &header.phone {
        Some(phone) => out.line_lr(&format!("Tel: {}", phone), &date),
        None => out.line_lr("", &date),
    }
    out.line_lr("", &time);
    out.eq_sep();

    out.write_line(&format!(
        "{}{}{}{}",
        pad_to_width("Item", NAME_W, false),
        pad_to_width(&format!("Price ({})", header.currency), PRICE_W, true),
        pad_to_width("Qty", QTY_W, true),
        pad_to_width("Total", TOTAL_W, true),
    ));
    out.dash_sep();

    for line in &doc.lines {
        out.write_line(&format!(
            "{}{}{}{}",
            pad_to_width(&line.name, NAME_W, false),
            pad_to_width(&line.unit_price().to_string(), PRICE_W, true),
            pad_to_width(&line.quantity.to_string(), QTY_W, true),
            pad_to_width(&line.line_total().to_string(), TOTAL_W, true),
        ));
    }

    out.dash_sep();
    let subtotal = format!(
        "Subtotal: {:>16}",
        doc.subtotal().with_currency(&header.currency)
    );
    out.line_lr("", &subtotal);
    out.blank();
    out.text_center("Thank you for your business!");

    out.finish()
}

/// The 58mm roll receipt.
pub fn thermal_receipt(doc: &ExportDocument) -> Vec<String> {
    let header = &doc.header;
    let mut out = TextLayout::new(RECEIPT_WIDTH);

    out.text_center(&header.name);
    if let Some(phone) = &header.phone {
        out.text_center(&format!("Tel: {}", phone));
    }
    out.text_center(&doc.issued_at.format("%Y-%m-%d %H:%M:%S").to_string());
    out.dash_sep();

    for line in &doc.lines {
        out.wrapped(&line.name);
        out.line_lr(
            &format!("{} x {}", line.quantity, line.unit_price()),
            &line.line_total().to_string(),
        );
    }

    out.dash_sep();
    out.line_lr("TOTAL:", &doc.subtotal().with_currency(&header.currency));
    out.dash_sep();
    out.blank();
    out.text_center("Thank you!");
    out.text_center("Shop Again.");

    out.finish()
}
