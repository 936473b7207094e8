//! # Product Sheet Import
//!
//! Turns an exported spreadsheet (JSON array of rows) into
//! [`ProductInput`]s for [`crate::ProductRepository::insert_bulk`].
//!
//! Accepted row shapes:
//! ```json
//! { "Column1": "USB Cable", "Our buying Price": "300", "Our Selling Price": 500 }
//! { "name": "USB Cable", "buying_price": 300, "selling_price": "500.00" }
//! ```
//! Prices may be JSON numbers or numeric strings, in major units.

use serde::Deserialize;

use crate::error::DbResult;
use kassa_core::validation::validate_product_input;
use kassa_core::{Money, ProductInput};

/// A price cell as it appears in the sheet.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PriceCell {
    Number(serde_json::Number),
    Text(String),
}

impl PriceCell {
    /// `Ok(None)` for blank cells.
    fn to_cents(&self) -> Result<Option<i64>, String> {
        let raw = match self {
            PriceCell::Number(n) => n.to_string(),
            PriceCell::Text(s) => s.trim().to_string(),
        };
        if raw.is_empty() {
            return Ok(None);
        }
        Money::parse(&raw)
            .map(|m| Some(m.cents()))
            .map_err(|e| format!("'{}': {}", raw, e))
    }
}

#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(alias = "Column1")]
    name: Option<String>,
    #[serde(alias = "Our buying Price")]
    buying_price: Option<PriceCell>,
    #[serde(alias = "Our Selling Price")]
    selling_price: Option<PriceCell>,
}

/// A row that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// Zero-based position in the sheet.
    pub index: usize,
    pub reason: String,
}

/// Outcome of parsing a sheet.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub products: Vec<ProductInput>,
    pub skipped: Vec<SkippedRow>,
}

/// Parses a JSON product sheet. Invalid rows are reported, not fatal; a
/// document that is not a JSON array of objects is.
pub fn parse_product_sheet(json: &str) -> DbResult<ImportReport> {
    let rows: Vec<SheetRow> = serde_json::from_str(json)?;
    let mut report = ImportReport::default();

    for (index, row) in rows.into_iter().enumerate() {
        match row_to_input(row) {
            Ok(input) => report.products.push(input),
            Err(reason) => report.skipped.push(SkippedRow { index, reason }),
        }
    }

    Ok(report)
}

fn row_to_input(row: SheetRow) -> Result<ProductInput, String> {
    let name = row
        .name
        .map(|n| n.trim().to_string())
        .ok_or_else(|| "missing name".to_string())?;

    let selling_price_cents = match &row.selling_price {
        Some(cell) => cell.to_cents()?,
        None => None,
    }
    .ok_or_else(|| "missing selling price".to_string())?;

    let buying_price_cents = match &row.buying_price {
        Some(cell) => cell.to_cents()?,
        None => None,
    };

    let input = ProductInput {
        name,
        buying_price_cents,
        selling_price_cents,
    };
    validate_product_input(&input).map_err(|e| e.to_string())?;
    Ok(input)
}
