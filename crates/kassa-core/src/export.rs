//! # Document Export Contract
//!
//! What the invoice hands to a renderer, and what a renderer hands back.
//! Rendering itself happens outside this crate; the server ships a PDF and
//! PNG renderer and others plug in through [`DocumentRenderer`].
//!
//! ```text
//! Invoice ──build_document()──► ExportDocument ──renderer.render(fmt)──► RenderedDocument
//!                                 (snapshot)                              (bytes + file name)
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::invoice::Invoice;
use crate::money::Money;

// =============================================================================
// Format
// =============================================================================

/// Output artifact kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// A4-class filing copy.
    FullPage,
    /// 58mm roll, 32 characters per line.
    ThermalReceipt,
    /// Shareable picture of the full page layout.
    RasterImage,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [
        ExportFormat::FullPage,
        ExportFormat::ThermalReceipt,
        ExportFormat::RasterImage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::FullPage => "full_page",
            ExportFormat::ThermalReceipt => "thermal_receipt",
            ExportFormat::RasterImage => "raster_image",
        }
    }

    /// File name without extension, e.g. `Kassa_Electronics_Invoice_2024-03-01`
    /// or `Receipt_2024-03-01`.
    pub fn file_stem(&self, store_name: &str, date: &str) -> String {
        match self {
            ExportFormat::ThermalReceipt => format!("Receipt_{}", date),
            ExportFormat::FullPage | ExportFormat::RasterImage => {
                let store: String = store_name
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join("_");
                format!("{}_Invoice_{}", store, date)
            }
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full_page" | "page" | "pdf" | "a4" => Ok(ExportFormat::FullPage),
            "thermal_receipt" | "receipt" | "thermal" => Ok(ExportFormat::ThermalReceipt),
            "raster_image" | "image" | "png" => Ok(ExportFormat::RasterImage),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// Shop identity printed at the top of every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreHeader {
    pub name: String,
    pub phone: Option<String>,
    pub currency: String,
}

/// One printed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExportLine {
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

impl ExportLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// Immutable snapshot handed to a renderer. Carries no cost or profit figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExportDocument {
    pub header: StoreHeader,
    pub lines: Vec<ExportLine>,
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub issued_at: DateTime<Local>,
}

impl ExportDocument {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// `YYYY-MM-DD` of issue, used in file names.
    pub fn issue_date(&self) -> String {
        self.issued_at.format("%Y-%m-%d").to_string()
    }
}

/// Snapshots the invoice for rendering.
pub fn build_document(
    invoice: &Invoice,
    header: StoreHeader,
    issued_at: DateTime<Local>,
) -> CoreResult<ExportDocument> {
    if invoice.is_empty() {
        return Err(CoreError::EmptyInvoice);
    }

    let lines = invoice
        .items
        .iter()
        .map(|line| {
            Ok(ExportLine {
                name: line.name.clone(),
                unit_price_cents: line.unit_selling_price_cents,
                quantity: line.quantity,
                line_total_cents: line.line_total()?.cents(),
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(ExportDocument {
        header,
        lines,
        subtotal_cents: invoice.subtotal()?.cents(),
        issued_at,
    })
}

// =============================================================================
// Renderer
// =============================================================================

/// A finished artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Export failures.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("Export format {0} is not supported by this renderer")]
    UnsupportedFormat(ExportFormat),

    #[error("Rendering failed: {0}")]
    RenderFailed(String),
}

/// Anything that can turn an [`ExportDocument`] into bytes.
///
/// Implementations read nothing but the document: the same snapshot and
/// format render the same content. Container metadata such as a PDF's
/// creation time may differ between calls.
pub trait DocumentRenderer: Send + Sync {
    fn render(
        &self,
        document: &ExportDocument,
        format: ExportFormat,
    ) -> Result<RenderedDocument, ExportError>;
}

// =============================================================================
// Unit Tests
// =============================================================================
