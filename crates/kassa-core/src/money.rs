//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  An invoice of 3 × 33.10 must total exactly 99.30, every time.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    3310 cents × 3 = 9930 cents                                          │
//! │    Two decimals only appear when the value is formatted for display     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kassa_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // 10.99
//!
//! // Arithmetic is checked; overflow is an error, never a wrapped value
//! let doubled = price.checked_mul_quantity(2, "line_total").unwrap(); // 21.98
//! let total = price.checked_add(Money::from_cents(500), "subtotal").unwrap(); // 15.99
//! assert_eq!(total.cents(), 1599);
//!
//! // Operator-typed amounts go through the strict decimal parser
//! let typed = Money::parse("12.5").unwrap();
//! assert_eq!(typed.cents(), 1250);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::MAX_PRICE_CENTS;

/// Number of fractional digits carried by every amount.
pub const MINOR_DIGITS: usize = 2;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can go negative when an item is sold below cost
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: serializes as a bare integer
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.selling_price ──► LineItem.unit_selling_price ──► line total   │
/// │  Product.buying_price  ──► LineItem.unit_buying_price  ──► profit       │
/// │                                                                         │
/// │  Invoice subtotal/profit ──► Sale.subtotal/profit (persisted)           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use kassa_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses an operator-typed decimal amount.
    ///
    /// ## Accepted Input
    /// ```text
    ///   "12"      → 1200        "-3.5"  → -350
    ///   "12.5"    → 1250        " 7.05 "→ 705   (surrounding space trimmed)
    ///   "12.50"   → 1250
    ///
    ///   "12.505"  → rejected (more than two fractional digits)
    ///   "1e3", "abc", "", "12.", ".5", "1,000" → rejected
    ///   beyond ±MAX_PRICE_CENTS → rejected
    /// ```
    ///
    /// Sign policy is left to the caller; prices use
    /// [`crate::validation::validate_price_cents`] afterwards.
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (major_str, minor_str) = match unsigned.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (unsigned, None),
        };

        if major_str.is_empty() || !major_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must be a decimal number"));
        }

        let minor = match minor_str {
            None => 0,
            Some(digits) => {
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("must be a decimal number"));
                }
                if digits.len() > MINOR_DIGITS {
                    return Err(invalid("at most two decimal places"));
                }
                // "5" → 50, "05" → 5
                let value: i64 = digits.parse().map_err(|_| invalid("must be a decimal number"))?;
                if digits.len() == 1 {
                    value * 10
                } else {
                    value
                }
            }
        };

        let out_of_range = || ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: -MAX_PRICE_CENTS,
            max: MAX_PRICE_CENTS,
        };
        let major: i64 = major_str.parse().map_err(|_| out_of_range())?;
        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .filter(|c| *c <= MAX_PRICE_CENTS)
            .ok_or_else(out_of_range)?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// `field` names the result in the overflow error.
    ///
    /// ## Example
    /// ```rust
    /// use kassa_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(50000); // 500.00 cable
    /// assert_eq!(unit_price.checked_mul_quantity(2, "line_total").unwrap().cents(), 100000);
    /// assert!(Money::from_cents(i64::MAX).checked_mul_quantity(2, "line_total").is_err());
    /// ```
    pub fn checked_mul_quantity(self, qty: i64, field: &str) -> Result<Money, ValidationError> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or_else(|| overflow(field))
    }

    /// `self + other`, or `AmountOverflow`.
    pub fn checked_add(self, other: Money, field: &str) -> Result<Money, ValidationError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| overflow(field))
    }

    /// `self - other`, or `AmountOverflow`.
    pub fn checked_sub(self, other: Money, field: &str) -> Result<Money, ValidationError> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or_else(|| overflow(field))
    }

    /// Sums amounts, failing on the first overflow.
    pub fn checked_sum<I>(amounts: I, field: &str) -> Result<Money, ValidationError>
    where
        I: IntoIterator<Item = Result<Money, ValidationError>>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount?, field))
    }

    /// Formats the amount with a currency code prefix, e.g. `LKR 1000.00`.
    pub fn with_currency(&self, currency: &str) -> String {
        format!("{} {}", currency, self)
    }
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::AmountOverflow {
        field: field.to_string(),
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two-decimal display, no currency symbol (`1234.50`, `-5.50`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
