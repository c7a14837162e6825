//! Fixed-point price utilities.
//!
//! ## Overview
//!
//! Prices and price changes use fixed-point representation to avoid
//! floating-point errors. Values are stored as `i64` scaled by 10^8; the sign
//! is needed because a price update is a signed delta.
//!
//! ## Why Fixed-Point?
//!
//! Prices are tree keys. Floating-point keys have no total order (NaN) and
//! accumulate rounding error as deltas are applied and reverted; fixed-point
//! values compare exactly and revert exactly.
//!
//! ## Examples
//!
//! ```
//! use stock_ledger::types::price::{to_fixed, from_fixed, Price};
//!
//! // Convert 50000.12345678 to fixed-point
//! let raw = to_fixed("50000.12345678").unwrap();
//! assert_eq!(raw, 5_000_012_345_678);
//! assert_eq!(from_fixed(raw), "50000.12345678");
//!
//! let price: Price = "101.5".parse().unwrap();
//! assert_eq!(price.to_string(), "101.5");
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::error::LedgerError;

/// Scaling factor for fixed-point arithmetic: 10^8
///
/// This provides 8 decimal places of precision.
pub const SCALE: i64 = 100_000_000;

/// Number of decimal places carried by [`SCALE`]
pub const SCALE_DIGITS: u32 = 8;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to fixed-point i64
///
/// # Returns
///
/// * `Some(i64)` - The fixed-point representation
/// * `None` - If parsing fails or value is out of range
///
/// # Example
///
/// ```
/// use stock_ledger::types::price::to_fixed;
///
/// assert_eq!(to_fixed("1.0"), Some(100_000_000));
/// assert_eq!(to_fixed("-0.5"), Some(-50_000_000));
/// assert_eq!(to_fixed("0.00000001"), Some(1));
/// ```
pub fn to_fixed(s: &str) -> Option<i64> {
    let decimal = Decimal::from_str(s.trim()).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a Decimal to fixed-point i64
///
/// Digits beyond the eighth decimal place are rounded.
///
/// # Returns
///
/// * `None` - If the value is out of range
pub fn decimal_to_fixed(d: Decimal) -> Option<i64> {
    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    scaled.round_dp(0).to_i64()
}

/// Convert fixed-point i64 to a Decimal (exact)
pub fn fixed_to_decimal(value: i64) -> Decimal {
    Decimal::new(value, SCALE_DIGITS)
}

/// Convert fixed-point i64 to a string with 8 decimal places
///
/// # Example
///
/// ```
/// use stock_ledger::types::price::from_fixed;
///
/// assert_eq!(from_fixed(100_000_000), "1.00000000");
/// assert_eq!(from_fixed(-1), "-0.00000001");
/// ```
pub fn from_fixed(value: i64) -> String {
    format!("{:.8}", fixed_to_decimal(value))
}

/// Convert fixed-point i64 to a human-readable string (trimmed trailing zeros)
///
/// # Example
///
/// ```
/// use stock_ledger::types::price::from_fixed_trimmed;
///
/// assert_eq!(from_fixed_trimmed(100_000_000), "1");
/// assert_eq!(from_fixed_trimmed(150_000_000), "1.5");
/// ```
pub fn from_fixed_trimmed(value: i64) -> String {
    fixed_to_decimal(value).normalize().to_string()
}

// ============================================================================
// Price
// ============================================================================

/// A fixed-point price or price change.
///
/// `Price` is `Ord` and `Copy`, which is what lets it key the price index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(i64);

impl Price {
    /// Zero
    pub const ZERO: Price = Price(0);

    /// Wrap a raw fixed-point value (scaled by 10^8)
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Price(raw)
    }

    /// Get the raw fixed-point value
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Convert from a Decimal, rounding to 8 decimal places
    pub fn from_decimal(d: Decimal) -> Option<Self> {
        decimal_to_fixed(d).map(Price)
    }

    /// Convert to an exact Decimal
    pub fn to_decimal(self) -> Decimal {
        fixed_to_decimal(self.0)
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two prices, `None` on overflow
    #[inline]
    pub fn checked_add(self, other: Price) -> Option<Price> {
        self.0.checked_add(other.0).map(Price)
    }

    /// Subtract two prices, `None` on overflow
    #[inline]
    pub fn checked_sub(self, other: Price) -> Option<Price> {
        self.0.checked_sub(other.0).map(Price)
    }
}

impl FromStr for Price {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_fixed(s)
            .map(Price)
            .ok_or_else(|| LedgerError::InvalidPrice(s.to_string()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&from_fixed_trimmed(self.0))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_constant() {
        assert_eq!(SCALE, 100_000_000);
        assert_eq!(10i64.pow(SCALE_DIGITS), SCALE);
    }

    #[test]
    fn test_to_fixed_basic() {
        assert_eq!(to_fixed("1.0"), Some(100_000_000));
        assert_eq!(to_fixed("1"), Some(100_000_000));
        assert_eq!(to_fixed("0.5"), Some(50_000_000));
        assert_eq!(to_fixed("0.00000001"), Some(1));
        assert_eq!(to_fixed("50000.12345678"), Some(5_000_012_345_678));
    }

    #[test]
    fn test_to_fixed_signed() {
        assert_eq!(to_fixed("-1.0"), Some(-100_000_000));
        assert_eq!(to_fixed("-0.00000001"), Some(-1));
    }

    #[test]
    fn test_to_fixed_edge_cases() {
        assert_eq!(to_fixed("0"), Some(0));
        assert_eq!(to_fixed(" 2.5 "), Some(250_000_000));

        // Invalid strings should return None
        assert_eq!(to_fixed("abc"), None);
        assert_eq!(to_fixed(""), None);

        // Out of i64 range once scaled
        assert_eq!(to_fixed("100000000000000"), None);
    }

    #[test]
    fn test_to_fixed_rounds_extra_digits() {
        assert_eq!(to_fixed("0.000000014"), Some(1));
        assert_eq!(to_fixed("0.000000016"), Some(2));
    }

    #[test]
    fn test_from_fixed() {
        assert_eq!(from_fixed(100_000_000), "1.00000000");
        assert_eq!(from_fixed(50_000_000), "0.50000000");
        assert_eq!(from_fixed(5_000_012_345_678), "50000.12345678");
        assert_eq!(from_fixed(0), "0.00000000");
        assert_eq!(from_fixed(-150_000_000), "-1.50000000");
    }

    #[test]
    fn test_from_fixed_trimmed() {
        assert_eq!(from_fixed_trimmed(100_000_000), "1");
        assert_eq!(from_fixed_trimmed(150_000_000), "1.5");
        assert_eq!(from_fixed_trimmed(123_456_789), "1.23456789");
    }

    #[test]
    fn test_price_parse_and_display() {
        let price: Price = "101.25".parse().unwrap();
        assert_eq!(price.raw(), 10_125_000_000);
        assert_eq!(price.to_string(), "101.25");

        let err = "1.2.3".parse::<Price>().unwrap_err();
        assert_eq!(err, LedgerError::InvalidPrice("1.2.3".into()));
    }

    #[test]
    fn test_price_arithmetic() {
        let a = Price::from_raw(300);
        let b = Price::from_raw(-500);

        assert_eq!(a.checked_add(b), Some(Price::from_raw(-200)));
        assert_eq!(a.checked_sub(b), Some(Price::from_raw(800)));
        assert_eq!(Price::from_raw(i64::MAX).checked_add(a), None);
        assert!(a.is_positive());
        assert!(!b.is_positive());
        assert!(Price::ZERO.is_zero());
    }

    #[test]
    fn test_price_decimal_roundtrip() {
        let d = Decimal::from_str("123456.78901234").unwrap();
        let price = Price::from_decimal(d).unwrap();
        assert_eq!(price.to_decimal(), d);
    }

    #[test]
    fn test_price_ordering() {
        let mut prices: Vec<Price> = ["3", "-1", "2.5", "0"].iter().map(|s| s.parse().unwrap()).collect();
        prices.sort();
        let shown: Vec<String> = prices.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["-1", "0", "2.5", "3"]);
    }
}
