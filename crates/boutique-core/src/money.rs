//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A bill of ₹1049.99 with 5% GST stored as REAL drifts on every          │
//! │  dashboard aggregation.                                                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    ₹1050.00 = 105000 paise, sums are exact                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use boutique_core::money::Money;
//!
//! let price = Money::from_rupees(500);     // ₹500.00
//! let line = price.multiply_quantity(2);   // ₹1000.00
//! assert_eq!(line.paise(), 100_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts and differences can go negative mid-calculation
/// - **Single field tuple struct**: serializes as a bare integer on the wire
/// - **sqlx transparent**: stored as an INTEGER column
///
/// ## Where Money Flows
/// ```text
/// Product.selling_price ──► LineItem.unit_price ──► LineItem.line_total
///                                                        │
///                    Bill.subtotal ◄─────────────────────┘
///                         │
///                         ├──► GST ──► Bill.total_amount
///                         └──► loyalty points earned (1%)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use boutique_core::money::Money;
    ///
    /// let price = Money::from_paise(49_950); // ₹499.50
    /// assert_eq!(price.paise(), 49_950);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    ///
    /// ## Example
    /// ```rust
    /// use boutique_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(104_999).rupees(), 1049);
    /// assert_eq!(Money::from_paise(-550).rupees(), -5);
    /// ```
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax at the given rate, rounding half up to the nearest paisa.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`
    ///
    /// ## Example
    /// ```rust
    /// use boutique_core::money::Money;
    /// use boutique_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_rupees(1000);
    /// let gst = subtotal.calculate_tax(TaxRate::from_bps(500)); // 5%
    /// assert_eq!(gst, Money::from_rupees(50));
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 so large bills cannot overflow the intermediate product
        let tax_paise = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_paise(tax_paise as i64)
    }

    /// Returns `bps` basis points of this amount, rounded down.
    ///
    /// Used where the business rule says "floor", e.g. loyalty earn rate
    /// and the redemption cap.
    ///
    /// ## Example
    /// ```rust
    /// use boutique_core::money::Money;
    ///
    /// // 1% of ₹1,999.99 is ₹19.9999 → ₹19.99
    /// assert_eq!(Money::from_paise(199_999).percentage_floor(100).paise(), 1_999);
    /// ```
    pub fn percentage_floor(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128).div_euclid(10000);
        Money::from_paise(part as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use boutique_core::money::Money;
    ///
    /// let unit_price = Money::from_rupees(500);
    /// assert_eq!(unit_price.multiply_quantity(2), Money::from_rupees(1000));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies by a quantity, `None` on overflow.
    ///
    /// Used where a caller's figure is compared against the result, so a
    /// saturated product can never pass for a real one.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Adds, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Subtracts without going below zero.
    #[inline]
    pub fn saturating_sub_to_zero(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

// Operators saturate at the i64 bounds instead of panicking; code that
// must detect overflow uses the `checked_*` methods.

/// Display for logs and error messages. The dashboard does its own
/// locale-aware formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(104_999);
        assert_eq!(money.paise(), 104_999);
        assert_eq!(money.rupees(), 1049);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_rupees(1050).to_string(), "₹1050.00");
        assert_eq!(Money::from_paise(5).to_string(), "₹0.05");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupees(10);
        let b = Money::from_rupees(5);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);
    }

    #[test]
    fn test_gst_five_percent() {
        let subtotal = Money::from_rupees(1000);
        assert_eq!(subtotal.calculate_tax(TaxRate::from_bps(500)).paise(), 5000);
    }

    #[test]
    fn test_gst_rounds_half_up() {
        // ₹0.10 at 5% = 0.5 paise → 1 paisa
        let amount = Money::from_paise(10);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(500)).paise(), 1);
    }

    #[test]
    fn test_percentage_floor_never_rounds_up() {
        assert_eq!(Money::from_paise(9_999).percentage_floor(2000).paise(), 1_999);
        assert_eq!(Money::zero().percentage_floor(2000), Money::zero());
    }

    #[test]
    fn test_sum() {
        let lines = [Money::from_rupees(500), Money::from_rupees(250)];
        let total: Money = lines.iter().sum();
        assert_eq!(total, Money::from_rupees(750));
    }

    #[test]
    fn test_overflow_saturates_or_reports() {
        let big = Money::from_paise(i64::MAX / 2 + 1);

        assert_eq!(big.multiply_quantity(2), Money::from_paise(i64::MAX));
        assert_eq!(big + big, Money::from_paise(i64::MAX));
        assert_eq!(big.checked_multiply_quantity(2), None);
        assert_eq!(big.checked_add(big), None);

        assert_eq!(big.checked_multiply_quantity(1), Some(big));
        assert_eq!(
            Money::from_rupees(5).checked_add(Money::from_rupees(7)),
            Some(Money::from_rupees(12))
        );
    }

    #[test]
    fn test_saturating_sub_to_zero() {
        let a = Money::from_rupees(10);
        assert_eq!(a.saturating_sub_to_zero(Money::from_rupees(25)), Money::zero());
        assert_eq!(a.saturating_sub_to_zero(Money::from_rupees(4)), Money::from_rupees(6));
    }
}
