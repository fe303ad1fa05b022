//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  0.1 + 0.2 = 0.30000000000000004  ❌                                    │
//! │                                                                         │
//! │  OUR SOLUTION: whole currency units in an i64                           │
//! │    Rp 40 / 5 = Rp 8 exactly                                             │
//! │    Rp 100 / 3 = Rp 33 (×3 = Rp 99) → the remainder is explicit          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store trades in a currency without a minor unit in practice, so one
//! `Money` unit is one rupiah. Loyalty math (1 point per 1000 spent, 1 point
//! redeems 1 unit) is expressed directly in these units.
//!
//! ## Usage
//! ```rust
//! use warung_core::money::Money;
//!
//! let price = Money::from_units(12_500);
//! let line = price * 3;
//! assert_eq!(line.units(), 37_500);
//! assert_eq!(line.to_string(), "Rp37.500");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: reversals and refunds are negative amounts
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **sqlx transparent**: stored as a plain INTEGER column
///
/// ## Where Money is Used
/// ```text
/// Product.unit_price ──┬──► BillableItem.unit_price ──► BillableItem.subtotal
/// Product.package_price┘                                      │
///                                                             ▼
///             Cart.total ──► redemption ──► Sale.total ──► Sale.paid / change
///                                                             │
///                                                             ▼
///                                                  Receivable.amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// let price = Money::from_units(1500);
    /// assert_eq!(price.units(), 1500);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in whole currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// let unit_price = Money::from_units(2_500);
    /// assert_eq!(unit_price.multiply_quantity(4).units(), 10_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Splits an amount evenly over `qty` units, rounding toward zero.
    ///
    /// Used to show the effective per-unit price of a package. The package
    /// subtotal is always billed from the package price itself, never from
    /// this rounded figure.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(40).per_unit(5).units(), 8);
    /// assert_eq!(Money::from_units(100).per_unit(3).units(), 33);
    /// assert_eq!(Money::from_units(100).per_unit(0).units(), 0);
    /// ```
    #[inline]
    pub const fn per_unit(&self, qty: i64) -> Self {
        if qty == 0 {
            Money(0)
        } else {
            Money(self.0 / qty)
        }
    }

    /// Subtraction that never goes below zero.
    #[inline]
    pub fn saturating_sub_zero(self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display with a `Rp` prefix and `.` thousands separators.
///
/// ## Note
/// This is for logs and debugging. The UI owns localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp{}", sign, grouped)
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
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        let money = Money::from_units(1099);
        assert_eq!(money.units(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_units(0).to_string(), "Rp0");
        assert_eq!(Money::from_units(999).to_string(), "Rp999");
        assert_eq!(Money::from_units(1000).to_string(), "Rp1.000");
        assert_eq!(Money::from_units(50_000).to_string(), "Rp50.000");
        assert_eq!(Money::from_units(1_234_567).to_string(), "Rp1.234.567");
        assert_eq!(Money::from_units(-12_500).to_string(), "-Rp12.500");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(1000);
        let b = Money::from_units(500);

        assert_eq!((a + b).units(), 1500);
        assert_eq!((a - b).units(), 500);
        assert_eq!((a * 3).units(), 3000);

        let mut c = a;
        c += b;
        c -= Money::from_units(200);
        assert_eq!(c.units(), 1300);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_units(80), Money::from_units(20)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.units(), 100);
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_units(1).is_positive());
        assert!(Money::from_units(-1).is_negative());
    }

    /// The rounded per-unit figure loses the remainder; callers bill the
    /// package price, not per_unit × qty.
    #[test]
    fn test_per_unit_precision_loss_documented() {
        let package = Money::from_units(100);
        let each = package.per_unit(3);
        assert_eq!(each.units(), 33);
        assert_eq!((package - each * 3).units(), 1);
    }

    #[test]
    fn test_saturating_sub_zero() {
        let a = Money::from_units(300);
        assert_eq!(a.saturating_sub_zero(Money::from_units(500)), Money::zero());
        assert_eq!(a.saturating_sub_zero(Money::from_units(100)).units(), 200);
    }
}
