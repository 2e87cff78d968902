//! # Weight Module
//!
//! Provides the `Weight` type: quantity-on-hand in integer grams.
//!
//! Fresco sells by weight. The original scales report kilograms with two or
//! three decimals, which are exact in grams - so weights get the same
//! treatment money gets: a signed integer in the smallest unit, and the sum
//! of a product's ledger entries replayed from zero is bit-for-bit equal to
//! its balance. No float ever touches a stock quantity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A weight in grams.
///
/// Signed so that ledger deltas (removals, sales) can be expressed
/// directly; an on-hand balance is never allowed to go negative, but that
/// is the ledger's invariant, not this type's.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Weight(i64);

impl Weight {
    /// Creates a weight from grams.
    #[inline]
    pub const fn from_grams(grams: i64) -> Self {
        Weight(grams)
    }

    /// Returns the value in grams.
    #[inline]
    pub const fn grams(&self) -> i64 {
        self.0
    }

    /// Returns the whole-kilogram portion.
    #[inline]
    pub const fn kilos(&self) -> i64 {
        self.0 / 1000
    }

    /// Zero weight.
    #[inline]
    pub const fn zero() -> Self {
        Weight(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Weight(self.0.abs())
    }
}

/// Displays as kilograms with three decimals, e.g. `2.000 kg`.
impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:03} kg", sign, self.kilos().abs(), (self.0 % 1000).abs())
    }
}

impl Add for Weight {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Weight(self.0 + other.0)
    }
}

impl AddAssign for Weight {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Weight {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Weight(self.0 - other.0)
    }
}

impl SubAssign for Weight {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Weight {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Weight(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_grams() {
        let w = Weight::from_grams(1500);
        assert_eq!(w.grams(), 1500);
        assert_eq!(w.kilos(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Weight::from_grams(2000)), "2.000 kg");
        assert_eq!(format!("{}", Weight::from_grams(1500)), "1.500 kg");
        assert_eq!(format!("{}", Weight::from_grams(-250)), "-0.250 kg");
    }

    #[test]
    fn test_arithmetic() {
        let a = Weight::from_grams(2000);
        let b = Weight::from_grams(500);

        assert_eq!((a + b).grams(), 2500);
        assert_eq!((a - b).grams(), 1500);
        assert_eq!((-b).grams(), -500);
    }
}
