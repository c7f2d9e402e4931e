//! Type-safe money representation using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tolerance used when comparing a client-claimed amount to a computed one
/// (half a cent).
#[must_use]
pub fn amount_tolerance() -> Decimal {
    Decimal::new(5, 3)
}

/// A monetary amount in the store currency's standard unit (dollars, not cents).
///
/// Serialized as a string with two decimal places (`"12.50"`). Deserializes
/// from either a JSON string or a JSON number, since admin-edited product
/// documents tend to contain both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a money value from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a money value from a count of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Round half-away-from-zero to whole cents.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Whether two amounts agree within [`amount_tolerance`].
    #[must_use]
    pub fn approx_eq(&self, other: Self) -> bool {
        (self.0 - other.0).abs() <= amount_tolerance()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded().0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// ISO 4217 currency codes the store can charge in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_two_places() {
        let json = serde_json::to_string(&Money::from_cents(1250)).unwrap();
        assert_eq!(json, "\"12.50\"");

        let json = serde_json::to_string(&Money::new(Decimal::new(5, 0))).unwrap();
        assert_eq!(json, "\"5.00\"");
    }

    #[test]
    fn test_deserializes_strings_and_numbers() {
        let from_str: Money = serde_json::from_str("\"19.99\"").unwrap();
        let from_num: Money = serde_json::from_str("19.99").unwrap();
        assert_eq!(from_str, Money::from_cents(1999));
        assert_eq!(from_num.rounded(), Money::from_cents(1999));
    }

    #[test]
    fn test_arithmetic() {
        let total: Money = [Money::from_cents(1000) * 2, Money::from_cents(550)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(2550));
    }

    #[test]
    fn test_approx_eq_tolerance() {
        let a = Money::from_cents(2550);
        assert!(a.approx_eq(Money::new(Decimal::new(25_504, 3))));
        assert!(!a.approx_eq(Money::from_cents(2551)));
    }
}
