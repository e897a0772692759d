//! Rand amounts held in integer minor units.
//!
//! All cart arithmetic happens on cents so that summing `19.99 * 3` never
//! drifts. Decimal values only appear at the edges: parsing a price from the
//! product surface, and formatting a total for display.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Currency prefix used for display.
pub const CURRENCY_PREFIX: &str = "R";

/// Errors that can occur when parsing a [`Money`] amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input string is empty once prefix and grouping are stripped.
    #[error("amount cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
    /// The amount does not fit in minor units.
    #[error("amount out of range")]
    OutOfRange,
}

/// A monetary amount in cents.
///
/// ## Examples
///
/// ```
/// use chloes_boutique_core::Money;
///
/// let price: Money = "R1,299.50".parse().unwrap();
/// assert_eq!(price.cents(), 129_950);
/// assert_eq!(price.to_plain_string(), "1299.50");
/// assert_eq!(price.to_string(), "R1,299.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Zero rand.
    pub const ZERO: Self = Self(0);

    /// Create an amount from minor units.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Get the amount in minor units.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Create an amount from a decimal, rounding half away from zero to cents.
    ///
    /// Returns `None` if the amount does not fit in minor units.
    #[must_use]
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Self)
    }

    /// Create an amount from a float, going through its shortest decimal form.
    #[must_use]
    pub fn from_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        Decimal::from_f64(amount).and_then(Self::from_decimal)
    }

    /// Parse an amount from display or attribute text.
    ///
    /// Accepts an optional `R` prefix, surrounding whitespace and comma
    /// grouping: `"19.99"`, `"R19.99"` and `"R 1,299.00"` all parse.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing numeric remains, the text is not a decimal
    /// number, or the amount overflows minor units.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let trimmed = s.trim();
        let unprefixed = trimmed.strip_prefix(CURRENCY_PREFIX).unwrap_or(trimmed);
        let cleaned: String = unprefixed
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .collect();

        if cleaned.is_empty() {
            return Err(MoneyError::Empty);
        }

        let amount = Decimal::from_str(&cleaned)
            .or_else(|_| Decimal::from_scientific(&cleaned))
            .map_err(|_| MoneyError::Invalid(s.to_owned()))?;
        Self::from_decimal(amount).ok_or(MoneyError::OutOfRange)
    }

    /// The amount as a decimal with two fractional digits.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Two-digit decimal text without prefix or grouping, e.g. `"69.97"`.
    #[must_use]
    pub fn to_plain_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }

    /// Multiply by a quantity, saturating on overflow.
    #[must_use]
    pub const fn times(self, qty: u32) -> Self {
        Self(self.0.saturating_mul(qty as i64))
    }

    /// Add two amounts, saturating on overflow.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Returns true if the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Group the integer part with commas: `1299` becomes `1,299`.
fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

impl fmt::Display for Money {
    /// Display form with currency prefix and grouping, e.g. `R1,299.00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{sign}{CURRENCY_PREFIX}{}.{:02}",
            group_thousands(abs / 100),
            abs % 100
        )
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Money {
    /// Serialized as a JSON number in major units, shortest float form (`19.99`, `50.0`).
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[allow(clippy::cast_precision_loss)] // display value only, arithmetic stays in cents
        let major = self.0 as f64 / 100.0;
        serializer.serialize_f64(major)
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a numeric amount or numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .ok()
            .and_then(|whole| whole.checked_mul(100))
            .map(Money)
            .ok_or_else(|| E::custom(MoneyError::OutOfRange))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom(MoneyError::OutOfRange))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_f64(v).ok_or_else(|| E::custom(MoneyError::OutOfRange))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_plain_and_prefixed() {
        assert_eq!(Money::parse("19.99").unwrap(), Money::from_cents(1999));
        assert_eq!(Money::parse("R19.99").unwrap(), Money::from_cents(1999));
        assert_eq!(Money::parse(" R 1,299.00 ").unwrap(), Money::from_cents(129_900));
        assert_eq!(Money::parse("100").unwrap(), Money::from_cents(10_000));
    }

    #[test]
    fn test_parse_rounds_to_cents() {
        assert_eq!(Money::parse("1.005").unwrap(), Money::from_cents(101));
        assert_eq!(Money::parse("0.004").unwrap(), Money::ZERO);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Money::parse(""), Err(MoneyError::Empty));
        assert_eq!(Money::parse("R"), Err(MoneyError::Empty));
        assert!(matches!(Money::parse("abc"), Err(MoneyError::Invalid(_))));
    }

    #[test]
    fn test_huge_amounts_are_out_of_range() {
        assert_eq!(Money::parse("1e28"), Err(MoneyError::OutOfRange));
        assert_eq!(Money::from_decimal(Decimal::MAX), None);
        assert_eq!(Money::from_f64(1e28), None);
        assert!(serde_json::from_str::<Money>("1e28").is_err());
        assert!(serde_json::from_str::<Money>(r#""1e28""#).is_err());
    }

    #[test]
    fn test_from_f64_avoids_binary_drift() {
        assert_eq!(Money::from_f64(19.99).unwrap().cents(), 1999);
        assert_eq!(Money::from_f64(0.1 + 0.2).unwrap().cents(), 30);
        assert!(Money::from_f64(f64::NAN).is_none());
        assert!(Money::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Money::from_decimal(dec!(5.00)).unwrap().cents(), 500);
        assert_eq!(Money::from_decimal(dec!(2.345)).unwrap().cents(), 235);
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(Money::from_cents(6997).to_plain_string(), "69.97");
        assert_eq!(Money::ZERO.to_plain_string(), "0.00");
        assert_eq!(Money::from_cents(5).to_plain_string(), "0.05");
        assert_eq!(Money::from_cents(-250).to_plain_string(), "-2.50");
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_cents(3000).to_string(), "R30.00");
        assert_eq!(Money::from_cents(129_900).to_string(), "R1,299.00");
        assert_eq!(Money::from_cents(123_456_789).to_string(), "R1,234,567.89");
        assert_eq!(Money::ZERO.to_string(), "R0.00");
    }

    #[test]
    fn test_times_and_sum() {
        let price = Money::from_cents(1999);
        assert_eq!(price.times(3), Money::from_cents(5997));
        let total: Money = [price.times(3), Money::from_cents(500).times(2)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(6997));
    }

    #[test]
    fn test_times_saturates() {
        assert_eq!(Money::from_cents(i64::MAX).times(2).cents(), i64::MAX);
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Money::from_cents(1999).to_decimal(), dec!(19.99));
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&Money::from_cents(1999)).unwrap(), "19.99");
        assert_eq!(serde_json::to_string(&Money::from_cents(5000)).unwrap(), "50.0");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let amounts: Vec<Money> = serde_json::from_str(r#"[50, 19.99, "5.00", "R1,000"]"#).unwrap();
        let cents: Vec<i64> = amounts.into_iter().map(Money::cents).collect();
        assert_eq!(cents, vec![5000, 1999, 500, 100_000]);
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert!(serde_json::from_str::<Money>(r#""free""#).is_err());
        assert!(serde_json::from_str::<Money>("null").is_err());
    }
}
