//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) so every balance and aggregate is
//! computed with exact integer arithmetic. Formatting follows the Brazilian
//! convention (`R$ 1.234,56`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use thiserror::Error;

/// Represents a monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount a single monetary field accepts: 14 digits, 2 of
    /// them decimal (R$ 999.999.999.999,99)
    pub const MAX: Money = Money(99_999_999_999_999);

    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use convenios::models::Money;
    /// let amount = Money::from_cents(1050); // R$ 10,50
    /// assert_eq!(amount.to_string(), "R$ 10,50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole units and cents
    pub const fn from_units_cents(units: i64, cents: i64) -> Self {
        Self(units * 100 + cents)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole units portion (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Whether the amount fits in a monetary field (`|amount| <= MAX`)
    pub const fn is_within_limit(&self) -> bool {
        self.0 >= -Self::MAX.0 && self.0 <= Self::MAX.0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Total of many amounts; fails instead of wrapping around
    pub fn checked_sum<I>(amounts: I) -> Result<Self, MoneyOverflow>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Self::zero(), |acc, m| acc.checked_add(m).ok_or(MoneyOverflow))
    }

    /// Lossy conversion for chart scaling and JSON numbers
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Convert a decimal number with at most two fractional digits
    pub fn from_f64(value: f64) -> Result<Self, MoneyParseError> {
        if !value.is_finite() {
            return Err(MoneyParseError::InvalidFormat(value.to_string()));
        }
        let scaled = value * 100.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-3 {
            return Err(MoneyParseError::TooManyDecimals(value.to_string()));
        }
        if rounded.abs() >= i64::MAX as f64 {
            return Err(MoneyParseError::InvalidFormat(value.to_string()));
        }
        Ok(Self(rounded as i64))
    }

    /// Parse a money amount from a string
    ///
    /// Accepts `"1234.56"`, `"1.234,56"`, `"1234,5"`, `"R$ 1.234,56"`,
    /// `"-10"`. A comma marks the decimal separator and turns dots into
    /// thousands separators; without a comma the dot is the decimal separator.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let original = s;
        let s = s.trim();

        let (negative, s) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped.trim_start()),
            None => (false, s),
        };

        let s = s.strip_prefix("R$").unwrap_or(s).trim();
        let invalid = || MoneyParseError::InvalidFormat(original.to_string());

        let (int_part, frac_part) = if s.contains(',') {
            let without_thousands: String = s.chars().filter(|c| *c != '.').collect();
            let mut parts = without_thousands.splitn(2, ',');
            let int_part = parts.next().unwrap_or_default().to_string();
            let frac_part = parts.next().unwrap_or_default().to_string();
            (int_part, frac_part)
        } else if let Some((int_part, frac_part)) = s.split_once('.') {
            (int_part.to_string(), frac_part.to_string())
        } else {
            (s.to_string(), String::new())
        };

        if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac_part.len() > 2 {
            return Err(MoneyParseError::TooManyDecimals(original.to_string()));
        }

        let units: i64 = int_part.parse().map_err(|_| invalid())?;
        let cents: i64 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac_part.parse().map_err(|_| invalid())?,
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -total } else { total }))
    }

    /// Format without a currency symbol (`1.234,56`)
    pub fn format_plain(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!(
            "{}{},{:02}",
            sign,
            group_thousands(self.units().unsigned_abs()),
            self.cents_part()
        )
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!(
            "{}{} {},{:02}",
            sign,
            symbol,
            group_thousands(self.units().unsigned_abs()),
            self.cents_part()
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.format_with_symbol("R$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("Invalid money format: {0}")]
    InvalidFormat(String),
    #[error("Money amount has more than 2 decimal places: {0}")]
    TooManyDecimals(String),
}

/// A monetary total left the representable range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Money total out of range")]
pub struct MoneyOverflow;

/// Serde adapter for API payloads: amounts travel as decimal numbers
/// (`1500.0`) and are accepted either as numbers or as strings.
pub mod decimal {
    use super::Money;
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }

    struct MoneyVisitor;

    impl<'de> Visitor<'de> for MoneyVisitor {
        type Value = Money;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a decimal amount as number or string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
            v.checked_mul(100)
                .map(Money::from_cents)
                .ok_or_else(|| E::custom("amount out of range"))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
            i64::try_from(v)
                .map_err(|_| E::custom("amount out of range"))
                .and_then(|v| self.visit_i64(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
            Money::from_f64(v).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
            Money::parse(v).map_err(E::custom)
        }
    }
}
