//! Amount type for representing currency values
//!
//! Amounts are whole currency units (no minor units) stored as i64, so sums
//! and variances are exact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Largest magnitude accepted from users, sheets and the API
pub const MAX_AMOUNT_UNITS: i64 = 1_000_000_000_000;

/// A monetary amount in whole currency units
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// The value in whole currency units
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Whether the magnitude is at most [`MAX_AMOUNT_UNITS`]
    pub const fn is_within_limit(&self) -> bool {
        self.0.unsigned_abs() <= MAX_AMOUNT_UNITS as u64
    }

    /// Returns the amount, or an error when it exceeds [`MAX_AMOUNT_UNITS`]
    pub fn checked_limit(self) -> Result<Self, AmountParseError> {
        if self.is_within_limit() {
            Ok(self)
        } else {
            Err(AmountParseError::OutOfRange(self.0.to_string()))
        }
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Parse a user-entered amount such as `1500`, `-200` or `1 500`
    pub fn parse(s: &str) -> Result<Self, AmountParseError> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',' && *c != '_')
            .collect();

        if cleaned.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let units = cleaned.parse::<i64>().map_err(|e| match e.kind() {
            std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
                AmountParseError::OutOfRange(s.trim().to_string())
            }
            _ => AmountParseError::InvalidFormat(s.trim().to_string()),
        })?;
        Self(units).checked_limit()
    }

    /// Format using the configured currency format
    pub fn format(&self, currency: CurrencyFormat) -> String {
        let digits = group_thousands(self.0.unsigned_abs(), currency.group_separator());
        let sign = if self.0 < 0 { "-" } else { "" };
        match currency {
            CurrencyFormat::Nok => format!("{}{} kr", sign, digits),
            CurrencyFormat::Usd => format!("{}${}", sign, digits),
            CurrencyFormat::Eur => format!("{}{} €", sign, digits),
        }
    }
}

fn group_thousands(value: u64, separator: char) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Self(units)
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

impl<'a> std::iter::Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + *x)
    }
}

/// Error type for amount parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    Empty,
    InvalidFormat(String),
    OutOfRange(String),
}

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Amount cannot be empty"),
            Self::InvalidFormat(s) => write!(f, "Invalid amount '{}': expected a whole number", s),
            Self::OutOfRange(s) => write!(
                f,
                "Amount {} is out of range: at most {} in either direction",
                s, MAX_AMOUNT_UNITS
            ),
        }
    }
}

impl std::error::Error for AmountParseError {}

/// Currency display formats selectable in the configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyFormat {
    #[default]
    Nok,
    Usd,
    Eur,
}

impl CurrencyFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nok => "nok",
            Self::Usd => "usd",
            Self::Eur => "eur",
        }
    }

    fn group_separator(&self) -> char {
        match self {
            Self::Nok => ' ',
            Self::Usd => ',',
            Self::Eur => '.',
        }
    }
}

impl FromStr for CurrencyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nok" => Ok(Self::Nok),
            "usd" => Ok(Self::Usd),
            "eur" => Ok(Self::Eur),
            other => Err(format!(
                "Unknown currency format '{}' (expected nok, usd or eur)",
                other
            )),
        }
    }
}

impl fmt::Display for CurrencyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Amount::new(1500);
        let b = Amount::new(400);
        assert_eq!((a + b).units(), 1900);
        assert_eq!((a - b).units(), 1100);
        assert_eq!((-a).units(), -1500);

        let total: Amount = [a, b, Amount::new(-100)].iter().sum();
        assert_eq!(total, Amount::new(1800));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Amount::parse("1500").unwrap(), Amount::new(1500));
        assert_eq!(Amount::parse(" -200 ").unwrap(), Amount::new(-200));
        assert_eq!(Amount::parse("12 500").unwrap(), Amount::new(12500));
        assert_eq!(Amount::parse("").unwrap_err(), AmountParseError::Empty);
        assert!(matches!(
            Amount::parse("12.50"),
            Err(AmountParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_limit() {
        assert!(Amount::new(MAX_AMOUNT_UNITS).is_within_limit());
        assert!(Amount::new(-MAX_AMOUNT_UNITS).is_within_limit());
        assert!(!Amount::new(MAX_AMOUNT_UNITS + 1).is_within_limit());
        assert!(!Amount::new(i64::MIN).is_within_limit());

        assert!(matches!(
            Amount::parse("1 000 000 000 001"),
            Err(AmountParseError::OutOfRange(_))
        ));
        assert!(matches!(
            Amount::parse("99999999999999999999"),
            Err(AmountParseError::OutOfRange(_))
        ));
        assert_eq!(
            Amount::parse("-1 000 000 000 000").unwrap(),
            Amount::new(-MAX_AMOUNT_UNITS)
        );
    }

    #[test]
    fn test_currency_formatting() {
        let amount = Amount::new(1234567);
        assert_eq!(amount.format(CurrencyFormat::Nok), "1 234 567 kr");
        assert_eq!(amount.format(CurrencyFormat::Usd), "$1,234,567");
        assert_eq!(amount.format(CurrencyFormat::Eur), "1.234.567 €");
        assert_eq!(Amount::new(-950).format(CurrencyFormat::Usd), "-$950");
        assert_eq!(Amount::zero().format(CurrencyFormat::Nok), "0 kr");
    }

    #[test]
    fn test_currency_format_parse() {
        assert_eq!("NOK".parse::<CurrencyFormat>().unwrap(), CurrencyFormat::Nok);
        assert_eq!("usd".parse::<CurrencyFormat>().unwrap(), CurrencyFormat::Usd);
        assert!("gbp".parse::<CurrencyFormat>().is_err());
    }
}
