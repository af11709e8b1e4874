//! Money type for representing currency amounts
//!
//! Amounts are stored as integer minor units (hundredths) together with a
//! three letter currency code. Parsing requires exactly two fractional digits;
//! combining amounts of different currencies is an error.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

/// A three letter ISO 4217 currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency([u8; 3]);

impl Currency {
    pub const CHF: Currency = Currency(*b"CHF");

    /// Parse a currency code (three ASCII letters, case-insensitive)
    pub fn parse(code: &str) -> Result<Self, MoneyParseError> {
        let code = code.trim();
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(MoneyParseError::InvalidCurrency(code.to_string()));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    pub fn code(&self) -> &str {
        // Only ASCII letters are ever stored
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::CHF
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

/// A monetary amount in minor units of a single currency
///
/// Serialized as `"120.00 CHF"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Create a Money amount from minor units
    pub const fn from_minor(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Create a Money amount from whole units and hundredths
    pub const fn from_units(units: i64, hundredths: i64, currency: Currency) -> Self {
        Self {
            minor: units * 100 + hundredths,
            currency,
        }
    }

    /// Shorthand for amounts in Swiss francs
    pub const fn chf(minor: i64) -> Self {
        Self::from_minor(minor, Currency::CHF)
    }

    /// A zero amount in the given currency
    pub const fn zero(currency: Currency) -> Self {
        Self::from_minor(0, currency)
    }

    pub const fn minor(&self) -> i64 {
        self.minor
    }

    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Whole units portion (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.minor / 100
    }

    /// Hundredths portion (0-99)
    pub const fn hundredths(&self) -> i64 {
        (self.minor % 100).abs()
    }

    pub const fn abs(&self) -> Self {
        Self::from_minor(self.minor.abs(), self.currency)
    }

    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.minor > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Parse the serialized form `"<units>.<cc> <CODE>"`
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();
        let (amount, code) = s
            .rsplit_once(' ')
            .ok_or_else(|| MoneyParseError::MissingCurrency(s.to_string()))?;
        let currency = Currency::parse(code)?;
        Self::parse_dot_notation(amount, currency)
    }

    /// Parse a bare `x.yy` amount in the given currency.
    ///
    /// Exactly two fractional digits are required, an optional leading minus
    /// sign is accepted.
    pub fn parse_dot_notation(s: &str, currency: Currency) -> Result<Self, MoneyParseError> {
        let s = s.trim();
        let invalid = || MoneyParseError::InvalidFormat(s.to_string());

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (units, fraction) = digits.split_once('.').ok_or_else(invalid)?;
        if fraction.len() != 2 {
            return Err(MoneyParseError::FractionDigits(s.to_string()));
        }
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(units) || !all_digits(fraction) {
            return Err(invalid());
        }

        let units: i64 = units.parse().map_err(|_| invalid())?;
        let hundredths: i64 = fraction.parse().map_err(|_| invalid())?;
        let minor = units
            .checked_mul(100)
            .and_then(|m| m.checked_add(hundredths))
            .ok_or_else(invalid)?;

        Ok(Self::from_minor(if negative { -minor } else { minor }, currency))
    }

    /// Add two amounts of the same currency
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyParseError> {
        self.ensure_same_currency(&other)?;
        Ok(Self::from_minor(self.minor + other.minor, self.currency))
    }

    /// Subtract two amounts of the same currency
    pub fn checked_sub(self, other: Self) -> Result<Self, MoneyParseError> {
        self.ensure_same_currency(&other)?;
        Ok(Self::from_minor(self.minor - other.minor, self.currency))
    }

    /// Compare two amounts of the same currency
    pub fn checked_cmp(&self, other: &Self) -> Result<Ordering, MoneyParseError> {
        self.ensure_same_currency(other)?;
        Ok(self.minor.cmp(&other.minor))
    }

    fn ensure_same_currency(&self, other: &Self) -> Result<(), MoneyParseError> {
        if self.currency != other.currency {
            return Err(MoneyParseError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }

    /// Format for a ledger posting: `CHF120` when integral, `CHF120.50`
    /// otherwise, with the sign in front of the currency code.
    pub fn ledger_format(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        if self.hundredths() == 0 {
            format!("{}{}{}", sign, self.currency, self.units().abs())
        } else {
            format!(
                "{}{}{}.{:02}",
                sign,
                self.currency,
                self.units().abs(),
                self.hundredths()
            )
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02} {}",
            sign,
            self.units().abs(),
            self.hundredths(),
            self.currency
        )
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_minor(-self.minor, self.currency)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

/// Error type for money parsing and arithmetic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    FractionDigits(String),
    MissingCurrency(String),
    InvalidCurrency(String),
    CurrencyMismatch { left: Currency, right: Currency },
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => write!(f, "invalid money format: {}", s),
            Self::FractionDigits(s) => {
                write!(f, "amount {} must have exactly two fractional digits", s)
            }
            Self::MissingCurrency(s) => write!(f, "amount {} has no currency code", s),
            Self::InvalidCurrency(s) => write!(f, "invalid currency code: {}", s),
            Self::CurrencyMismatch { left, right } => {
                write!(f, "cannot combine amounts in {} and {}", left, right)
            }
        }
    }
}

impl std::error::Error for MoneyParseError {}

impl From<MoneyParseError> for crate::error::AccError {
    fn from(err: MoneyParseError) -> Self {
        match err {
            MoneyParseError::CurrencyMismatch { left, right } => Self::CurrencyMismatch {
                left: left.to_string(),
                right: right.to_string(),
            },
            other => Self::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        let m = Money::from_units(10, 50, Currency::CHF);
        assert_eq!(m.minor(), 1050);
        assert_eq!(m.units(), 10);
        assert_eq!(m.hundredths(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::chf(12000).to_string(), "120.00 CHF");
        assert_eq!(Money::chf(5).to_string(), "0.05 CHF");
        assert_eq!(Money::chf(-1050).to_string(), "-10.50 CHF");
    }

    #[test]
    fn test_parse_dot_notation_requires_two_digits() {
        assert_eq!(
            Money::parse_dot_notation("120.00", Currency::CHF).unwrap(),
            Money::chf(12000)
        );
        assert_eq!(
            Money::parse_dot_notation("-0.05", Currency::CHF).unwrap(),
            Money::chf(-5)
        );
        assert!(matches!(
            Money::parse_dot_notation("120.5", Currency::CHF),
            Err(MoneyParseError::FractionDigits(_))
        ));
        assert!(Money::parse_dot_notation("120", Currency::CHF).is_err());
        assert!(Money::parse_dot_notation("12a.00", Currency::CHF).is_err());
        assert!(Money::parse_dot_notation(".50", Currency::CHF).is_err());
    }

    #[test]
    fn test_parse_with_currency() {
        let m = Money::parse("42.00 eur").unwrap();
        assert_eq!(m.minor(), 4200);
        assert_eq!(m.currency().code(), "EUR");
        assert!(matches!(
            Money::parse("42.00"),
            Err(MoneyParseError::MissingCurrency(_))
        ));
        assert!(Money::parse("42.00 EURO").is_err());
    }

    #[test]
    fn test_mixed_currency_arithmetic_fails() {
        let chf = Money::chf(100);
        let eur = Money::from_minor(100, Currency::parse("EUR").unwrap());
        assert!(chf.checked_add(eur).is_err());
        assert!(chf.checked_cmp(&eur).is_err());
        assert_eq!(chf.checked_add(chf).unwrap(), Money::chf(200));
        assert_eq!(chf.checked_sub(chf).unwrap(), Money::chf(0));
    }

    #[test]
    fn test_ledger_format() {
        assert_eq!(Money::chf(12000).ledger_format(), "CHF120");
        assert_eq!(Money::chf(12050).ledger_format(), "CHF120.50");
        assert_eq!((-Money::chf(12000)).ledger_format(), "-CHF120");
        assert_eq!(Money::chf(-5).ledger_format(), "-CHF0.05");
    }

    #[test]
    fn test_serde_string_form() {
        let yaml = serde_yaml::to_string(&Money::chf(200000)).unwrap();
        assert_eq!(yaml.trim(), "2000.00 CHF");
        let back: Money = serde_yaml::from_str("2000.00 CHF").unwrap();
        assert_eq!(back, Money::chf(200000));
        assert!(serde_yaml::from_str::<Money>("2000.0 CHF").is_err());
    }
}
