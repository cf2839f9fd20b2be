//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point precision
//! issues. The currency itself is carried separately by [`CurrencyCode`]; a
//! `Money` value is just the number.
//!
//! [`CurrencyCode`]: super::CurrencyCode

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Represents a monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use splitledger::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// assert_eq!(amount.to_string(), "10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Largest magnitude accepted from text or produced by conversion
    /// (one trillion units)
    pub const MAX: Money = Money(100_000_000_000_000);

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

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "10", "10.5". More than two
    /// decimal places are truncated. Amounts beyond [`Money::MAX`] are
    /// rejected.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();

        let (negative, s) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else {
            (false, s)
        };

        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(MoneyParseError::InvalidFormat(s.to_string()));
        }

        let cents = if s.contains('.') {
            let parts: Vec<&str> = s.split('.').collect();
            if parts.len() != 2 || parts[0].is_empty() {
                return Err(MoneyParseError::InvalidFormat(s.to_string()));
            }

            let units: i64 = parts[0]
                .parse()
                .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?;

            // Pad or truncate cents to 2 digits
            let cents_str = parts[1];
            let cents: i64 = match cents_str.len() {
                0 => 0,
                1 => {
                    cents_str
                        .parse::<i64>()
                        .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?
                        * 10
                }
                _ => cents_str[..2]
                    .parse()
                    .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?,
            };

            units
                .checked_mul(100)
                .and_then(|u| u.checked_add(cents))
                .ok_or_else(|| MoneyParseError::InvalidFormat(s.to_string()))?
        } else {
            s.parse::<i64>()
                .ok()
                .and_then(|u| u.checked_mul(100))
                .ok_or_else(|| MoneyParseError::InvalidFormat(s.to_string()))?
        };

        if cents > Self::MAX.0 {
            return Err(MoneyParseError::OutOfRange(s.to_string()));
        }

        Ok(Self(if negative { -cents } else { cents }))
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Portion of this amount for `weight` out of `total_weight`, rounded
    /// half away from zero to the nearest cent
    ///
    /// `weight` must not exceed `total_weight`.
    pub fn share(&self, weight: u64, total_weight: u64) -> Self {
        if total_weight == 0 {
            return Self::zero();
        }
        let numerator = self.0 as i128 * weight as i128;
        let denominator = total_weight as i128;
        let quotient = numerator / denominator;
        let remainder = numerator % denominator;
        let rounded = if remainder.abs() * 2 >= denominator {
            quotient + numerator.signum()
        } else {
            quotient
        };
        Self(rounded as i64)
    }

    /// Convert to a decimal number of whole units
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Build from a decimal number of whole units, rounding to the nearest cent
    ///
    /// `None` when the result is beyond [`Money::MAX`].
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let cents = value
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()?;
        (cents.checked_abs()? <= Self::MAX.0).then_some(Self(cents))
    }

    /// Multiply by an exchange rate, rounding to the nearest cent
    pub fn convert(&self, rate: Decimal) -> Option<Self> {
        self.to_decimal()
            .checked_mul(rate)
            .and_then(Self::from_decimal)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "{}.{:02}", self.units(), self.cents_part())
        }
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

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    OutOfRange(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::OutOfRange(s) => {
                write!(f, "Amount {} is larger than {}", s, Money::MAX)
            }
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_from_cents() {
        let m = Money::from_cents(1050);
        assert_eq!(m.cents(), 1050);
        assert_eq!(m.units(), 10);
        assert_eq!(m.cents_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1050)), "10.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
        assert_eq!(format!("{}", Money::from_cents(-1050)), "-10.50");
        assert_eq!(format!("{}", Money::from_cents(5)), "0.05");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("10.").unwrap().cents(), 1000);
        assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
        assert_eq!(Money::parse("12.345").unwrap().cents(), 1234);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("$10").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse(".5").is_err());
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(Money::parse("1000000000000").unwrap(), Money::MAX);
        assert_eq!(Money::parse("1000000000000.00").unwrap(), Money::MAX);
        assert_eq!(
            Money::parse("1000000000000.01"),
            Err(MoneyParseError::OutOfRange("1000000000000.01".to_string()))
        );
        assert!(matches!(
            Money::parse("92233720368547758.00"),
            Err(MoneyParseError::OutOfRange(_))
        ));
        assert!(Money::parse("-1000000000000.01").is_err());
    }

    #[test]
    fn test_share_rounding() {
        let hundred = Money::from_cents(10000);
        assert_eq!(hundred.share(1, 2).cents(), 5000);
        assert_eq!(Money::from_cents(9000).share(1, 3).cents(), 3000);
        // 10.00 / 3 = 3.333.. -> 3.33, 2/3 -> 6.67
        assert_eq!(Money::from_cents(1000).share(1, 3).cents(), 333);
        assert_eq!(Money::from_cents(1000).share(2, 3).cents(), 667);
        // 0.05 / 2 = 0.025 -> 0.03 (half away from zero)
        assert_eq!(Money::from_cents(5).share(1, 2).cents(), 3);
        assert_eq!(hundred.share(1, 0), Money::zero());
    }

    #[test]
    fn test_share_with_large_weights() {
        let max = u64::from(u32::MAX);
        assert_eq!(Money::from_cents(10000).share(max, max * 2).cents(), 5000);
        assert_eq!(Money::MAX.share(1, 1), Money::MAX);
    }

    #[test]
    fn test_convert() {
        let yen = Money::from_cents(100000); // 1000.00
        let rate = Decimal::from_str("0.052").unwrap();
        assert_eq!(yen.convert(rate).unwrap().cents(), 5200);

        let odd = Money::from_cents(333);
        let rate = Decimal::from_str("1.5").unwrap();
        // 3.33 * 1.5 = 4.995 -> 5.00
        assert_eq!(odd.convert(rate).unwrap().cents(), 500);

        let huge = Decimal::from_str("1000").unwrap();
        assert_eq!(Money::MAX.convert(huge), None);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);

        let big = Money::from_cents(i64::MAX - 10);
        assert_eq!(big.checked_add(a), None);
        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
        assert_eq!(Money::from_cents(i64::MIN + 10).checked_sub(a), None);
    }
}
