//! ISO-style three-letter currency codes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A currency code: exactly three ASCII uppercase letters (e.g. `HKD`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a currency code, accepting lowercase input
    pub fn parse(s: &str) -> Result<Self, CurrencyCodeError> {
        let s = s.trim();
        if s.len() == 3 && s.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(s.to_ascii_uppercase()))
        } else {
            Err(CurrencyCodeError(s.to_string()))
        }
    }

    /// Build a code from a literal known to be valid
    pub fn from_static(code: &'static str) -> Self {
        debug_assert!(Self::parse(code).is_ok(), "invalid currency literal {}", code);
        Self(code.to_ascii_uppercase())
    }

    /// Map a currency symbol or code found on a receipt to a code
    ///
    /// Returns `None` when the text is neither a known symbol nor a valid code.
    pub fn from_symbol_or_code(s: &str) -> Option<Self> {
        let s = s.trim();
        let code = match s {
            "HK$" => "HKD",
            "US$" | "$" => "USD",
            "€" => "EUR",
            "£" => "GBP",
            "¥" | "円" => "JPY",
            "NT$" => "TWD",
            "₩" => "KRW",
            _ => return Self::parse(s).ok(),
        };
        Some(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Error returned for text that is not a three-letter code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyCodeError(pub String);

impl fmt::Display for CurrencyCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid currency code '{}': expected three letters", self.0)
    }
}

impl std::error::Error for CurrencyCodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(CurrencyCode::parse("hkd").unwrap().as_str(), "HKD");
        assert_eq!(CurrencyCode::parse(" JPY ").unwrap().as_str(), "JPY");
        assert!(CurrencyCode::parse("HK").is_err());
        assert!(CurrencyCode::parse("HKDX").is_err());
        assert!(CurrencyCode::parse("H1D").is_err());
    }

    #[test]
    fn test_symbols() {
        assert_eq!(CurrencyCode::from_symbol_or_code("¥").unwrap().as_str(), "JPY");
        assert_eq!(CurrencyCode::from_symbol_or_code("HK$").unwrap().as_str(), "HKD");
        assert_eq!(CurrencyCode::from_symbol_or_code("twd").unwrap().as_str(), "TWD");
        assert!(CurrencyCode::from_symbol_or_code("dollars").is_none());
    }

    #[test]
    fn test_serde() {
        let code = CurrencyCode::parse("EUR").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"EUR\"");
        let back: CurrencyCode = serde_json::from_str("\"eur\"").unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<CurrencyCode>("\"EURO\"").is_err());
    }
}
