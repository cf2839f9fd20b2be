//! The two fixed parties that share expenses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two parties a name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// The other party
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// The closed set of known payers
///
/// Split weights are always expressed as (first, second) in this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parties {
    pub first: String,
    pub second: String,
}

impl Parties {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Find the side for a payer name (case-insensitive, trimmed)
    pub fn side_of(&self, name: &str) -> Option<Side> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(self.first.trim()) {
            Some(Side::First)
        } else if name.eq_ignore_ascii_case(self.second.trim()) {
            Some(Side::Second)
        } else {
            None
        }
    }

    /// The configured name for a side
    pub fn name(&self, side: Side) -> &str {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    /// Resolve user input to the canonical configured name
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.side_of(name).map(|side| self.name(side))
    }

    /// Check that both names are usable and distinct
    pub fn validate(&self) -> Result<(), String> {
        let first = self.first.trim();
        let second = self.second.trim();
        if first.is_empty() || second.is_empty() {
            return Err("Party names cannot be empty".into());
        }
        if first.eq_ignore_ascii_case(second) {
            return Err(format!("Party names must differ (both are '{}')", first));
        }
        Ok(())
    }
}

impl Default for Parties {
    fn default() -> Self {
        Self::new("Alice", "Bob")
    }
}

impl fmt::Display for Parties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} & {}", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_of() {
        let parties = Parties::new("Iverson", "Kate");
        assert_eq!(parties.side_of("iverson"), Some(Side::First));
        assert_eq!(parties.side_of(" Kate "), Some(Side::Second));
        assert_eq!(parties.side_of("Mallory"), None);
        assert_eq!(parties.canonical("KATE"), Some("Kate"));
        assert_eq!(Side::First.other(), Side::Second);
    }

    #[test]
    fn test_validate() {
        assert!(Parties::default().validate().is_ok());
        assert!(Parties::new("A", " ").validate().is_err());
        assert!(Parties::new("Sam", "sam").validate().is_err());
    }
}
