//! How a shared expense is divided between the two parties

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Split policy recorded on every expense
///
/// Weighted counts are people on each side, in (first party, second party)
/// order. Neither count may be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum SplitPolicy {
    /// 50/50
    #[default]
    Equal,
    /// Proportional to head counts
    Weighted { first: u32, second: u32 },
}

impl SplitPolicy {
    /// Create a weighted split, rejecting zero counts
    pub fn weighted(first: u32, second: u32) -> Result<Self, SplitParseError> {
        if first == 0 || second == 0 {
            return Err(SplitParseError(format!(
                "{}:{} (each side needs at least one person)",
                first, second
            )));
        }
        Ok(Self::Weighted { first, second })
    }

    /// The (first, second) weights this policy applies
    pub fn weights(&self) -> (u32, u32) {
        match self {
            Self::Equal => (1, 1),
            Self::Weighted { first, second } => (*first, *second),
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "Equal"),
            Self::Weighted { first, second } => write!(f, "{}:{}", first, second),
        }
    }
}

impl FromStr for SplitPolicy {
    type Err = SplitParseError;

    /// Accepts `Equal` or `a:b` with both counts at least one
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("equal") {
            return Ok(Self::Equal);
        }
        let (a, b) = s
            .split_once(':')
            .ok_or_else(|| SplitParseError(s.to_string()))?;
        let first = a
            .trim()
            .parse::<u32>()
            .map_err(|_| SplitParseError(s.to_string()))?;
        let second = b
            .trim()
            .parse::<u32>()
            .map_err(|_| SplitParseError(s.to_string()))?;
        Self::weighted(first, second)
    }
}

/// Error for an unusable split specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitParseError(pub String);

impl fmt::Display for SplitParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid split '{}': use 'Equal' or counts like '1:2'", self.0)
    }
}

impl std::error::Error for SplitParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("equal".parse::<SplitPolicy>().unwrap(), SplitPolicy::Equal);
        assert_eq!(
            "1:2".parse::<SplitPolicy>().unwrap(),
            SplitPolicy::Weighted { first: 1, second: 2 }
        );
        assert!("0:3".parse::<SplitPolicy>().is_err());
        assert!("3".parse::<SplitPolicy>().is_err());
        assert!("a:b".parse::<SplitPolicy>().is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        let split = SplitPolicy::weighted(2, 3).unwrap();
        assert_eq!(split.to_string(), "2:3");
        assert_eq!(split.to_string().parse::<SplitPolicy>().unwrap(), split);
        assert_eq!(SplitPolicy::Equal.weights(), (1, 1));
    }
}
