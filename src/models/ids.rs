//! Strongly-typed record identifier
//!
//! Every record written by this crate carries a stable surrogate key so that
//! edits and deletes never have to re-derive identity from mutable fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix used for the short display form (`exp-1a2b3c4d`)
pub const RECORD_ID_PREFIX: &str = "exp-";

/// Stable identifier of one expense record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse an ID from a full UUID string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Check whether a user-supplied reference points at this ID
    ///
    /// Accepts the full UUID, the short display form, or any prefix of the
    /// hyphenated UUID with or without the `exp-` prefix.
    pub fn matches_reference(&self, reference: &str) -> bool {
        let reference = reference.trim();
        let reference = reference.strip_prefix(RECORD_ID_PREFIX).unwrap_or(reference);
        if reference.is_empty() {
            return false;
        }
        self.0
            .hyphenated()
            .to_string()
            .starts_with(&reference.to_ascii_lowercase())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", RECORD_ID_PREFIX, &self.0.to_string()[..8])
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(RECORD_ID_PREFIX).unwrap_or(s);
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = RecordId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("exp-"));
        assert_eq!(display.len(), 12);
    }

    #[test]
    fn test_id_parse() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id = RecordId::parse(uuid_str).unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);

        let prefixed: RecordId = format!("exp-{}", uuid_str).parse().unwrap();
        assert_eq!(prefixed, id);
    }

    #[test]
    fn test_matches_reference() {
        let id = RecordId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();

        assert!(id.matches_reference("exp-550e8400"));
        assert!(id.matches_reference("550E84"));
        assert!(id.matches_reference("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!id.matches_reference("exp-"));
        assert!(!id.matches_reference("660e"));
    }

    #[test]
    fn test_id_serialization() {
        let id = RecordId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
