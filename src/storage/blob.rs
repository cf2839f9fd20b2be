//! The versioned blob contract the ledger is stored behind
//!
//! Any object store that can hand back a version token with each read and
//! refuse a write whose expected version no longer matches can hold a ledger.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

use crate::error::LedgerResult;

/// Opaque identifier of one state of a blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for messages
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(12)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Version token derived from content: the git blob hash
/// (`sha1("blob <len>\0" + content)`)
pub fn content_version(content: &str) -> VersionToken {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content.as_bytes());
    VersionToken(hex::encode(hasher.finalize()))
}

/// A blob's content together with the version it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content: String,
    pub version: VersionToken,
}

/// Storage for a single text blob with optimistic-concurrency writes
pub trait BlobStore {
    /// Fetch the current content, or `None` if the blob does not exist
    fn get(&self) -> LedgerResult<Option<Blob>>;

    /// Replace the content if the blob is still at `expected`
    ///
    /// `expected == None` means the blob must not exist yet. A mismatch
    /// returns [`LedgerError::Conflict`] and leaves the blob untouched.
    ///
    /// [`LedgerError::Conflict`]: crate::error::LedgerError::Conflict
    fn put(&self, content: &str, expected: Option<&VersionToken>) -> LedgerResult<VersionToken>;
}

/// Label used in conflict messages for "no version"
pub(crate) fn version_label(version: Option<&VersionToken>) -> String {
    match version {
        Some(v) => v.short().to_string(),
        None => "<absent>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_version_matches_git() {
        // `printf 'hello\n' | git hash-object --stdin`
        assert_eq!(
            content_version("hello\n").as_str(),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
        // empty blob
        assert_eq!(
            content_version("").as_str(),
            "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391"
        );
    }

    #[test]
    fn test_short_and_label() {
        let token = content_version("abc");
        assert_eq!(token.short().len(), 12);
        assert_eq!(version_label(None), "<absent>");
        assert_eq!(version_label(Some(&token)), token.short());
    }
}
