//! In-process blob store

use std::sync::RwLock;

use crate::error::{LedgerError, LedgerResult};

use super::blob::{content_version, version_label, Blob, BlobStore, VersionToken};

/// Blob store that keeps the ledger in memory
///
/// Versions are content hashes, exactly like [`FileBlobStore`].
///
/// [`FileBlobStore`]: super::FileBlobStore
#[derive(Default)]
pub struct MemoryBlobStore {
    blob: RwLock<Option<Blob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing content
    pub fn with_content(content: impl Into<String>) -> Self {
        let content = content.into();
        let version = content_version(&content);
        Self {
            blob: RwLock::new(Some(Blob { content, version })),
        }
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self) -> LedgerResult<Option<Blob>> {
        let blob = self
            .blob
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(blob.clone())
    }

    fn put(&self, content: &str, expected: Option<&VersionToken>) -> LedgerResult<VersionToken> {
        let mut blob = self
            .blob
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let current = blob.as_ref().map(|b| &b.version);
        if current != expected {
            return Err(LedgerError::conflict(
                version_label(expected),
                version_label(current),
            ));
        }

        let version = content_version(content);
        *blob = Some(Blob {
            content: content.to_string(),
            version: version.clone(),
        });
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_leaves_content_unchanged() {
        let store = MemoryBlobStore::with_content("a\n");
        let stale = store.get().unwrap().unwrap().version;

        store.put("a\nb\n", Some(&stale)).unwrap();
        assert!(store.put("x\n", Some(&stale)).unwrap_err().is_conflict());
        assert_eq!(store.get().unwrap().unwrap().content, "a\nb\n");
    }

    #[test]
    fn test_empty_store() {
        let store = MemoryBlobStore::new();
        assert!(store.get().unwrap().is_none());
        store.put("", None).unwrap();
        assert_eq!(store.get().unwrap().unwrap().content, "");
    }
}
