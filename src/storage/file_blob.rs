//! Ledger blob kept in a local file
//!
//! The version token is the git blob hash of the file content, so a file
//! synced from a git-hosted repository carries the same version the hosting
//! service reports for it.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};

use super::blob::{content_version, version_label, Blob, BlobStore, VersionToken};
use super::file_io::{read_text, write_text_atomic};

/// Blob store backed by a single text file
pub struct FileBlobStore {
    path: PathBuf,
    /// Serializes check-then-write within this process
    write_lock: Mutex<()>,
}

impl FileBlobStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self) -> LedgerResult<Option<Blob>> {
        Ok(read_text(&self.path)?.map(|content| {
            let version = content_version(&content);
            Blob { content, version }
        }))
    }

    fn put(&self, content: &str, expected: Option<&VersionToken>) -> LedgerResult<VersionToken> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let current = read_text(&self.path)?.map(|c| content_version(&c));
        if current.as_ref() != expected {
            warn!(
                path = %self.path.display(),
                expected = %version_label(expected),
                actual = %version_label(current.as_ref()),
                "rejecting stale ledger write"
            );
            return Err(LedgerError::conflict(
                version_label(expected),
                version_label(current.as_ref()),
            ));
        }

        write_text_atomic(&self.path, content)?;
        let version = content_version(content);
        debug!(path = %self.path.display(), version = %version.short(), "ledger file written");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(temp_dir.path().join("ledger.txt"));

        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_create_then_update() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(temp_dir.path().join("ledger.txt"));

        let v1 = store.put("one\n", None).unwrap();
        let blob = store.get().unwrap().unwrap();
        assert_eq!(blob.content, "one\n");
        assert_eq!(blob.version, v1);

        let v2 = store.put("one\ntwo\n", Some(&v1)).unwrap();
        assert_ne!(v1, v2);
        assert_eq!(store.get().unwrap().unwrap().content, "one\ntwo\n");
    }

    #[test]
    fn test_stale_version_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(temp_dir.path().join("ledger.txt"));

        let v1 = store.put("one\n", None).unwrap();
        store.put("one\ntwo\n", Some(&v1)).unwrap();

        let err = store.put("clobbered\n", Some(&v1)).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.get().unwrap().unwrap().content, "one\ntwo\n");

        // creating over an existing file is also a conflict
        assert!(store.put("new\n", None).unwrap_err().is_conflict());
    }

    #[test]
    fn test_external_edit_detected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.txt");
        let store = FileBlobStore::new(path.clone());

        let v1 = store.put("one\n", None).unwrap();
        std::fs::write(&path, "edited elsewhere\n").unwrap();

        assert!(store.put("one\ntwo\n", Some(&v1)).unwrap_err().is_conflict());
    }
}
