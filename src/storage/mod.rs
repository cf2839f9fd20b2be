//! Storage layer for splitledger
//!
//! The ledger is one text blob behind the [`BlobStore`] trait; the
//! [`LedgerStore`] adds read-all / append / replace-all on top of it. A local
//! file backend with atomic writes and an in-memory backend are provided.

pub mod blob;
pub mod file_blob;
pub mod file_io;
pub mod init;
pub mod ledger;
pub mod memory;

pub use blob::{content_version, Blob, BlobStore, VersionToken};
pub use file_blob::FileBlobStore;
pub use file_io::{read_text, write_json_atomic, write_text_atomic};
pub use init::initialize_storage;
pub use ledger::{LedgerSnapshot, LedgerStore};
pub use memory::MemoryBlobStore;

use crate::config::{LedgerPaths, Settings};
use crate::error::LedgerError;

/// Ledger stored in the configured local file
pub type FileLedger = LedgerStore<FileBlobStore>;

/// Open the file-backed ledger named in the settings
pub fn open_file_ledger(paths: &LedgerPaths, settings: &Settings) -> Result<FileLedger, LedgerError> {
    paths.ensure_directories()?;
    Ok(LedgerStore::new(FileBlobStore::new(
        settings.ledger_path(paths),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_file_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings::default();

        let ledger = open_file_ledger(&paths, &settings).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!ledger.read_all().unwrap().exists());

        ledger.append("line\n").unwrap();
        let on_disk = std::fs::read_to_string(settings.ledger_path(&paths)).unwrap();
        assert_eq!(on_disk, "line\n");
    }
}
