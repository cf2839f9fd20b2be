//! Storage initialization
//!
//! Handles first-run setup: directories, an empty ledger and a rates table.

use crate::config::{LedgerPaths, Settings};
use crate::error::LedgerError;
use crate::rates::RatesTable;

use super::blob::BlobStore;
use super::file_blob::FileBlobStore;
use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Existing ledger and rates files are left untouched.
pub fn initialize_storage(paths: &LedgerPaths, settings: &Settings) -> Result<(), LedgerError> {
    paths.ensure_directories()?;

    let ledger = FileBlobStore::new(settings.ledger_path(paths));
    if ledger.get()?.is_none() {
        ledger.put("", None)?;
    }

    if !paths.rates_file().exists() {
        write_json_atomic(
            paths.rates_file(),
            &RatesTable::new(settings.base_currency.clone()),
        )?;
    }

    Ok(())
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &LedgerPaths, settings: &Settings) -> bool {
    !settings.ledger_path(paths).exists()
}
