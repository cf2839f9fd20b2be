//! Ledger store: the only component that talks to the blob
//!
//! Reads hand back the version they observed; every write is guarded by a
//! version so concurrent writers cannot silently overwrite each other. The
//! store never retries on its own.

use tracing::{info, warn};

use crate::error::LedgerResult;

use super::blob::{BlobStore, VersionToken};

/// Full ledger text as of one read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub text: String,
    /// `None` when the ledger has never been written
    pub version: Option<VersionToken>,
}

impl LedgerSnapshot {
    pub fn exists(&self) -> bool {
        self.version.is_some()
    }
}

/// Read-all / append / replace-all on top of a [`BlobStore`]
pub struct LedgerStore<S> {
    blob: S,
}

impl<S: BlobStore> LedgerStore<S> {
    pub fn new(blob: S) -> Self {
        Self { blob }
    }

    /// Fetch the full ledger; an absent blob is an empty ledger
    pub fn read_all(&self) -> LedgerResult<LedgerSnapshot> {
        Ok(match self.blob.get()? {
            Some(blob) => LedgerSnapshot {
                text: blob.content,
                version: Some(blob.version),
            },
            None => LedgerSnapshot::default(),
        })
    }

    /// Append one or more lines to the end of the ledger
    ///
    /// Returns `Conflict` if the ledger changed between the internal read and
    /// the write; the caller decides whether to retry.
    pub fn append(&self, text_to_add: &str) -> LedgerResult<VersionToken> {
        let snapshot = self.read_all()?;

        let mut text = snapshot.text;
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(text_to_add);
        if !text.ends_with('\n') {
            text.push('\n');
        }

        let result = self.blob.put(&text, snapshot.version.as_ref());
        match &result {
            Ok(version) => info!(version = %version.short(), "appended to ledger"),
            Err(e) => warn!(error = %e, "append failed"),
        }
        result
    }

    /// Overwrite the whole ledger, provided it is still at `version`
    pub fn replace_all(
        &self,
        new_text: &str,
        version: Option<&VersionToken>,
    ) -> LedgerResult<VersionToken> {
        let result = self.blob.put(new_text, version);
        match &result {
            Ok(new_version) => info!(version = %new_version.short(), "rewrote ledger"),
            Err(e) => warn!(error = %e, "rewrite failed"),
        }
        result
    }
}
