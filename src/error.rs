//! Custom error types for splitledger
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for splitledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// More than one ledger line matched a record key
    #[error("{count} records match '{identifier}'")]
    AmbiguousRecord { identifier: String, count: usize },

    /// The ledger changed between read and write
    #[error("Ledger changed since it was read (expected version {expected}, found {actual})")]
    Conflict { expected: String, actual: String },

    /// Exchange rate lookup failed
    #[error("Exchange rate unavailable for {from} -> {to}: {reason}")]
    RateUnavailable {
        from: String,
        to: String,
        reason: String,
    },

    /// Receipt extraction failed or returned unusable data
    #[error("Receipt extraction failed: {0}")]
    Ocr(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl LedgerError {
    /// Create a "not found" error for expense records
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Record",
            identifier: identifier.into(),
        }
    }

    /// Create a conflict error from the two version labels
    pub fn conflict(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Conflict {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a version conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// What the user can do about this error, if anything
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Conflict { .. } => {
                Some("Someone else changed the ledger. Run 'splitledger history' and retry.")
            }
            Self::NotFound { .. } => {
                Some("The record may have been edited or deleted. Refresh the history and retry.")
            }
            Self::AmbiguousRecord { .. } => {
                Some("Use the record reference (exp-...) shown by 'splitledger history'.")
            }
            Self::Ocr(_) => Some("Retry the scan, or enter the expense with 'splitledger add'."),
            Self::Config(_) => Some("Check config.json or run 'splitledger init'."),
            _ => None,
        }
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for splitledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
