//! User settings for splitledger
//!
//! Manages the two parties, the base currency, the ledger file name and the
//! policies that shape edits and exchange-rate caching.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::models::{CurrencyCode, Parties};

/// What happens to a record's timestamp when it is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EditTimestampPolicy {
    /// Stamp the edited record with the time of the edit
    #[default]
    Reset,
    /// Keep the original creation time
    Preserve,
}

/// User settings for splitledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency every stored amount is normalized to
    #[serde(default = "default_base_currency")]
    pub base_currency: CurrencyCode,

    /// The two people sharing expenses
    #[serde(default)]
    pub parties: Parties,

    /// Timestamp handling on edit
    #[serde(default)]
    pub edit_timestamp_policy: EditTimestampPolicy,

    /// How long a fetched exchange rate stays valid, in seconds
    #[serde(default = "default_rate_cache_ttl_secs")]
    pub rate_cache_ttl_secs: u64,

    /// Ledger file name inside the data directory
    #[serde(default = "default_ledger_file_name")]
    pub ledger_file_name: String,

    /// Date format preference for display (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_base_currency() -> CurrencyCode {
    CurrencyCode::from_static("HKD")
}

fn default_rate_cache_ttl_secs() -> u64 {
    3600
}

fn default_ledger_file_name() -> String {
    "expense_records.txt".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            base_currency: default_base_currency(),
            parties: Parties::default(),
            edit_timestamp_policy: EditTimestampPolicy::default(),
            rate_cache_ttl_secs: default_rate_cache_ttl_secs(),
            ledger_file_name: default_ledger_file_name(),
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                LedgerError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            LedgerError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(&settings_path, contents).map_err(|e| {
            LedgerError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }

    /// Check settings that serde alone cannot enforce
    pub fn validate(&self) -> Result<(), LedgerError> {
        self.parties.validate().map_err(LedgerError::Config)?;

        let name = self.ledger_file_name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(LedgerError::Config(format!(
                "Invalid ledger file name: '{}'",
                self.ledger_file_name
            )));
        }

        Ok(())
    }

    /// Full path of the ledger file
    pub fn ledger_path(&self, paths: &LedgerPaths) -> PathBuf {
        paths.ledger_file(&self.ledger_file_name)
    }
}
