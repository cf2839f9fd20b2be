//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod export;
pub mod expense;
pub mod report;

pub use export::{handle_export_command, ExportArgs, ExportFormat};
pub use expense::{
    handle_add_command, handle_delete_command, handle_edit_command, handle_scan_command, AddArgs,
    DeleteArgs, EditArgs, RecordRef, ScanArgs,
};
pub use report::{handle_history_command, handle_settle_command, HistoryArgs};

use std::time::Duration;

use chrono::NaiveDate;

use crate::config::{LedgerPaths, Settings};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{CurrencyCode, Money, SplitPolicy};
use crate::rates::{CachedRateProvider, RatesFileProvider};
use crate::services::ExpenseService;
use crate::storage::{open_file_ledger, FileBlobStore, FileLedger};

/// Rate source used by the binary
pub type CliRates = CachedRateProvider<RatesFileProvider>;

/// Everything a command needs, opened once per invocation
pub struct Session {
    pub paths: LedgerPaths,
    pub settings: Settings,
    store: FileLedger,
    rates: CliRates,
}

impl Session {
    pub fn open(paths: LedgerPaths, settings: Settings) -> LedgerResult<Self> {
        let store = open_file_ledger(&paths, &settings)?;
        let rates = CachedRateProvider::new(
            RatesFileProvider::new(paths.rates_file()),
            Duration::from_secs(settings.rate_cache_ttl_secs),
        );
        Ok(Self {
            paths,
            settings,
            store,
            rates,
        })
    }

    pub fn service(&self) -> ExpenseService<'_, FileBlobStore, CliRates> {
        ExpenseService::new(&self.store, &self.settings, &self.rates)
    }
}

pub(crate) fn parse_amount(s: &str) -> LedgerResult<Money> {
    let amount = Money::parse(s).map_err(|e| {
        LedgerError::Validation(format!(
            "Invalid amount format: '{}'. Use format like '45.20'. Error: {}",
            s, e
        ))
    })?;
    if amount.is_negative() {
        return Err(LedgerError::Validation(format!(
            "Amount cannot be negative: {}",
            amount
        )));
    }
    Ok(amount)
}

pub(crate) fn parse_date(s: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", s))
    })
}

pub(crate) fn parse_currency(s: &str) -> LedgerResult<CurrencyCode> {
    CurrencyCode::from_symbol_or_code(s).ok_or_else(|| {
        LedgerError::Validation(format!(
            "Invalid currency: '{}'. Use a 3-letter code like HKD",
            s
        ))
    })
}

pub(crate) fn parse_split(s: &str) -> LedgerResult<SplitPolicy> {
    s.parse::<SplitPolicy>().map_err(|e| {
        LedgerError::Validation(format!(
            "Invalid split: '{}'. Use 'equal' or weights like '1:2'. Error: {}",
            s, e
        ))
    })
}
