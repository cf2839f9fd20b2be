//! Expense record model
//!
//! One receipt as it lives in the ledger: who paid, where, how much (already
//! in the stored currency), and how it is shared.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;
use super::ids::RecordId;
use super::money::Money;
use super::split::SplitPolicy;

/// Timestamp format used in ledger lines and displays
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date format used in ledger lines
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current local time truncated to whole seconds
pub fn now_seconds() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// An expense entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Stable key; `None` for entries written by older versions
    pub id: Option<RecordId>,

    /// When the entry was written (second precision)
    pub timestamp: NaiveDateTime,

    /// Who paid
    pub payer: String,

    /// Vendor name
    pub shop: String,

    /// Amount in `currency`
    pub amount: Money,

    /// Currency the amount is stored in (normally the base currency)
    pub currency: CurrencyCode,

    /// Transaction date from the receipt
    pub date: NaiveDate,

    #[serde(default)]
    pub remarks: String,

    /// Whether the two parties split this expense
    #[serde(default)]
    pub shared: bool,

    #[serde(default)]
    pub split: SplitPolicy,

    /// Amount before conversion
    pub original_amount: Money,

    /// Currency before conversion
    pub original_currency: CurrencyCode,

    /// How the stored amount was obtained
    #[serde(default)]
    pub conversion_note: String,
}

impl ExpenseRecord {
    /// Create a new, unshared, unconverted record stamped with the current time
    pub fn new(
        payer: impl Into<String>,
        shop: impl Into<String>,
        amount: Money,
        currency: CurrencyCode,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Some(RecordId::new()),
            timestamp: now_seconds(),
            payer: payer.into(),
            shop: shop.into(),
            amount,
            currency: currency.clone(),
            date,
            remarks: String::new(),
            shared: false,
            split: SplitPolicy::Equal,
            original_amount: amount,
            original_currency: currency,
            conversion_note: String::new(),
        }
    }

    /// Check whether the stored amount is in the given currency
    pub fn is_in(&self, currency: &CurrencyCode) -> bool {
        &self.currency == currency
    }

    /// Whether the amount was converted from another currency
    pub fn was_converted(&self) -> bool {
        self.original_currency != self.currency
    }

    /// Validate the record
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.payer.trim().is_empty() {
            return Err(RecordValidationError::MissingPayer);
        }
        if self.shop.trim().is_empty() {
            return Err(RecordValidationError::MissingShop);
        }
        if self.amount.is_negative() || self.original_amount.is_negative() {
            return Err(RecordValidationError::NegativeAmount(self.amount));
        }
        if let SplitPolicy::Weighted { first, second } = self.split {
            if first == 0 || second == 0 {
                return Err(RecordValidationError::EmptySplitSide);
            }
        }
        Ok(())
    }
}

/// Validation errors for expense records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    MissingPayer,
    MissingShop,
    NegativeAmount(Money),
    EmptySplitSide,
}

impl std::fmt::Display for RecordValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPayer => write!(f, "Payer is required"),
            Self::MissingShop => write!(f, "Shop name is required"),
            Self::NegativeAmount(amount) => write!(f, "Amount cannot be negative: {}", amount),
            Self::EmptySplitSide => write!(f, "Each side of a split needs at least one person"),
        }
    }
}

impl std::error::Error for RecordValidationError {}
