//! Expense service
//!
//! Orchestrates the submit, history, settle, edit and delete flows on top of
//! the ledger store. State between a read and a later write is carried
//! explicitly in a [`LedgerView`]: edits and deletes consume the view they
//! were planned against, and the write is rejected if the ledger moved on.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::codec::{self, ParsedLedger, SkippedLine};
use crate::config::{EditTimestampPolicy, Settings};
use crate::error::{LedgerError, LedgerResult};
use crate::models::record::TIMESTAMP_FORMAT;
use crate::models::{now_seconds, CurrencyCode, ExpenseRecord, Money, RecordId, SplitPolicy};
use crate::rates::RateProvider;
use crate::storage::{BlobStore, LedgerSnapshot, LedgerStore, VersionToken};

use super::conversion::convert_to_base;
use super::editor::{self, RecordKey};
use super::intake::{coerce_guess, ReceiptGuess};
use super::settlement::{settle, Settlement};

/// Input for a manually entered expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub payer: String,
    pub shop: String,
    /// Amount as printed on the receipt
    pub amount: Money,
    /// Receipt currency; the base currency when `None`
    pub currency: Option<CurrencyCode>,
    pub date: NaiveDate,
    pub remarks: String,
    pub shared: bool,
    pub split: SplitPolicy,
}

/// What the user adds to a scanned receipt
#[derive(Debug, Clone, Default)]
pub struct ReceiptDetails {
    pub payer: String,
    pub remarks: String,
    pub shared: bool,
    pub split: SplitPolicy,
}

/// Result of submitting a scanned receipt
#[derive(Debug, Clone)]
pub struct ScannedExpense {
    pub record: ExpenseRecord,
    /// Receipt fields that fell back to a default
    pub defaulted: Vec<&'static str>,
}

/// Field changes for an edit; `None` keeps the current value
///
/// `amount` and `currency` describe the receipt, so changing either one
/// converts the record again.
#[derive(Debug, Clone, Default)]
pub struct ExpenseChanges {
    pub payer: Option<String>,
    pub shop: Option<String>,
    pub amount: Option<Money>,
    pub currency: Option<CurrencyCode>,
    pub date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub shared: Option<bool>,
    pub split: Option<SplitPolicy>,
}

impl ExpenseChanges {
    pub fn is_empty(&self) -> bool {
        self.payer.is_none()
            && self.shop.is_none()
            && self.amount.is_none()
            && self.currency.is_none()
            && self.date.is_none()
            && self.remarks.is_none()
            && self.shared.is_none()
            && self.split.is_none()
    }

    fn touches_amount(&self) -> bool {
        self.amount.is_some() || self.currency.is_some()
    }
}

/// The ledger as of one read, kept by the caller until it writes
#[derive(Debug, Clone, Default)]
pub struct LedgerView {
    snapshot: LedgerSnapshot,
    parsed: ParsedLedger,
}

impl LedgerView {
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let parsed = codec::parse_ledger(&snapshot.text);
        Self { snapshot, parsed }
    }

    /// Records in ledger (append) order
    pub fn records(&self) -> &[ExpenseRecord] {
        &self.parsed.records
    }

    /// Records sorted newest first; entries with the same timestamp keep
    /// their ledger order
    pub fn newest_first(&self) -> Vec<&ExpenseRecord> {
        let mut records: Vec<&ExpenseRecord> = self.parsed.records.iter().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    pub fn skipped(&self) -> &[SkippedLine] {
        &self.parsed.skipped
    }

    pub fn version(&self) -> Option<&VersionToken> {
        self.snapshot.version.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.snapshot.text
    }

    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty()
    }

    /// Resolve a user-supplied reference (`exp-1a2b3c4d`, a UUID or a UUID
    /// prefix) to a record key
    pub fn find(&self, reference: &str) -> LedgerResult<RecordKey> {
        let mut matches = self
            .parsed
            .records
            .iter()
            .filter_map(|r| r.id)
            .filter(|id| id.matches_reference(reference));

        let id = matches
            .next()
            .ok_or_else(|| LedgerError::record_not_found(reference))?;
        let extra = matches.count();
        if extra > 0 {
            return Err(LedgerError::AmbiguousRecord {
                identifier: reference.to_string(),
                count: extra + 1,
            });
        }
        Ok(RecordKey::Id(id))
    }

    /// Resolve a record written without an id by its timestamp and payer
    pub fn find_stamp(&self, timestamp: &str, payer: &str) -> LedgerResult<RecordKey> {
        let identifier = format!("[{}] {}", timestamp, payer);
        let timestamp = NaiveDateTime::parse_from_str(timestamp.trim(), TIMESTAMP_FORMAT)
            .map_err(|_| {
                LedgerError::Validation(format!(
                    "Invalid timestamp '{}'. Use YYYY-MM-DD HH:MM:SS",
                    timestamp
                ))
            })?;

        self.parsed
            .records
            .iter()
            .find(|r| r.timestamp == timestamp && r.payer.trim().eq_ignore_ascii_case(payer.trim()))
            .map(|r| RecordKey::Stamp {
                timestamp,
                payer: r.payer.clone(),
            })
            .ok_or_else(|| LedgerError::record_not_found(identifier))
    }

    /// The record a key points at
    pub fn record(&self, key: &RecordKey) -> Option<&ExpenseRecord> {
        self.parsed
            .records
            .iter()
            .find(|r| &RecordKey::for_record(r) == key)
    }
}

/// Service for expense management
pub struct ExpenseService<'a, S, R: ?Sized> {
    store: &'a LedgerStore<S>,
    settings: &'a Settings,
    rates: &'a R,
}

impl<'a, S, R> ExpenseService<'a, S, R>
where
    S: BlobStore,
    R: RateProvider + ?Sized,
{
    /// Create a new expense service
    pub fn new(store: &'a LedgerStore<S>, settings: &'a Settings, rates: &'a R) -> Self {
        Self {
            store,
            settings,
            rates,
        }
    }

    fn canonical_payer(&self, payer: &str) -> LedgerResult<String> {
        self.settings
            .parties
            .canonical(payer)
            .map(str::to_string)
            .ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Unknown payer '{}'. Expected {} or {}",
                    payer.trim(),
                    self.settings.parties.first,
                    self.settings.parties.second
                ))
            })
    }

    /// Convert a receipt amount into the stored amount and audit fields
    fn apply_conversion(&self, record: &mut ExpenseRecord, amount: Money, currency: CurrencyCode) {
        let conversion = convert_to_base(amount, &currency, &self.settings.base_currency, self.rates);
        record.amount = conversion.amount;
        record.currency = conversion.currency;
        record.original_amount = amount;
        record.original_currency = currency;
        record.conversion_note = conversion.note;
    }

    /// Record a new expense: convert once, then append one line
    pub fn submit(&self, input: NewExpense) -> LedgerResult<ExpenseRecord> {
        let payer = self.canonical_payer(&input.payer)?;
        let currency = input
            .currency
            .unwrap_or_else(|| self.settings.base_currency.clone());

        let mut record = ExpenseRecord::new(
            payer,
            input.shop.trim(),
            input.amount,
            currency.clone(),
            input.date,
        );
        record.remarks = input.remarks.trim().to_string();
        record.shared = input.shared;
        record.split = input.split;
        self.apply_conversion(&mut record, input.amount, currency);

        record
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.store.append(&codec::encode_line(&record))?;
        info!(payer = %record.payer, amount = %record.amount, currency = %record.currency, "expense recorded");

        Ok(record)
    }

    /// Record an expense from an extraction result
    ///
    /// Nothing is written when the guess is unusable.
    pub fn submit_receipt(
        &self,
        guess: &ReceiptGuess,
        details: ReceiptDetails,
        today: NaiveDate,
    ) -> LedgerResult<ScannedExpense> {
        let candidate = coerce_guess(guess, &self.settings.base_currency, today)?;

        let record = self.submit(NewExpense {
            payer: details.payer,
            shop: candidate.shop,
            amount: candidate.amount,
            currency: Some(candidate.currency),
            date: candidate.date,
            remarks: details.remarks,
            shared: details.shared,
            split: details.split,
        })?;

        Ok(ScannedExpense {
            record,
            defaulted: candidate.defaulted,
        })
    }

    /// Read and parse the whole ledger
    pub fn history(&self) -> LedgerResult<LedgerView> {
        let view = LedgerView::from_snapshot(self.store.read_all()?);
        if !view.skipped().is_empty() {
            info!(skipped = view.skipped().len(), "ledger has unparseable lines");
        }
        Ok(view)
    }

    /// Settle the records in a view
    pub fn settlement(&self, view: &LedgerView) -> Settlement {
        settle(
            view.records(),
            &self.settings.parties,
            &self.settings.base_currency,
        )
    }

    /// Rewrite one record, provided the ledger still matches `view`
    pub fn update(
        &self,
        view: LedgerView,
        key: &RecordKey,
        changes: ExpenseChanges,
    ) -> LedgerResult<ExpenseRecord> {
        let current = view
            .record(key)
            .ok_or_else(|| LedgerError::record_not_found(key.to_string()))?;
        let mut record = current.clone();

        if let Some(payer) = &changes.payer {
            record.payer = self.canonical_payer(payer)?;
        }
        if let Some(shop) = &changes.shop {
            record.shop = shop.trim().to_string();
        }
        if let Some(date) = changes.date {
            record.date = date;
        }
        if let Some(remarks) = &changes.remarks {
            record.remarks = remarks.trim().to_string();
        }
        if let Some(shared) = changes.shared {
            record.shared = shared;
        }
        if let Some(split) = changes.split {
            record.split = split;
        }
        if changes.touches_amount() {
            let amount = changes.amount.unwrap_or(current.original_amount);
            let currency = changes
                .currency
                .clone()
                .unwrap_or_else(|| current.original_currency.clone());
            self.apply_conversion(&mut record, amount, currency);
        }

        if self.settings.edit_timestamp_policy == EditTimestampPolicy::Reset {
            record.timestamp = now_seconds();
        }
        if record.id.is_none() {
            record.id = Some(RecordId::new());
        }

        record
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let new_text = editor::update(view.text(), key, &record)?;
        self.store.replace_all(&new_text, view.version())?;
        info!(record = %key, "expense updated");

        Ok(record)
    }

    /// Remove one record, provided the ledger still matches `view`
    pub fn delete(&self, view: LedgerView, key: &RecordKey) -> LedgerResult<ExpenseRecord> {
        let removed = view
            .record(key)
            .cloned()
            .ok_or_else(|| LedgerError::record_not_found(key.to_string()))?;

        let new_text = editor::delete(view.text(), key)?;
        self.store.replace_all(&new_text, view.version())?;
        info!(record = %key, "expense deleted");

        Ok(removed)
    }
}
