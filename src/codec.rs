//! Ledger line codec
//!
//! Maps one [`ExpenseRecord`] to one human-readable line and back:
//!
//! ```text
//! [2025-03-14 12:30:00] User: Alice, Shop: Wellcome, Total: 45.20 HKD, Date: 2025-03-14, Remarks: milk\, eggs, Shared: Yes, Split: 1:2, Orig: 45.20 HKD, Conversion: No conversion needed, Ref: 550e8400-e29b-41d4-a716-446655440000
//! ```
//!
//! Free-text fields escape `\`, `,`, CR and LF with a backslash so any text
//! survives a round trip without breaking the field grammar.
//!
//! Decoding is a fixed-grammar match anchored at both ends. Lines written by
//! older versions of the format are still recognised; anything else is
//! skipped rather than treated as an error.

use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use crate::models::record::{DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::models::{CurrencyCode, ExpenseRecord, Money, RecordId, SplitPolicy};

/// Grammar revisions the decoder understands, oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarVersion {
    /// `User, Shop, Total, Remarks`
    Legacy,
    /// Adds `Date` and `Shared`
    Dated,
    /// Adds `Split`, `Orig`, `Conversion` and `Ref`
    Current,
}

const TS: &str = r"\[(?P<ts>\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\]";
const AMOUNT: &str = r"\d+(?:\.\d*)?";
const CURRENCY: &str = r"[A-Z]{3}";

/// A free-text field: anything but an unescaped comma
fn field(name: &str) -> String {
    format!(r"(?P<{}>(?:[^,\\]|\\.)*)", name)
}

fn build(pattern: String) -> Regex {
    Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid ledger grammar: {}", e))
}

lazy_static! {
    static ref CURRENT_RX: Regex = build(format!(
        r"^{ts} User: {payer}, Shop: {shop}, Total: (?P<amount>{amt}) (?P<currency>{cur}), Date: (?P<date>\d{{4}}-\d{{2}}-\d{{2}}), Remarks: {remarks}, Shared: (?P<shared>Yes|No)(?:, Split: (?P<split>Equal|\d+:\d+))?, Orig: (?P<orig_amount>{amt}) (?P<orig_currency>{cur}), Conversion: {note}(?:, Ref: (?P<id>[0-9a-fA-F]{{8}}-[0-9a-fA-F]{{4}}-[0-9a-fA-F]{{4}}-[0-9a-fA-F]{{4}}-[0-9a-fA-F]{{12}}))?$",
        ts = TS,
        payer = field("payer"),
        shop = field("shop"),
        remarks = field("remarks"),
        note = field("note"),
        amt = AMOUNT,
        cur = CURRENCY,
    ));
    static ref DATED_RX: Regex = build(format!(
        r"^{ts} User: {payer}, Shop: {shop}, Total: (?P<amount>{amt}) (?P<currency>{cur}), Date: (?P<date>\d{{4}}-\d{{2}}-\d{{2}}), Remarks: {remarks}, Shared: (?P<shared>Yes|No)$",
        ts = TS,
        payer = field("payer"),
        shop = field("shop"),
        remarks = field("remarks"),
        amt = AMOUNT,
        cur = CURRENCY,
    ));
    static ref LEGACY_RX: Regex = build(format!(
        r"^{ts} User: {payer}, Shop: {shop}, Total: (?P<amount>{amt}) (?P<currency>{cur}), Remarks: {remarks}$",
        ts = TS,
        payer = field("payer"),
        shop = field("shop"),
        remarks = field("remarks"),
        amt = AMOUNT,
        cur = CURRENCY,
    ));
}

/// Escape a free-text value for use inside a line
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse of [`escape`]
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// The `[timestamp] User: <payer>,` prefix that identifies a line written
/// without a `Ref` field
pub fn stamp_prefix(timestamp: &NaiveDateTime, payer: &str) -> String {
    format!(
        "[{}] User: {},",
        timestamp.format(TIMESTAMP_FORMAT),
        escape(payer)
    )
}

/// Render a record as one line (without the trailing newline)
pub fn encode(record: &ExpenseRecord) -> String {
    let mut line = format!(
        "[{}] User: {}, Shop: {}, Total: {} {}, Date: {}, Remarks: {}, Shared: {}, Split: {}, Orig: {} {}, Conversion: {}",
        record.timestamp.format(TIMESTAMP_FORMAT),
        escape(&record.payer),
        escape(&record.shop),
        record.amount,
        record.currency,
        record.date.format(DATE_FORMAT),
        escape(&record.remarks),
        if record.shared { "Yes" } else { "No" },
        record.split,
        record.original_amount,
        record.original_currency,
        escape(&record.conversion_note),
    );
    if let Some(id) = record.id {
        line.push_str(", Ref: ");
        line.push_str(&id.as_uuid().hyphenated().to_string());
    }
    line
}

/// Render a record as one newline-terminated line
pub fn encode_line(record: &ExpenseRecord) -> String {
    let mut line = encode(record);
    line.push('\n');
    line
}

/// Parse one line, or `None` if it matches no known grammar
pub fn decode(line: &str) -> Option<ExpenseRecord> {
    decode_versioned(line).map(|(record, _)| record)
}

/// Parse one line and report which grammar it was written in
pub fn decode_versioned(line: &str) -> Option<(ExpenseRecord, GrammarVersion)> {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(caps) = CURRENT_RX.captures(line) {
        return decode_current(&caps).map(|r| (r, GrammarVersion::Current));
    }
    if let Some(caps) = DATED_RX.captures(line) {
        return decode_dated(&caps).map(|r| (r, GrammarVersion::Dated));
    }
    if let Some(caps) = LEGACY_RX.captures(line) {
        return decode_legacy(&caps).map(|r| (r, GrammarVersion::Legacy));
    }
    None
}

/// Fields shared by every grammar version
struct Common {
    timestamp: NaiveDateTime,
    payer: String,
    shop: String,
    amount: Money,
    currency: CurrencyCode,
    remarks: String,
}

fn decode_common(caps: &Captures<'_>) -> Option<Common> {
    let timestamp = NaiveDateTime::parse_from_str(&caps["ts"], TIMESTAMP_FORMAT).ok()?;
    let amount = Money::parse(&caps["amount"]).ok()?;
    let currency = CurrencyCode::parse(&caps["currency"]).ok()?;
    Some(Common {
        timestamp,
        payer: unescape(&caps["payer"]),
        shop: unescape(&caps["shop"]),
        amount,
        currency,
        remarks: unescape(&caps["remarks"]),
    })
}

fn record_from(common: Common, date: NaiveDate, shared: bool) -> ExpenseRecord {
    ExpenseRecord {
        id: None,
        timestamp: common.timestamp,
        payer: common.payer,
        shop: common.shop,
        amount: common.amount,
        currency: common.currency.clone(),
        date,
        remarks: common.remarks,
        shared,
        split: SplitPolicy::Equal,
        original_amount: common.amount,
        original_currency: common.currency,
        conversion_note: String::new(),
    }
}

fn decode_current(caps: &Captures<'_>) -> Option<ExpenseRecord> {
    let common = decode_common(caps)?;
    let date = NaiveDate::parse_from_str(&caps["date"], DATE_FORMAT).ok()?;
    let shared = &caps["shared"] == "Yes";
    let split = match caps.name("split") {
        Some(m) => m.as_str().parse::<SplitPolicy>().ok()?,
        None => SplitPolicy::Equal,
    };
    let id = match caps.name("id") {
        Some(m) => Some(RecordId::parse(m.as_str()).ok()?),
        None => None,
    };

    let mut record = record_from(common, date, shared);
    record.id = id;
    record.split = split;
    record.original_amount = Money::parse(&caps["orig_amount"]).ok()?;
    record.original_currency = CurrencyCode::parse(&caps["orig_currency"]).ok()?;
    record.conversion_note = unescape(&caps["note"]);
    Some(record)
}

fn decode_dated(caps: &Captures<'_>) -> Option<ExpenseRecord> {
    let common = decode_common(caps)?;
    let date = NaiveDate::parse_from_str(&caps["date"], DATE_FORMAT).ok()?;
    let shared = &caps["shared"] == "Yes";
    Some(record_from(common, date, shared))
}

fn decode_legacy(caps: &Captures<'_>) -> Option<ExpenseRecord> {
    let common = decode_common(caps)?;
    let date = common.timestamp.date();
    Some(record_from(common, date, false))
}

/// A line that did not match any grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the ledger text
    pub line_number: usize,
    pub content: String,
}

/// Result of parsing a whole ledger text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLedger {
    /// Records in file (append) order
    pub records: Vec<ExpenseRecord>,
    /// Non-blank lines that could not be decoded
    pub skipped: Vec<SkippedLine>,
}

impl ParsedLedger {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decode every non-blank line of a ledger, skipping the ones that do not parse
pub fn parse_ledger(text: &str) -> ParsedLedger {
    let mut parsed = ParsedLedger::default();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match decode(line) {
            Some(record) => parsed.records.push(record),
            None => {
                debug!(line_number = index + 1, "skipping unparseable ledger line");
                parsed.skipped.push(SkippedLine {
                    line_number: index + 1,
                    content: line.to_string(),
                });
            }
        }
    }

    parsed
}
