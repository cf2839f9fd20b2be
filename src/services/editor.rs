//! Record editor: locate, replace or remove one line in the full ledger text
//!
//! Every other line, including ones that do not parse, is carried over
//! byte for byte and in the same order.

use std::fmt;

use chrono::NaiveDateTime;

use crate::codec;
use crate::error::{LedgerError, LedgerResult};
use crate::models::record::TIMESTAMP_FORMAT;
use crate::models::{ExpenseRecord, RecordId};

/// How a record is addressed inside the ledger text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    /// The `Ref:` id written with every record since ids were introduced
    Id(RecordId),
    /// The `[timestamp] User: <payer>,` prefix, for lines without a `Ref:`
    Stamp {
        timestamp: NaiveDateTime,
        payer: String,
    },
}

impl RecordKey {
    /// The key that addresses `record` in the ledger
    pub fn for_record(record: &ExpenseRecord) -> Self {
        match record.id {
            Some(id) => Self::Id(id),
            None => Self::Stamp {
                timestamp: record.timestamp,
                payer: record.payer.clone(),
            },
        }
    }

    fn matches(&self, line: &str) -> bool {
        match self {
            Self::Id(id) => codec::decode(line).map_or(false, |r| r.id == Some(*id)),
            Self::Stamp { timestamp, payer } => {
                line.starts_with(&codec::stamp_prefix(timestamp, payer))
                    && codec::decode(line).is_some()
            }
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Stamp { timestamp, payer } => {
                write!(f, "[{}] {}", timestamp.format(TIMESTAMP_FORMAT), payer)
            }
        }
    }
}

fn segments(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

fn find_single(lines: &[&str], key: &RecordKey) -> LedgerResult<usize> {
    let mut hits = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| key.matches(line))
        .map(|(index, _)| index);

    let first = hits
        .next()
        .ok_or_else(|| LedgerError::record_not_found(key.to_string()))?;
    let extra = hits.count();
    if extra > 0 {
        return Err(LedgerError::AmbiguousRecord {
            identifier: key.to_string(),
            count: extra + 1,
        });
    }
    Ok(first)
}

fn join(lines: &[&str]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        out.push_str(line);
        if !line.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// 0-based index of the line `key` addresses
pub fn locate(text: &str, key: &RecordKey) -> LedgerResult<usize> {
    find_single(&segments(text), key)
}

/// Remove the line `key` addresses
pub fn delete(text: &str, key: &RecordKey) -> LedgerResult<String> {
    let mut lines = segments(text);
    let index = find_single(&lines, key)?;
    lines.remove(index);
    Ok(join(&lines))
}

/// Replace the line `key` addresses with `record`
pub fn update(text: &str, key: &RecordKey, record: &ExpenseRecord) -> LedgerResult<String> {
    let replacement = codec::encode_line(record);
    let mut lines = segments(text);
    let index = find_single(&lines, key)?;
    lines[index] = replacement.as_str();
    Ok(join(&lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrencyCode, Money};
    use chrono::NaiveDate;

    fn record(shop: &str, second: u32) -> ExpenseRecord {
        let mut r = ExpenseRecord::new(
            "Alice",
            shop,
            Money::from_cents(1000),
            CurrencyCode::from_static("HKD"),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        );
        r.timestamp = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, second)
            .unwrap();
        r
    }

    fn ledger(records: &[ExpenseRecord]) -> String {
        records.iter().map(codec::encode_line).collect()
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let records: Vec<_> = (0..5).map(|i| record(&format!("Shop {}", i), i)).collect();
        let text = ledger(&records);

        let out = delete(&text, &RecordKey::for_record(&records[2])).unwrap();
        let parsed = codec::parse_ledger(&out);

        assert_eq!(parsed.records.len(), 4);
        let expected: Vec<_> = records
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 2)
            .map(|(_, r)| r.clone())
            .collect();
        assert_eq!(parsed.records, expected);
    }

    #[test]
    fn test_delete_last_record_leaves_empty_text() {
        let r = record("Only", 0);
        let out = delete(&ledger(&[r.clone()]), &RecordKey::for_record(&r)).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_other_lines_preserved_verbatim() {
        let a = record("A", 1);
        let b = record("B", 2);
        let text = format!(
            "garbage line\r\n{}\n{}",
            codec::encode(&a),
            codec::encode(&b)
        );

        let out = delete(&text, &RecordKey::for_record(&a)).unwrap();
        assert_eq!(out, format!("garbage line\r\n{}\n", codec::encode(&b)));
    }

    #[test]
    fn test_update_replaces_in_place() {
        let records: Vec<_> = (0..3).map(|i| record(&format!("Shop {}", i), i)).collect();
        let text = ledger(&records);

        let mut edited = records[1].clone();
        edited.shop = "Renamed, Ltd".into();
        edited.amount = Money::from_cents(4520);

        let out = update(&text, &RecordKey::for_record(&records[1]), &edited).unwrap();
        let parsed = codec::parse_ledger(&out);

        assert_eq!(parsed.records, vec![records[0].clone(), edited, records[2].clone()]);
        assert_eq!(locate(&out, &RecordKey::for_record(&records[2])).unwrap(), 2);
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let text = ledger(&[record("A", 0)]);
        let stranger = record("B", 9);

        let err = delete(&text, &RecordKey::for_record(&stranger)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_stamp_key_for_lines_without_ref() {
        let mut legacy = record("Old", 5);
        legacy.id = None;
        let text = ledger(&[record("New", 1), legacy.clone()]);

        let key = RecordKey::for_record(&legacy);
        assert!(matches!(key, RecordKey::Stamp { .. }));
        assert_eq!(locate(&text, &key).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_stamp_is_ambiguous_and_text_untouched() {
        let mut one = record("One", 7);
        one.id = None;
        let mut two = record("Two", 7);
        two.id = None;
        let text = ledger(&[one.clone(), two]);

        let err = delete(&text, &RecordKey::for_record(&one)).unwrap_err();
        assert!(matches!(err, LedgerError::AmbiguousRecord { count: 2, .. }));
    }

    #[test]
    fn test_stamp_does_not_match_longer_payer_name() {
        let mut alice = record("Shop", 3);
        alice.id = None;
        let mut alicia = alice.clone();
        alicia.payer = "Alice Jr".into();
        let text = ledger(&[alicia]);

        assert!(locate(&text, &RecordKey::for_record(&alice)).unwrap_err().is_not_found());
    }
}
