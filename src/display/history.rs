//! History display formatting
//!
//! Newest-first record table, single-record details and the list of lines
//! that could not be read.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::codec::SkippedLine;
use crate::models::record::TIMESTAMP_FORMAT;
use crate::models::ExpenseRecord;

use super::format::truncate;

const SHOP_WIDTH: usize = 24;
const REMARKS_WIDTH: usize = 20;

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Ref")]
    reference: String,
    #[tabled(rename = "Recorded")]
    recorded: String,
    #[tabled(rename = "Payer")]
    payer: String,
    #[tabled(rename = "Shop")]
    shop: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Shared")]
    shared: String,
    #[tabled(rename = "Remarks")]
    remarks: String,
}

impl HistoryRow {
    fn new(record: &ExpenseRecord, date_format: &str) -> Self {
        let shared = if record.shared {
            format!("Yes ({})", record.split)
        } else {
            "No".to_string()
        };
        let amount = if record.was_converted() {
            format!(
                "{} {} ({} {})",
                record.amount, record.currency, record.original_amount, record.original_currency
            )
        } else {
            format!("{} {}", record.amount, record.currency)
        };

        Self {
            reference: record
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            recorded: record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            payer: record.payer.clone(),
            shop: truncate(&record.shop, SHOP_WIDTH),
            amount,
            date: record.date.format(date_format).to_string(),
            shared,
            remarks: truncate(&record.remarks, REMARKS_WIDTH),
        }
    }
}

/// Format records (already in display order) as a table
pub fn format_history_table(records: &[&ExpenseRecord], date_format: &str) -> String {
    if records.is_empty() {
        return "No expenses recorded yet.".to_string();
    }

    let rows: Vec<HistoryRow> = records
        .iter()
        .map(|r| HistoryRow::new(r, date_format))
        .collect();
    Table::new(rows).with(Style::psql()).to_string()
}

/// Format one record for display
pub fn format_record_details(record: &ExpenseRecord) -> String {
    let mut output = String::new();

    match record.id {
        Some(id) => output.push_str(&format!("Expense: {}\n", id)),
        None => output.push_str("Expense: (no reference)\n"),
    }
    output.push_str(&format!(
        "  Recorded:   {}\n",
        record.timestamp.format(TIMESTAMP_FORMAT)
    ));
    output.push_str(&format!("  Payer:      {}\n", record.payer));
    output.push_str(&format!("  Shop:       {}\n", record.shop));
    output.push_str(&format!("  Amount:     {} {}\n", record.amount, record.currency));
    if record.was_converted() {
        output.push_str(&format!(
            "  Original:   {} {}\n",
            record.original_amount, record.original_currency
        ));
    }
    output.push_str(&format!("  Date:       {}\n", record.date));
    output.push_str(&format!(
        "  Shared:     {}\n",
        if record.shared {
            format!("Yes, split {}", record.split)
        } else {
            "No".to_string()
        }
    ));
    if !record.remarks.is_empty() {
        output.push_str(&format!("  Remarks:    {}\n", record.remarks));
    }
    if !record.conversion_note.is_empty() {
        output.push_str(&format!("  Conversion: {}\n", record.conversion_note));
    }

    output
}

/// Format the lines that were left out of the history
pub fn format_skipped(skipped: &[SkippedLine]) -> String {
    let mut output = format!("{} line(s) could not be read:\n", skipped.len());
    for line in skipped {
        output.push_str(&format!(
            "  line {}: {}\n",
            line.line_number,
            truncate(&line.content, 60)
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrencyCode, Money, SplitPolicy};
    use chrono::NaiveDate;

    fn record() -> ExpenseRecord {
        let mut r = ExpenseRecord::new(
            "Alice",
            "Wellcome Supermarket",
            Money::from_cents(4520),
            CurrencyCode::from_static("HKD"),
            NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
        );
        r.shared = true;
        r.split = SplitPolicy::weighted(1, 2).unwrap();
        r
    }

    #[test]
    fn test_history_table() {
        let r = record();
        let table = format_history_table(&[&r], "%d/%m/%Y");

        assert!(table.contains("Wellcome Supermarket"));
        assert!(table.contains("45.20 HKD"));
        assert!(table.contains("03/02/2025"));
        assert!(table.contains("Yes (1:2)"));
        assert!(table.contains(&r.id.unwrap().to_string()));
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(format_history_table(&[], "%Y-%m-%d"), "No expenses recorded yet.");
    }

    #[test]
    fn test_converted_amount_shows_original() {
        let mut r = record();
        r.original_amount = Money::from_cents(90400);
        r.original_currency = CurrencyCode::from_static("JPY");
        r.conversion_note = "Converted at 1 JPY = 0.05 HKD".into();

        let details = format_record_details(&r);
        assert!(details.contains("Original:   904.00 JPY"));
        assert!(details.contains("Conversion: Converted at 1 JPY = 0.05 HKD"));
        assert!(format_history_table(&[&r], "%Y-%m-%d").contains("45.20 HKD (904.00 JPY)"));
    }

    #[test]
    fn test_format_skipped() {
        let skipped = vec![SkippedLine {
            line_number: 3,
            content: "garbage".into(),
        }];
        let text = format_skipped(&skipped);
        assert!(text.starts_with("1 line(s) could not be read"));
        assert!(text.contains("line 3: garbage"));
    }
}
