//! CSV Export functionality
//!
//! Exports records in ledger order, one row each.

use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::models::ExpenseRecord;
use crate::models::record::{DATE_FORMAT, TIMESTAMP_FORMAT};

const HEADER: [&str; 13] = [
    "Ref",
    "Timestamp",
    "Payer",
    "Shop",
    "Amount",
    "Currency",
    "Date",
    "Remarks",
    "Shared",
    "Split",
    "Original Amount",
    "Original Currency",
    "Conversion",
];

fn export_error(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export(e.to_string())
}

/// Export records to CSV
pub fn export_records_csv<W: Write>(records: &[ExpenseRecord], writer: W) -> LedgerResult<()> {
    let mut out = ::csv::Writer::from_writer(writer);
    out.write_record(HEADER).map_err(export_error)?;

    for record in records {
        out.write_record([
            record.id.map(|id| id.as_uuid().to_string()).unwrap_or_default(),
            record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            record.payer.clone(),
            record.shop.clone(),
            record.amount.to_string(),
            record.currency.to_string(),
            record.date.format(DATE_FORMAT).to_string(),
            record.remarks.clone(),
            record.shared.to_string(),
            record.split.to_string(),
            record.original_amount.to_string(),
            record.original_currency.to_string(),
            record.conversion_note.clone(),
        ])
        .map_err(export_error)?;
    }

    out.flush().map_err(export_error)?;
    Ok(())
}
