//! JSON Export functionality
//!
//! Exports the parsed ledger together with its settlement, with schema
//! versioning.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{CurrencyCode, ExpenseRecord, Parties};
use crate::services::{LedgerView, Settlement};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full ledger export structure
#[derive(Debug, Clone, Serialize)]
pub struct LedgerExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// Ledger version the export was taken from
    pub ledger_version: Option<String>,

    pub base_currency: CurrencyCode,
    pub parties: Parties,

    /// All records, in ledger order
    pub records: Vec<ExpenseRecord>,

    pub settlement: Settlement,

    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize)]
pub struct ExportMetadata {
    pub record_count: usize,
    pub shared_count: usize,
    /// Lines that could not be parsed and are not in `records`
    pub skipped_lines: usize,
    pub earliest_date: Option<String>,
    pub latest_date: Option<String>,
}

impl LedgerExport {
    /// Build an export from a view and its settlement
    pub fn new(view: &LedgerView, settlement: Settlement, parties: &Parties) -> Self {
        let records = view.records().to_vec();

        let metadata = ExportMetadata {
            record_count: records.len(),
            shared_count: records.iter().filter(|r| r.shared).count(),
            skipped_lines: view.skipped().len(),
            earliest_date: records.iter().map(|r| r.date).min().map(|d| d.to_string()),
            latest_date: records.iter().map(|r| r.date).max().map(|d| d.to_string()),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            ledger_version: view.version().map(|v| v.as_str().to_string()),
            base_currency: settlement.currency.clone(),
            parties: parties.clone(),
            records,
            settlement,
            metadata,
        }
    }
}

/// Export the ledger to pretty-printed JSON
pub fn export_json<W: Write>(export: &LedgerExport, writer: W) -> LedgerResult<()> {
    serde_json::to_writer_pretty(writer, export).map_err(|e| LedgerError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::settle;
    use crate::storage::LedgerSnapshot;

    const LEDGER: &str = "\
[2025-01-01 10:00:00] User: Alice, Shop: A, Total: 10.00 HKD, Date: 2025-01-01, Remarks: , Shared: Yes, Orig: 10.00 HKD, Conversion: \n\
broken\n\
[2025-01-02 10:00:00] User: Bob, Shop: B, Total: 20.00 HKD, Date: 2025-01-03, Remarks: , Shared: No, Orig: 20.00 HKD, Conversion: \n";

    #[test]
    fn test_json_export() {
        let view = LedgerView::from_snapshot(LedgerSnapshot {
            text: LEDGER.to_string(),
            version: None,
        });
        let parties = Parties::new("Alice", "Bob");
        let settlement = settle(view.records(), &parties, &CurrencyCode::from_static("HKD"));
        let export = LedgerExport::new(&view, settlement, &parties);

        let mut output = Vec::new();
        export_json(&export, &mut output).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(value["schema_version"], EXPORT_SCHEMA_VERSION);
        assert_eq!(value["records"].as_array().unwrap().len(), 2);
        assert_eq!(value["metadata"]["skipped_lines"], 1);
        assert_eq!(value["metadata"]["shared_count"], 1);
        assert_eq!(value["metadata"]["latest_date"], "2025-01-03");
        assert_eq!(value["settlement"]["outcome"]["status"], "owes");
    }
}
