//! Export module for splitledger
//!
//! Exports the parsed ledger in multiple formats:
//! - CSV: one row per record (spreadsheet-compatible)
//! - JSON: records plus settlement, machine-readable
//! - YAML: the same document as JSON, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::export_records_csv;
pub use json::{export_json, LedgerExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_yaml;
