//! Display formatting for terminal output
//!
//! Formats history and settlement results for the CLI.

pub mod format;
pub mod history;
pub mod settlement;

pub use history::{format_history_table, format_record_details, format_skipped};
pub use settlement::format_settlement;
