//! Core data models for splitledger
//!
//! This module contains the data structures that represent the ledger
//! domain: expense records, money, currencies, parties and split policies.

pub mod currency;
pub mod ids;
pub mod money;
pub mod party;
pub mod record;
pub mod split;

pub use currency::CurrencyCode;
pub use ids::RecordId;
pub use money::Money;
pub use party::{Parties, Side};
pub use record::{now_seconds, ExpenseRecord, RecordValidationError};
pub use split::SplitPolicy;
