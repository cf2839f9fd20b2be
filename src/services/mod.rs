//! Service layer for splitledger
//!
//! Business logic on top of the ledger store: conversion, receipt intake,
//! settlement and line-level editing.

pub mod conversion;
pub mod editor;
pub mod expense;
pub mod intake;
pub mod settlement;

pub use conversion::{convert_to_base, Conversion};
pub use editor::RecordKey;
pub use expense::{
    ExpenseChanges, ExpenseService, LedgerView, NewExpense, ReceiptDetails, ScannedExpense,
};
pub use intake::{
    coerce_guess, parse_guess, JsonReplyExtractor, ReceiptCandidate, ReceiptExtractor,
    ReceiptGuess,
};
pub use settlement::{settle, PartyTotals, Settlement, SettlementOutcome};
