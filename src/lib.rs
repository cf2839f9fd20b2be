//! splitledger - two-party shared expense ledger
//!
//! Expenses are kept as one line each in a single versioned text file. Every
//! read re-parses the whole file; every write is guarded by the version that
//! was read, so concurrent writers get a conflict instead of losing data.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (records, money, currencies, parties)
//! - `codec`: One record <-> one ledger line
//! - `storage`: Versioned blob storage and the ledger store on top of it
//! - `rates`: Exchange-rate providers and their cache
//! - `services`: Business logic (conversion, intake, settlement, editing)
//! - `display`, `export`, `cli`: Terminal output, file export and commands
//!
//! # Example
//!
//! ```rust,ignore
//! use splitledger::config::{LedgerPaths, Settings};
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod rates;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
