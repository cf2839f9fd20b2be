//! Configuration module for splitledger
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence (parties, base currency, edit policy)

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::{EditTimestampPolicy, Settings};
