//! Trade storage and CSV import for the journal.
//!
//! This crate provides:
//! - Database client and schema for `PostgreSQL`
//! - Typed row model for stored trades
//! - Repositories implementing the core history/sink traits
//! - CSV import for generic and MetaTrader exports

pub mod database;
pub mod import;
pub mod models;
pub mod repositories;

pub use database::DatabaseClient;
pub use import::{
    import_csv, parse_trades, parse_trades_str, ImportError, ImportFailure, ImportFormat,
    ImportSummary, RowError,
};
pub use models::TradeRecord;
pub use repositories::{InMemoryTradeStore, TradeRepository};
