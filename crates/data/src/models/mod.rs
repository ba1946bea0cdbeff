//! Data models for the trade journal.
//!
//! All money fields use `rust_decimal::Decimal`; models derive
//! `sqlx::FromRow` for database compatibility.

pub mod trade;

pub use trade::TradeRecord;
