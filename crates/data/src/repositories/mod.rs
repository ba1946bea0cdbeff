//! Storage backends for the trade journal.
//!
//! [`TradeRepository`] talks to `PostgreSQL`; [`InMemoryTradeStore`] keeps
//! trades in process for tests and offline reports. Both implement the core
//! `TradeHistoryProvider` and `TradeSink` traits.

pub mod memory;
pub mod trade_repo;

pub use memory::InMemoryTradeStore;
pub use trade_repo::TradeRepository;
