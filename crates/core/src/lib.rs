//! Core types for the kelly-journal workspace.
//!
//! - [`Trade`] and friends: the immutable journal entries everything reads
//! - [`kelly`]: the sizing formula shared by the aggregate and running stats
//! - [`TradeHistoryProvider`] / [`TradeSink`]: the storage seams
//! - [`AppConfig`] and its loader

pub mod config;
pub mod config_loader;
pub mod kelly;
pub mod trade;
pub mod traits;

pub use config::{AppConfig, DatabaseConfig, ServerConfig, SimulationConfig};
pub use config_loader::ConfigLoader;
pub use kelly::{clamp_to_bet, kelly_fraction, HALF_KELLY};
pub use trade::{sort_chronologically, NewTrade, Trade, TradeOwner};
pub use traits::{TradeHistoryProvider, TradeSink};
