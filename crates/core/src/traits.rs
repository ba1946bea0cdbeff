use crate::trade::{NewTrade, Trade, TradeOwner};
use anyhow::Result;
use async_trait::async_trait;

/// Source of a journal's trade history.
///
/// Implementations must return trades ascending by entry time, with ties in
/// the order the trades were recorded.
#[async_trait]
pub trait TradeHistoryProvider: Send + Sync {
    async fn trades_for(&self, owner: TradeOwner) -> Result<Vec<Trade>>;
}

/// Destination for newly recorded trades.
#[async_trait]
pub trait TradeSink: Send + Sync {
    /// Stores every trade or none of them. Returns the number inserted.
    async fn insert_batch(&self, owner: TradeOwner, trades: &[NewTrade]) -> Result<u64>;

    async fn insert_one(&self, owner: TradeOwner, trade: &NewTrade) -> Result<()>;
}
