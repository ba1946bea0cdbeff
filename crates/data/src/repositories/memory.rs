//! In-process trade store.

use anyhow::Result;
use async_trait::async_trait;
use kelly_journal_core::{sort_chronologically, NewTrade, Trade, TradeHistoryProvider, TradeOwner, TradeSink};
use tokio::sync::RwLock;

/// Keeps trades in arrival order behind a lock.
#[derive(Debug, Default)]
pub struct InMemoryTradeStore {
    trades: RwLock<Vec<(TradeOwner, Trade)>>,
}

impl InMemoryTradeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with one owner's trades.
    #[must_use]
    pub fn with_trades(owner: TradeOwner, trades: Vec<Trade>) -> Self {
        Self {
            trades: RwLock::new(trades.into_iter().map(|t| (owner, t)).collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.trades.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.trades.read().await.is_empty()
    }
}

#[async_trait]
impl TradeHistoryProvider for InMemoryTradeStore {
    async fn trades_for(&self, owner: TradeOwner) -> Result<Vec<Trade>> {
        let mut trades: Vec<Trade> = self
            .trades
            .read()
            .await
            .iter()
            .filter(|(o, _)| *o == owner)
            .map(|(_, t)| t.clone())
            .collect();
        sort_chronologically(&mut trades);
        Ok(trades)
    }
}

#[async_trait]
impl TradeSink for InMemoryTradeStore {
    async fn insert_batch(&self, owner: TradeOwner, trades: &[NewTrade]) -> Result<u64> {
        let mut store = self.trades.write().await;
        store.extend(trades.iter().cloned().map(|t| (owner, Trade::from(t))));
        Ok(trades.len() as u64)
    }

    async fn insert_one(&self, owner: TradeOwner, trade: &NewTrade) -> Result<()> {
        self.trades
            .write()
            .await
            .push((owner, Trade::from(trade.clone())));
        Ok(())
    }
}
