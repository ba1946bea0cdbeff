//! Trade journal entries.
//!
//! A [`Trade`] is a closed position as stored by the journal. The engine only
//! ever reads trades; ordering by entry time is the time axis for every
//! point-in-time calculation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies whose journal a trade belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeOwner {
    pub user_id: i32,
    pub strategy_id: i32,
}

impl TradeOwner {
    #[must_use]
    pub const fn new(user_id: i32, strategy_id: i32) -> Self {
        Self {
            user_id,
            strategy_id,
        }
    }
}

/// A closed trade as returned by the history provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Instrument symbol (e.g. "EURUSD", "AAPL")
    pub asset: String,
    /// Time the position was opened
    pub entry_timestamp: DateTime<Utc>,
    /// Time the position was closed, if recorded
    pub exit_timestamp: Option<DateTime<Utc>>,
    /// Position magnitude in lots/shares
    pub position_size: Decimal,
    /// Net profit or loss including fees
    pub pnl: Decimal,
}

impl Trade {
    #[must_use]
    pub fn new(
        asset: impl Into<String>,
        entry_timestamp: DateTime<Utc>,
        exit_timestamp: Option<DateTime<Utc>>,
        position_size: Decimal,
        pnl: Decimal,
    ) -> Self {
        Self {
            asset: asset.into(),
            entry_timestamp,
            exit_timestamp,
            position_size,
            pnl,
        }
    }

    /// Breakeven trades count as losses.
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }
}

/// A validated request to record a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrade {
    pub asset: String,
    pub entry_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub exit_timestamp: Option<DateTime<Utc>>,
    pub position_size: Decimal,
    pub pnl: Decimal,
}

impl From<NewTrade> for Trade {
    fn from(new: NewTrade) -> Self {
        Self {
            asset: new.asset,
            entry_timestamp: new.entry_timestamp,
            exit_timestamp: new.exit_timestamp,
            position_size: new.position_size,
            pnl: new.pnl,
        }
    }
}

/// Stable sort by entry time. Trades entered at the same instant keep their
/// arrival order.
pub fn sort_chronologically(trades: &mut [Trade]) {
    trades.sort_by_key(|t| t.entry_timestamp);
}
