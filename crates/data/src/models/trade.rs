//! Stored trade row.

use chrono::{DateTime, Utc};
use kelly_journal_core::{Trade, TradeOwner};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A row of the `trades` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TradeRecord {
    /// Auto-generated id, also the arrival order
    pub id: i64,
    pub user_id: i32,
    pub strategy_id: i32,
    pub asset: String,
    pub entry_timestamp: DateTime<Utc>,
    pub exit_timestamp: Option<DateTime<Utc>>,
    pub position_size: Decimal,
    /// Net of commission and swap
    pub pnl: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TradeRecord {
    #[must_use]
    pub fn owner(&self) -> TradeOwner {
        TradeOwner::new(self.user_id, self.strategy_id)
    }
}

impl From<TradeRecord> for Trade {
    fn from(record: TradeRecord) -> Self {
        Trade::new(
            record.asset,
            record.entry_timestamp,
            record.exit_timestamp,
            record.position_size,
            record.pnl,
        )
    }
}
