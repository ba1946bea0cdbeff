//! Trade journal repository.
//!
//! Reads a journal in entry-time order and stores new trades, batches inside
//! a single transaction.

use anyhow::{Context, Result};
use async_trait::async_trait;
use kelly_journal_core::{NewTrade, Trade, TradeHistoryProvider, TradeOwner, TradeSink};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::TradeRecord;

/// Repository for the `trades` table.
#[derive(Debug, Clone)]
pub struct TradeRepository {
    pool: PgPool,
}

impl TradeRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Queries an owner's trades, oldest entry first.
    ///
    /// Trades entered at the same instant come back in insertion order.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_ordered(&self, owner: TradeOwner) -> Result<Vec<TradeRecord>> {
        let records = sqlx::query_as::<_, TradeRecord>(
            r#"
            SELECT id, user_id, strategy_id, asset, entry_timestamp, exit_timestamp,
                   position_size, pnl, created_at
            FROM trades
            WHERE user_id = $1 AND strategy_id = $2
            ORDER BY entry_timestamp ASC, id ASC
            "#,
        )
        .bind(owner.user_id)
        .bind(owner.strategy_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query trades")?;

        Ok(records)
    }

    /// Counts an owner's trades.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count_for(&self, owner: TradeOwner) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM trades
            WHERE user_id = $1 AND strategy_id = $2
            "#,
        )
        .bind(owner.user_id)
        .bind(owner.strategy_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count trades")?;

        Ok(row.0)
    }

    async fn insert_in(
        tx: &mut Transaction<'_, Postgres>,
        owner: TradeOwner,
        trade: &NewTrade,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO trades
                (user_id, strategy_id, asset, entry_timestamp, exit_timestamp, position_size, pnl)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(owner.user_id)
        .bind(owner.strategy_id)
        .bind(&trade.asset)
        .bind(trade.entry_timestamp)
        .bind(trade.exit_timestamp)
        .bind(trade.position_size)
        .bind(trade.pnl)
        .execute(&mut **tx)
        .await
        .context("Failed to insert trade")?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TradeHistoryProvider for TradeRepository {
    async fn trades_for(&self, owner: TradeOwner) -> Result<Vec<Trade>> {
        let records = self.query_ordered(owner).await?;
        Ok(records.into_iter().map(Trade::from).collect())
    }
}

#[async_trait]
impl TradeSink for TradeRepository {
    /// Inserts every trade in one transaction; any failure rolls back the batch.
    async fn insert_batch(&self, owner: TradeOwner, trades: &[NewTrade]) -> Result<u64> {
        if trades.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        let mut inserted = 0u64;

        for trade in trades {
            inserted += Self::insert_in(&mut tx, owner, trade).await?;
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(inserted)
    }

    async fn insert_one(&self, owner: TradeOwner, trade: &NewTrade) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Self::insert_in(&mut tx, owner, trade).await?;
        tx.commit().await.context("Failed to commit transaction")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseClient;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    // Needs a running PostgreSQL: DATABASE_URL=... cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_insert_and_query_ordered() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let client = DatabaseClient::new(&url, 2).await.unwrap();
        client.ensure_schema().await.unwrap();
        let repo = client.trades();

        let owner = TradeOwner::new(-1, Utc::now().timestamp_subsec_nanos() as i32);
        let at = |day| Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap();
        let trade = |asset: &str, day, pnl| NewTrade {
            asset: asset.to_string(),
            entry_timestamp: at(day),
            exit_timestamp: None,
            position_size: dec!(1),
            pnl,
        };

        let inserted = repo
            .insert_batch(
                owner,
                &[trade("late", 5, dec!(10)), trade("tie-a", 2, dec!(-4)), trade("tie-b", 2, dec!(6))],
            )
            .await
            .unwrap();
        repo.insert_one(owner, &trade("early", 1, dec!(1))).await.unwrap();

        assert_eq!(inserted, 3);
        assert_eq!(repo.count_for(owner).await.unwrap(), 4);

        let assets: Vec<String> = repo
            .trades_for(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.asset)
            .collect();
        assert_eq!(assets, vec!["early", "tie-a", "tie-b", "late"]);
    }
}
