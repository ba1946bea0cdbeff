use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::repositories::TradeRepository;

const CREATE_TRADES: &str = r"
CREATE TABLE IF NOT EXISTS trades (
    id              BIGSERIAL PRIMARY KEY,
    user_id         INTEGER NOT NULL,
    strategy_id     INTEGER NOT NULL,
    asset           TEXT NOT NULL,
    entry_timestamp TIMESTAMPTZ NOT NULL,
    exit_timestamp  TIMESTAMPTZ,
    position_size   NUMERIC NOT NULL,
    pnl             NUMERIC NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
";

const CREATE_TRADES_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS trades_owner_entry_idx
    ON trades (user_id, strategy_id, entry_timestamp, id)
";

/// Owns the connection pool. Handed explicitly to whatever needs storage.
#[derive(Debug, Clone)]
pub struct DatabaseClient {
    pool: PgPool,
}

impl DatabaseClient {
    /// Connects to the specified `PostgreSQL` database.
    ///
    /// # Errors
    /// Returns an error if the database connection cannot be established.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `trades` table and its ordering index if missing.
    ///
    /// # Errors
    /// Returns an error if either statement fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TRADES)
            .execute(&self.pool)
            .await
            .context("Failed to create trades table")?;
        sqlx::query(CREATE_TRADES_INDEX)
            .execute(&self.pool)
            .await
            .context("Failed to create trades index")?;
        tracing::info!("Database schema ready");
        Ok(())
    }

    #[must_use]
    pub fn trades(&self) -> TradeRepository {
        TradeRepository::new(self.pool.clone())
    }
}
