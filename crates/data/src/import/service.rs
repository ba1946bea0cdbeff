//! Import workflow: parse, validate, then persist atomically.

use super::{parse_trades_str, ImportError, ImportFormat};
use kelly_journal_core::{TradeOwner, TradeSink};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

/// Outcome of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub count: u64,
}

impl ImportSummary {
    #[must_use]
    pub fn message(&self) -> String {
        format!("Successfully imported {} trades.", self.count)
    }
}

#[derive(Debug, Error)]
pub enum ImportFailure {
    /// The file itself was unusable; nothing was stored.
    #[error(transparent)]
    Rejected(#[from] ImportError),

    #[error("A database error occurred. Could not import trades.")]
    Storage(anyhow::Error),
}

/// Parses `csv_text` in `format` and stores every trade for `owner`.
///
/// Validation runs over the whole file before the sink is touched, so a
/// failure of either kind leaves the journal unchanged.
///
/// # Errors
/// `Rejected` for unusable input, `Storage` when the sink fails.
pub async fn import_csv(
    sink: &dyn TradeSink,
    owner: TradeOwner,
    format: ImportFormat,
    csv_text: &str,
) -> Result<ImportSummary, ImportFailure> {
    let trades = match parse_trades_str(format, csv_text) {
        Ok(trades) => trades,
        Err(e) => {
            warn!(
                user_id = owner.user_id,
                strategy_id = owner.strategy_id,
                %format,
                row_errors = e.row_errors().len(),
                "CSV import rejected: {}",
                e
            );
            return Err(e.into());
        }
    };

    let count = sink.insert_batch(owner, &trades).await.map_err(|e| {
        error!(
            user_id = owner.user_id,
            strategy_id = owner.strategy_id,
            "Failed to store imported trades: {:#}",
            e
        );
        ImportFailure::Storage(e)
    })?;

    info!(
        user_id = owner.user_id,
        strategy_id = owner.strategy_id,
        %format,
        count,
        "Imported trades from CSV"
    );
    Ok(ImportSummary { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryTradeStore;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use kelly_journal_core::{NewTrade, TradeHistoryProvider};

    const OWNER: TradeOwner = TradeOwner::new(1, 7);

    const CSV: &str = "\
Asset,EntryTimestamp,ExitTimestamp,PositionSize,Pnl
AAPL,2024-03-02T14:30:00Z,,10,50
MSFT,2024-03-01T14:30:00Z,,10,-20
";

    struct BrokenSink;

    #[async_trait]
    impl TradeSink for BrokenSink {
        async fn insert_batch(&self, _owner: TradeOwner, _trades: &[NewTrade]) -> Result<u64> {
            Err(anyhow!("connection reset"))
        }

        async fn insert_one(&self, _owner: TradeOwner, _trade: &NewTrade) -> Result<()> {
            Err(anyhow!("connection reset"))
        }
    }

    #[tokio::test]
    async fn stores_all_rows() {
        let store = InMemoryTradeStore::new();

        let summary = import_csv(&store, OWNER, ImportFormat::Generic, CSV).await.unwrap();

        assert_eq!(summary.count, 2);
        assert_eq!(summary.message(), "Successfully imported 2 trades.");
        let stored = store.trades_for(OWNER).await.unwrap();
        assert_eq!(stored[0].asset, "MSFT");
        assert_eq!(stored[1].asset, "AAPL");
    }

    #[tokio::test]
    async fn invalid_file_stores_nothing() {
        let store = InMemoryTradeStore::new();
        let csv = format!("{CSV}TSLA,2024-03-03T14:30:00Z,,10,n/a\n");

        let err = import_csv(&store, OWNER, ImportFormat::Generic, &csv)
            .await
            .unwrap_err();

        match err {
            ImportFailure::Rejected(ImportError::Validation(rows)) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].row, 4);
            }
            other => panic!("unexpected failure: {other:?}"),
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn storage_failure_is_reported() {
        let err = import_csv(&BrokenSink, OWNER, ImportFormat::Generic, CSV)
            .await
            .unwrap_err();

        assert!(matches!(err, ImportFailure::Storage(_)));
        assert_eq!(
            err.to_string(),
            "A database error occurred. Could not import trades."
        );
    }

    #[tokio::test]
    async fn trades_are_scoped_to_owner() {
        let store = InMemoryTradeStore::new();
        import_csv(&store, OWNER, ImportFormat::Generic, CSV).await.unwrap();

        let other = store.trades_for(TradeOwner::new(1, 8)).await.unwrap();
        assert!(other.is_empty());
    }
}
