//! Whole-history performance statistics.

use kelly_journal_core::Trade;
use rust_decimal::Decimal;

use crate::tally::WinLossTally;

/// Aggregate KPIs over a complete trade history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateStats {
    pub win_rate: Decimal,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub win_loss_ratio: Decimal,
    /// Full Kelly fraction for the whole history. `None` when the estimate is
    /// undefined (no winning trades), reported as zero downstream.
    pub kelly_percentage: Option<Decimal>,
    pub total_trades: usize,
    pub total_pnl: Decimal,
}

impl AggregateStats {
    /// Stats for an empty history.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            win_rate: Decimal::ZERO,
            avg_win: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            win_loss_ratio: Decimal::ZERO,
            kelly_percentage: Some(Decimal::ZERO),
            total_trades: 0,
            total_pnl: Decimal::ZERO,
        }
    }
}

pub struct AggregateStatsCalculator;

impl AggregateStatsCalculator {
    /// Single pass over the full history.
    ///
    /// A history with trades but no winners has a payoff ratio of exactly
    /// zero, which makes `W - (1 - W) / R` non-finite; that estimate is left
    /// undefined. A zero ratio caused by a zero average loss falls back to a
    /// ratio of 1 instead.
    #[must_use]
    pub fn calculate(trades: &[Trade]) -> AggregateStats {
        if trades.is_empty() {
            return AggregateStats::empty();
        }

        let tally = WinLossTally::from_trades(trades);

        let kelly_percentage = if tally.wins() == 0 {
            None
        } else {
            Some(tally.kelly())
        };

        AggregateStats {
            win_rate: tally.win_rate(),
            avg_win: tally.avg_win(),
            avg_loss: tally.avg_loss(),
            win_loss_ratio: tally.win_loss_ratio(),
            kelly_percentage,
            total_trades: trades.len(),
            total_pnl: tally.net_pnl(),
        }
    }
}
