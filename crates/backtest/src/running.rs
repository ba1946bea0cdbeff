//! Point-in-time statistics for each prefix of the trade history.
//!
//! The estimate for index `i` is built from `trades[0..=i]` and nothing
//! after it. [`RunningStatsEngine::push`] keeps running sums so a full
//! history costs O(n); [`RunningStatsEngine::estimate_prefix`] rescans the
//! prefix and is kept as the reference computation.

use kelly_journal_core::{clamp_to_bet, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tally::WinLossTally;

/// Minimum prefix length before any sizing is attempted.
pub const MIN_WINDOW_TRADES: u64 = 2;

/// Statistics for a prefix that contains at least one win and one loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Length of the prefix these stats were computed from
    pub trades: u64,
    pub win_rate: Decimal,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    /// Zero when the average loss is zero
    pub win_loss_ratio: Decimal,
    /// Raw Kelly estimate, may be negative
    pub kelly: Decimal,
    /// `max(0, kelly)`
    pub kelly_fraction: Decimal,
}

/// Why a prefix could not be sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsufficientReason {
    /// Fewer than [`MIN_WINDOW_TRADES`] trades
    TooFewTrades,
    /// Every trade so far lost or broke even
    NoWins,
    /// Every trade so far won
    NoLosses,
}

/// Outcome of estimating one prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowEstimate {
    Sized(WindowStats),
    Insufficient(InsufficientReason),
}

impl WindowEstimate {
    fn from_tally(tally: &WinLossTally) -> Self {
        if tally.count() < MIN_WINDOW_TRADES {
            return Self::Insufficient(InsufficientReason::TooFewTrades);
        }
        if tally.wins() == 0 {
            return Self::Insufficient(InsufficientReason::NoWins);
        }
        if tally.losses() == 0 {
            return Self::Insufficient(InsufficientReason::NoLosses);
        }

        let kelly = tally.kelly();
        Self::Sized(WindowStats {
            trades: tally.count(),
            win_rate: tally.win_rate(),
            avg_win: tally.avg_win(),
            avg_loss: tally.avg_loss(),
            win_loss_ratio: tally.win_loss_ratio(),
            kelly,
            kelly_fraction: clamp_to_bet(kelly),
        })
    }

    #[must_use]
    pub fn stats(&self) -> Option<&WindowStats> {
        match self {
            Self::Sized(stats) => Some(stats),
            Self::Insufficient(_) => None,
        }
    }

    /// Fraction of equity to risk. Zero when the window cannot be sized.
    #[must_use]
    pub fn kelly_fraction_to_bet(&self) -> Decimal {
        self.stats().map_or(Decimal::ZERO, |s| s.kelly_fraction)
    }

    #[must_use]
    pub fn is_sized(&self) -> bool {
        matches!(self, Self::Sized(_))
    }
}

/// Incremental prefix estimator.
#[derive(Debug, Clone, Default)]
pub struct RunningStatsEngine {
    tally: WinLossTally,
}

impl RunningStatsEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the prefix by `trade` and estimates the new prefix.
    pub fn push(&mut self, trade: &Trade) -> WindowEstimate {
        self.tally.record(trade.pnl);
        WindowEstimate::from_tally(&self.tally)
    }

    /// Estimates `prefix` from scratch.
    #[must_use]
    pub fn estimate_prefix(prefix: &[Trade]) -> WindowEstimate {
        WindowEstimate::from_tally(&WinLossTally::from_trades(prefix))
    }

    /// One estimate per index of `trades`.
    #[must_use]
    pub fn run(trades: &[Trade]) -> Vec<WindowEstimate> {
        let mut engine = Self::new();
        trades.iter().map(|trade| engine.push(trade)).collect()
    }
}
