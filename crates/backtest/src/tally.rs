//! Win/loss partition shared by the aggregate and running statistics.

use kelly_journal_core::{kelly_fraction, Trade};
use rust_decimal::Decimal;

/// Running counts and magnitudes of winning and losing trades.
///
/// Breakeven trades are losses with zero magnitude. Sums are exact decimals so
/// long histories accumulate without drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinLossTally {
    wins: u64,
    win_total: Decimal,
    losses: u64,
    loss_total: Decimal,
}

impl WinLossTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Full rescan of `trades`.
    #[must_use]
    pub fn from_trades(trades: &[Trade]) -> Self {
        trades.iter().fold(Self::new(), |mut tally, trade| {
            tally.record(trade.pnl);
            tally
        })
    }

    pub fn record(&mut self, pnl: Decimal) {
        if pnl > Decimal::ZERO {
            self.wins += 1;
            self.win_total = self.win_total.saturating_add(pnl);
        } else {
            self.losses += 1;
            self.loss_total = self.loss_total.saturating_add(pnl.abs());
        }
    }

    #[must_use]
    pub fn wins(&self) -> u64 {
        self.wins
    }

    #[must_use]
    pub fn losses(&self) -> u64 {
        self.losses
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.wins + self.losses
    }

    /// Sum of winning P&L.
    #[must_use]
    pub fn win_total(&self) -> Decimal {
        self.win_total
    }

    /// Sum of losing P&L magnitudes.
    #[must_use]
    pub fn loss_total(&self) -> Decimal {
        self.loss_total
    }

    /// Zero when no trades were recorded.
    #[must_use]
    pub fn win_rate(&self) -> Decimal {
        if self.count() == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.wins) / Decimal::from(self.count())
    }

    #[must_use]
    pub fn avg_win(&self) -> Decimal {
        if self.wins == 0 {
            return Decimal::ZERO;
        }
        self.win_total / Decimal::from(self.wins)
    }

    #[must_use]
    pub fn avg_loss(&self) -> Decimal {
        if self.losses == 0 {
            return Decimal::ZERO;
        }
        self.loss_total / Decimal::from(self.losses)
    }

    /// Average win over average loss, zero when the average loss is zero.
    ///
    /// Saturates at `Decimal::MAX` when a dust-sized average loss pushes the
    /// quotient out of range.
    #[must_use]
    pub fn win_loss_ratio(&self) -> Decimal {
        let avg_loss = self.avg_loss();
        if avg_loss.is_zero() {
            return Decimal::ZERO;
        }
        self.avg_win().checked_div(avg_loss).unwrap_or(Decimal::MAX)
    }

    /// Unclamped Kelly fraction from this tally's win rate and ratio.
    #[must_use]
    pub fn kelly(&self) -> Decimal {
        kelly_fraction(self.win_rate(), self.win_loss_ratio())
    }

    /// Net P&L: winning total minus losing magnitudes.
    #[must_use]
    pub fn net_pnl(&self) -> Decimal {
        self.win_total - self.loss_total
    }
}
