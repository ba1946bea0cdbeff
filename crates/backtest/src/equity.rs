//! Equity curve simulation for actual, full-Kelly and half-Kelly sizing.
//!
//! The Kelly curves are compounding bankrolls: each trade risks a fraction of
//! the curve's own equity, and the realized trade only decides whether that
//! risk was won (paid at the running win/loss ratio) or lost.

use kelly_journal_core::{Trade, HALF_KELLY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::running::WindowEstimate;

/// Equity of each strategy at one point in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub actual: Decimal,
    pub optimal_kelly: Decimal,
    pub half_kelly: Decimal,
}

impl EquityPoint {
    #[must_use]
    pub fn flat(capital: Decimal) -> Self {
        Self {
            actual: capital,
            optimal_kelly: capital,
            half_kelly: capital,
        }
    }
}

/// Advances the three curves one trade at a time.
#[derive(Debug, Clone)]
pub struct EquityCurveSimulator {
    points: Vec<EquityPoint>,
}

impl EquityCurveSimulator {
    #[must_use]
    pub fn new(starting_capital: Decimal) -> Self {
        Self {
            points: vec![EquityPoint::flat(starting_capital)],
        }
    }

    #[must_use]
    pub fn with_capacity(starting_capital: Decimal, trades: usize) -> Self {
        let mut points = Vec::with_capacity(trades + 1);
        points.push(EquityPoint::flat(starting_capital));
        Self { points }
    }

    /// Latest point. The curve always holds the starting point.
    #[must_use]
    pub fn current(&self) -> EquityPoint {
        self.points[self.points.len() - 1]
    }

    /// Applies `trade` sized by `estimate`, the estimate for the same index.
    pub fn step(&mut self, trade: &Trade, estimate: &WindowEstimate) -> EquityPoint {
        let last = self.current();

        let next = match estimate.stats() {
            Some(stats) => {
                let full = stats.kelly_fraction;
                let won = trade.is_win();
                EquityPoint {
                    actual: last.actual.saturating_add(trade.pnl),
                    optimal_kelly: Self::simulate_bet(
                        last.optimal_kelly,
                        full,
                        stats.win_loss_ratio,
                        won,
                    ),
                    half_kelly: Self::simulate_bet(
                        last.half_kelly,
                        full * HALF_KELLY,
                        stats.win_loss_ratio,
                        won,
                    ),
                }
            }
            // No bet: Kelly curves carry forward unchanged
            None => EquityPoint {
                actual: last.actual.saturating_add(trade.pnl),
                ..last
            },
        };

        self.points.push(next);
        next
    }

    fn simulate_bet(equity: Decimal, fraction: Decimal, ratio: Decimal, won: bool) -> Decimal {
        let capital_to_risk = equity.saturating_mul(fraction);
        let pnl = if won {
            capital_to_risk.saturating_mul(ratio)
        } else {
            -capital_to_risk
        };
        equity.saturating_add(pnl)
    }

    /// Consumes the simulator, returning `n + 1` points.
    #[must_use]
    pub fn finish(self) -> Vec<EquityPoint> {
        self.points
    }

    /// Runs a whole history with its per-index estimates.
    #[must_use]
    pub fn simulate(
        starting_capital: Decimal,
        trades: &[Trade],
        estimates: &[WindowEstimate],
    ) -> Vec<EquityPoint> {
        let mut simulator = Self::with_capacity(starting_capital, trades.len());
        for (trade, estimate) in trades.iter().zip(estimates) {
            simulator.step(trade, estimate);
        }
        simulator.finish()
    }
}

/// Largest peak-to-trough decline as a fraction of the peak.
#[must_use]
pub fn max_drawdown(curve: impl IntoIterator<Item = Decimal>) -> Decimal {
    let mut max_drawdown = Decimal::ZERO;
    let mut peak: Option<Decimal> = None;

    for equity in curve {
        let high = match peak {
            Some(p) if p >= equity => p,
            _ => {
                peak = Some(equity);
                equity
            }
        };
        if high <= Decimal::ZERO {
            continue;
        }
        let drawdown = high
            .saturating_sub(equity)
            .checked_div(high)
            .unwrap_or(Decimal::MAX);
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }

    max_drawdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::running::RunningStatsEngine;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn trades(pnls: &[Decimal]) -> Vec<Trade> {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        pnls.iter()
            .enumerate()
            .map(|(i, pnl)| Trade::new("GBPUSD", start + Duration::hours(i as i64), None, dec!(1), *pnl))
            .collect()
    }

    fn simulate(pnls: &[Decimal]) -> Vec<EquityPoint> {
        let history = trades(pnls);
        let estimates = RunningStatsEngine::run(&history);
        EquityCurveSimulator::simulate(dec!(10000), &history, &estimates)
    }

    #[test]
    fn starts_at_starting_capital() {
        let points = simulate(&[]);
        assert_eq!(points, vec![EquityPoint::flat(dec!(10000))]);
    }

    #[test]
    fn kelly_curves_flat_while_insufficient() {
        let points = simulate(&[dec!(100), dec!(250)]);

        let actual: Vec<Decimal> = points.iter().map(|p| p.actual).collect();
        assert_eq!(actual, vec![dec!(10000), dec!(10100), dec!(10350)]);
        assert!(points.iter().all(|p| p.optimal_kelly == dec!(10000)));
        assert!(points.iter().all(|p| p.half_kelly == dec!(10000)));
    }

    #[test]
    fn losing_bet_risks_fraction_of_curve_equity() {
        // Index 1: W = 0.5, R = 2, f = 0.25, trade lost
        let points = simulate(&[dec!(100), dec!(-50)]);

        assert_eq!(points[2].actual, dec!(10050));
        assert_eq!(points[2].optimal_kelly, dec!(7500));
        assert_eq!(points[2].half_kelly, dec!(8750));
    }

    #[test]
    fn winning_bet_pays_running_ratio_and_compounds() {
        // Index 2: W = 2/3, R = 2, f ~ 0.5, trade won
        let points = simulate(&[dec!(100), dec!(-50), dec!(100)]);

        assert!((points[3].optimal_kelly - dec!(15000)).abs() < dec!(0.000001));
        // 8750 + 8750 * 0.25 * 2
        assert!((points[3].half_kelly - dec!(13125)).abs() < dec!(0.000001));
    }

    #[test]
    fn negative_edge_holds_kelly_curves() {
        let points = simulate(&[dec!(10), dec!(-100), dec!(-100), dec!(5)]);

        // Index 1 has f = 0.5 - 0.5 / 0.1 < 0, so nothing is risked anywhere
        assert!(points.iter().all(|p| p.optimal_kelly == dec!(10000)));
        assert_eq!(points[4].actual, dec!(9815));
    }

    #[test]
    fn actual_curve_is_exact_cumulative_sum() {
        let pnls: Vec<Decimal> = (0..500)
            .map(|i| if i % 3 == 0 { dec!(-0.07) } else { dec!(0.11) })
            .collect();
        let points = simulate(&pnls);

        for (i, pnl) in pnls.iter().enumerate() {
            assert_eq!(points[i + 1].actual, points[i].actual + *pnl);
        }
        let total: Decimal = pnls.iter().sum();
        assert_eq!(points[500].actual, dec!(10000) + total);
    }

    #[test]
    fn kelly_curves_never_go_negative() {
        let points = simulate(&[dec!(1), dec!(-1), dec!(-1), dec!(-1), dec!(50), dec!(-1), dec!(-1)]);
        assert!(points
            .iter()
            .all(|p| p.optimal_kelly >= Decimal::ZERO && p.half_kelly >= Decimal::ZERO));
    }

    #[test]
    fn drawdown_of_curve() {
        let curve = [dec!(100), dec!(120), dec!(90), dec!(130), dec!(117)];
        assert_eq!(max_drawdown(curve), dec!(0.25));
        assert_eq!(max_drawdown([dec!(100), dec!(100)]), Decimal::ZERO);
        assert_eq!(max_drawdown(Vec::<Decimal>::new()), Decimal::ZERO);
    }

    #[test]
    fn drawdown_saturates_on_extreme_curve() {
        let curve = [Decimal::new(1, 28), Decimal::MIN];
        assert_eq!(max_drawdown(curve), Decimal::MAX);
    }
}
