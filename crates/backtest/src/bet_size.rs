//! Actual risk taken per trade versus the half-Kelly recommendation.

use kelly_journal_core::{Trade, HALF_KELLY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::equity::EquityPoint;
use crate::running::WindowEstimate;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Percent of pre-trade equity at risk for one trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetSizePoint {
    /// Estimated capital at risk over actual equity before the trade, in percent
    pub actual_percent: Decimal,
    /// Half-Kelly percent recommended from the prefix, `None` if it could not be sized
    pub recommended_percent: Option<Decimal>,
}

pub struct BetSizeComparator;

impl BetSizeComparator {
    /// Capital the trade put at risk.
    ///
    /// Losses risked their full magnitude. For wins the risk is backed out of
    /// the profit using the whole-history win/loss ratio, or taken as the
    /// profit itself when that ratio is not positive.
    #[must_use]
    pub fn capital_at_risk(pnl: Decimal, aggregate_ratio: Decimal) -> Decimal {
        if pnl > Decimal::ZERO {
            if aggregate_ratio > Decimal::ZERO {
                pnl.checked_div(aggregate_ratio).unwrap_or(Decimal::MAX)
            } else {
                pnl
            }
        } else {
            pnl.abs()
        }
    }

    /// Percent of `equity_before` represented by `capital_at_risk`.
    ///
    /// Zero when the account had no positive equity to risk. Saturates at
    /// `Decimal::MAX` when the percentage is out of range.
    #[must_use]
    pub fn actual_percent(capital_at_risk: Decimal, equity_before: Decimal) -> Decimal {
        if equity_before <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        HUNDRED
            .saturating_mul(capital_at_risk)
            .checked_div(equity_before)
            .unwrap_or(Decimal::MAX)
    }

    #[must_use]
    pub fn recommended_percent(estimate: &WindowEstimate) -> Option<Decimal> {
        estimate
            .stats()
            .map(|stats| HUNDRED * (stats.kelly * HALF_KELLY).max(Decimal::ZERO))
    }

    /// One point per trade.
    ///
    /// `equity` is the simulated curve (`trades.len() + 1` points) and
    /// `estimates` the running estimate for each index.
    #[must_use]
    pub fn compare(
        trades: &[Trade],
        estimates: &[WindowEstimate],
        equity: &[EquityPoint],
        aggregate_ratio: Decimal,
    ) -> Vec<BetSizePoint> {
        trades
            .iter()
            .zip(estimates)
            .zip(equity)
            .map(|((trade, estimate), before)| {
                let risk = Self::capital_at_risk(trade.pnl, aggregate_ratio);
                BetSizePoint {
                    actual_percent: Self::actual_percent(risk, before.actual),
                    recommended_percent: Self::recommended_percent(estimate),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equity::EquityCurveSimulator;
    use crate::running::{InsufficientReason, RunningStatsEngine};
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn loss_risks_its_magnitude() {
        assert_eq!(BetSizeComparator::capital_at_risk(dec!(-80), dec!(2)), dec!(80));
        assert_eq!(BetSizeComparator::capital_at_risk(dec!(0), dec!(2)), dec!(0));
    }

    #[test]
    fn win_risk_uses_aggregate_ratio() {
        assert_eq!(BetSizeComparator::capital_at_risk(dec!(300), dec!(1.5)), dec!(200));
        assert_eq!(BetSizeComparator::capital_at_risk(dec!(300), dec!(0)), dec!(300));
    }

    #[test]
    fn actual_percent_guards_non_positive_equity() {
        assert_eq!(BetSizeComparator::actual_percent(dec!(50), dec!(10000)), dec!(0.5));
        assert_eq!(BetSizeComparator::actual_percent(dec!(50), dec!(0)), dec!(0));
        assert_eq!(BetSizeComparator::actual_percent(dec!(50), dec!(-10)), dec!(0));
    }

    #[test]
    fn recommendation_undefined_without_both_outcomes() {
        let estimate = WindowEstimate::Insufficient(InsufficientReason::NoLosses);
        assert_eq!(BetSizeComparator::recommended_percent(&estimate), None);
    }

    #[test]
    fn compare_uses_pre_trade_equity() {
        let start = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let trades: Vec<Trade> = [dec!(100), dec!(-50), dec!(100)]
            .iter()
            .enumerate()
            .map(|(i, pnl)| Trade::new("CL", start + Duration::days(i as i64), None, dec!(1), *pnl))
            .collect();
        let estimates = RunningStatsEngine::run(&trades);
        let equity = EquityCurveSimulator::simulate(dec!(10000), &trades, &estimates);

        let points = BetSizeComparator::compare(&trades, &estimates, &equity, dec!(2));

        assert_eq!(points.len(), 3);
        // 100 / 2 = 50 at risk on 10000
        assert_eq!(points[0].actual_percent, dec!(0.5));
        assert_eq!(points[0].recommended_percent, None);
        // 50 at risk on 10100
        assert_eq!(points[1].actual_percent, dec!(5000) / dec!(10100));
        // Half of f = 0.25
        assert_eq!(points[1].recommended_percent, Some(dec!(12.5)));
        // 50 at risk on 10050, half of f ~ 0.5
        assert_eq!(points[2].actual_percent, dec!(5000) / dec!(10050));
        let recommended = points[2].recommended_percent.unwrap();
        assert!((recommended - dec!(25)).abs() < dec!(0.000001));
    }

    #[test]
    fn out_of_range_risk_saturates() {
        let dust_ratio = Decimal::new(1, 28);
        assert_eq!(BetSizeComparator::capital_at_risk(dec!(1000), dust_ratio), Decimal::MAX);
        assert_eq!(BetSizeComparator::actual_percent(Decimal::MAX, dec!(0.5)), Decimal::MAX);
    }
}
