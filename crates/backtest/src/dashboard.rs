//! Assembles the dashboard payload from a trade history.
//!
//! All arithmetic is done in [`Decimal`]; values become `f64` only when the
//! [`Dashboard`] DTO is built.

use kelly_journal_core::Trade;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bet_size::{BetSizeComparator, BetSizePoint};
use crate::equity::{EquityCurveSimulator, EquityPoint};
use crate::metrics::{AggregateStats, AggregateStatsCalculator};
use crate::running::{RunningStatsEngine, WindowEstimate};

/// Default capital every curve starts from.
pub const DEFAULT_STARTING_CAPITAL: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Full decimal result of one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub starting_capital: Decimal,
    pub aggregate: AggregateStats,
    /// One per trade
    pub windows: Vec<WindowEstimate>,
    /// One per trade plus the starting point
    pub equity: Vec<EquityPoint>,
    /// One per trade
    pub bet_sizes: Vec<BetSizePoint>,
}

impl Simulation {
    #[must_use]
    pub fn final_equity(&self) -> EquityPoint {
        self.equity
            .last()
            .copied()
            .unwrap_or_else(|| EquityPoint::flat(self.starting_capital))
    }

    /// Number of trades whose prefix could not be sized.
    #[must_use]
    pub fn unsized_trades(&self) -> usize {
        self.windows.iter().filter(|w| !w.is_sized()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub win_rate: f64,
    pub win_loss_ratio: f64,
    pub kelly_percentage: f64,
    pub total_trades: usize,
    pub total_pnl: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub labels: Vec<String>,
    pub actual_equity: Vec<f64>,
    pub optimal_kelly: Vec<f64>,
    pub half_kelly: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetSizeData {
    pub labels: Vec<String>,
    pub actual: Vec<f64>,
    pub recommended: Vec<Option<f64>>,
}

/// Payload consumed by the dashboard front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub chart_data: ChartData,
    pub bet_size_data: BetSizeData,
}

/// Converts at the output boundary. Anything not representable as a finite
/// `f64` is reported as zero.
fn to_number(value: Decimal) -> f64 {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn trade_labels(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Trade {i}")).collect()
}

impl From<&Simulation> for Dashboard {
    fn from(sim: &Simulation) -> Self {
        let aggregate = &sim.aggregate;
        let stats = DashboardStats {
            win_rate: to_number(aggregate.win_rate),
            win_loss_ratio: to_number(aggregate.win_loss_ratio),
            kelly_percentage: aggregate.kelly_percentage.map_or(0.0, to_number),
            total_trades: aggregate.total_trades,
            total_pnl: to_number(aggregate.total_pnl),
        };

        if aggregate.total_trades == 0 {
            return Self {
                stats,
                chart_data: ChartData::default(),
                bet_size_data: BetSizeData::default(),
            };
        }

        let labels = trade_labels(aggregate.total_trades);
        Self {
            stats,
            chart_data: ChartData {
                labels: labels.clone(),
                actual_equity: sim.equity.iter().map(|p| to_number(p.actual)).collect(),
                optimal_kelly: sim.equity.iter().map(|p| to_number(p.optimal_kelly)).collect(),
                half_kelly: sim.equity.iter().map(|p| to_number(p.half_kelly)).collect(),
            },
            bet_size_data: BetSizeData {
                labels,
                actual: sim.bet_sizes.iter().map(|b| to_number(b.actual_percent)).collect(),
                recommended: sim
                    .bet_sizes
                    .iter()
                    .map(|b| b.recommended_percent.map(to_number))
                    .collect(),
            },
        }
    }
}

/// Runs the full engine over an ordered history.
#[derive(Debug, Clone, Copy)]
pub struct DashboardBuilder {
    starting_capital: Decimal,
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_CAPITAL)
    }
}

impl DashboardBuilder {
    #[must_use]
    pub const fn new(starting_capital: Decimal) -> Self {
        Self { starting_capital }
    }

    #[must_use]
    pub const fn starting_capital(&self) -> Decimal {
        self.starting_capital
    }

    /// `trades` must already be ascending by entry time; the order is used as-is.
    #[must_use]
    pub fn simulate(&self, trades: &[Trade]) -> Simulation {
        let aggregate = AggregateStatsCalculator::calculate(trades);
        let windows = RunningStatsEngine::run(trades);
        let equity = EquityCurveSimulator::simulate(self.starting_capital, trades, &windows);
        let bet_sizes =
            BetSizeComparator::compare(trades, &windows, &equity, aggregate.win_loss_ratio);

        let sim = Simulation {
            starting_capital: self.starting_capital,
            aggregate,
            windows,
            equity,
            bet_sizes,
        };

        tracing::debug!(
            trades = trades.len(),
            unsized_trades = sim.unsized_trades(),
            "Simulated equity curves"
        );

        sim
    }

    #[must_use]
    pub fn build(&self, trades: &[Trade]) -> Dashboard {
        Dashboard::from(&self.simulate(trades))
    }
}
