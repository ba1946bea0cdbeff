//! Point-in-time performance statistics and Kelly sizing simulation.
//!
//! Every estimate used to size trade `i` comes from `trades[0..=i]`; the
//! input history is read in order and never reordered or modified.

pub mod bet_size;
pub mod dashboard;
pub mod equity;
pub mod metrics;
pub mod report;
pub mod running;
pub mod tally;

pub use bet_size::{BetSizeComparator, BetSizePoint};
pub use dashboard::{
    BetSizeData, ChartData, Dashboard, DashboardBuilder, DashboardStats, Simulation,
    DEFAULT_STARTING_CAPITAL,
};
pub use equity::{max_drawdown, EquityCurveSimulator, EquityPoint};
pub use metrics::{AggregateStats, AggregateStatsCalculator};
pub use report::DashboardFormatter;
pub use running::{InsufficientReason, RunningStatsEngine, WindowEstimate, WindowStats};
pub use tally::WinLossTally;
