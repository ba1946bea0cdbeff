#![allow(clippy::format_push_string)]

use rust_decimal::Decimal;

use crate::dashboard::Simulation;
use crate::equity::max_drawdown;

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────\n";

pub struct DashboardFormatter;

impl DashboardFormatter {
    #[must_use]
    pub fn format(sim: &Simulation) -> String {
        let stats = &sim.aggregate;
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str("                  KELLY SIZING REPORT                          \n");
        output.push_str(RULE);
        output.push('\n');

        output.push_str("Trade Statistics\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!("Total Trades:          {}\n", stats.total_trades));
        if stats.total_trades > 0 {
            output.push_str(&format!(
                "Win Rate:              {:.2}%\n",
                stats.win_rate * Decimal::ONE_HUNDRED
            ));
            output.push_str(&format!("Average Win:           ${:.2}\n", stats.avg_win));
            output.push_str(&format!("Average Loss:          ${:.2}\n", stats.avg_loss));
            output.push_str(&format!("Win/Loss Ratio:        {:.4}\n", stats.win_loss_ratio));
        } else {
            output.push_str("Win Rate:              N/A (no trades)\n");
        }
        match stats.kelly_percentage {
            Some(kelly) => output.push_str(&format!(
                "Kelly Fraction:        {:.2}%\n",
                kelly * Decimal::ONE_HUNDRED
            )),
            None => output.push_str("Kelly Fraction:        N/A (no winning trades)\n"),
        }
        output.push_str(&format!("Net P&L:               ${:.2}\n", stats.total_pnl));
        output.push('\n');

        output.push_str("Equity Curves\n");
        output.push_str(THIN_RULE);
        output.push_str(&format!(
            "Starting Capital:      ${:.2}\n",
            sim.starting_capital
        ));
        let last = sim.final_equity();
        Self::push_curve(
            &mut output,
            "Actual",
            last.actual,
            max_drawdown(sim.equity.iter().map(|p| p.actual)),
        );
        Self::push_curve(
            &mut output,
            "Full Kelly",
            last.optimal_kelly,
            max_drawdown(sim.equity.iter().map(|p| p.optimal_kelly)),
        );
        Self::push_curve(
            &mut output,
            "Half Kelly",
            last.half_kelly,
            max_drawdown(sim.equity.iter().map(|p| p.half_kelly)),
        );
        output.push_str(&format!(
            "Unsized Trades:        {} (no win/loss history yet)\n",
            sim.unsized_trades()
        ));

        output.push('\n');
        output.push_str(RULE);

        output
    }

    fn push_curve(output: &mut String, name: &str, final_equity: Decimal, drawdown: Decimal) {
        output.push_str(&format!(
            "{:<23}${:.2} (max drawdown {:.2}%)\n",
            format!("{name}:"),
            final_equity,
            drawdown * Decimal::ONE_HUNDRED
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardBuilder;
    use chrono::{Duration, TimeZone, Utc};
    use kelly_journal_core::Trade;
    use rust_decimal_macros::dec;

    #[test]
    fn report_lists_all_curves() {
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let trades: Vec<Trade> = [dec!(100), dec!(-50), dec!(100)]
            .iter()
            .enumerate()
            .map(|(i, pnl)| Trade::new("BTC", start + Duration::hours(i as i64), None, dec!(1), *pnl))
            .collect();

        let report = DashboardFormatter::format(&DashboardBuilder::default().simulate(&trades));

        assert!(report.contains("Total Trades:          3"));
        assert!(report.contains("Win/Loss Ratio:        2.0000"));
        assert!(report.contains("Net P&L:               $150.00"));
        assert!(report.contains("Actual:                $10150.00"));
        assert!(report.contains("Full Kelly:"));
        assert!(report.contains("Half Kelly:"));
        assert!(report.contains("Unsized Trades:        1"));
    }

    #[test]
    fn report_for_empty_history() {
        let report = DashboardFormatter::format(&DashboardBuilder::default().simulate(&[]));
        assert!(report.contains("Win Rate:              N/A (no trades)"));
        assert!(report.contains("Actual:                $10000.00"));
    }
}
