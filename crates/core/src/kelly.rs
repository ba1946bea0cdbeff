//! Kelly Criterion for trade-journal sizing.
//!
//! Sizes the next trade from a historical win rate and the average
//! win/average loss payoff ratio observed so far.

use rust_decimal::Decimal;

/// Multiplier applied to the full Kelly fraction for the half-Kelly strategy.
pub const HALF_KELLY: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Full Kelly fraction for a win probability `W` and payoff ratio `R`.
///
/// ```text
/// f* = W - (1 - W) / R
/// ```
///
/// A ratio of zero (no losses to divide by, or zero average loss) is replaced
/// by 1 instead of failing. The result is not clamped and may be negative.
///
/// # Examples
/// ```
/// use kelly_journal_core::kelly::kelly_fraction;
/// use rust_decimal_macros::dec;
///
/// // 50% winners that pay twice what the losers cost
/// assert_eq!(kelly_fraction(dec!(0.5), dec!(2)), dec!(0.25));
/// ```
#[must_use]
pub fn kelly_fraction(win_rate: Decimal, win_loss_ratio: Decimal) -> Decimal {
    let ratio = if win_loss_ratio.is_zero() {
        Decimal::ONE
    } else {
        win_loss_ratio
    };
    win_rate - (Decimal::ONE - win_rate) / ratio
}

/// Fraction of equity to put at risk. Negative expectancy means no bet.
#[must_use]
pub fn clamp_to_bet(kelly: Decimal) -> Decimal {
    kelly.max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // ============================================
    // Formula
    // ============================================

    #[test]
    fn kelly_even_money_coin_with_edge() {
        // W = 0.6, R = 1: f* = 0.6 - 0.4 = 0.2
        assert_eq!(kelly_fraction(dec!(0.6), dec!(1)), dec!(0.2));
    }

    #[test]
    fn kelly_high_payoff_ratio() {
        // W = 0.4, R = 3: f* = 0.4 - 0.6 / 3 = 0.2
        assert_eq!(kelly_fraction(dec!(0.4), dec!(3)), dec!(0.2));
    }

    #[test]
    fn kelly_negative_expectancy_is_negative() {
        // W = 0.3, R = 1: f* = 0.3 - 0.7 = -0.4
        assert_eq!(kelly_fraction(dec!(0.3), dec!(1)), dec!(-0.4));
    }

    #[test]
    fn kelly_certain_win_is_full_bankroll() {
        assert_eq!(kelly_fraction(dec!(1), dec!(2)), dec!(1));
    }

    // ============================================
    // Zero ratio fallback
    // ============================================

    #[test]
    fn kelly_zero_ratio_falls_back_to_one() {
        assert_eq!(kelly_fraction(dec!(0.75), Decimal::ZERO), dec!(0.5));
        assert_eq!(kelly_fraction(Decimal::ZERO, Decimal::ZERO), dec!(-1));
    }

    // ============================================
    // Clamping
    // ============================================

    #[test]
    fn clamp_drops_negative_edge() {
        assert_eq!(clamp_to_bet(dec!(-0.4)), Decimal::ZERO);
        assert_eq!(clamp_to_bet(dec!(0.25)), dec!(0.25));
        assert_eq!(clamp_to_bet(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn half_kelly_constant_is_one_half() {
        assert_eq!(HALF_KELLY, dec!(0.5));
    }
}
