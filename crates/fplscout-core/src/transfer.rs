// Transfer evaluation: is swapping one player for another worth the hit?

use crate::player::Player;

/// Points deducted per transfer beyond the free allowance.
pub const HIT_COST: i32 = 4;

/// Fixture-adjusted projection from points over the last four gameweeks.
///
/// Recent points are divided by the fixture difficulty (floored at 1) and a
/// half-point bonus is added for home games.
pub fn simple_expected_points(last4_pts: f64, fdr: f64, is_home: bool) -> f64 {
    let home_bonus = if is_home { 0.5 } else { 0.0 };
    last4_pts / fdr.max(1.0) + home_bonus
}

/// Net value of a move: expected gain minus the points paid for it.
pub fn transfer_value(expected_gain: f64, hit_cost: i32) -> f64 {
    expected_gain - f64::from(hit_cost)
}

/// Outcome of comparing an outgoing player with an incoming one.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferEvaluation {
    pub out_id: u32,
    pub in_id: u32,
    /// Incoming minus outgoing next-fixture expected points.
    pub expected_gain: f64,
    pub hit_cost: i32,
    pub net_value: f64,
    /// Incoming minus outgoing price; positive means it costs money.
    pub price_delta: f64,
}

impl TransferEvaluation {
    pub fn is_worth_it(&self) -> bool {
        self.net_value > 0.0
    }
}

/// Evaluate `out` -> `incoming` with `hits` paid transfers.
pub fn evaluate_transfer(out: &Player, incoming: &Player, hits: u32) -> TransferEvaluation {
    let expected_gain = incoming.ep_next - out.ep_next;
    let hit_cost = HIT_COST.saturating_mul(i32::try_from(hits).unwrap_or(i32::MAX));
    TransferEvaluation {
        out_id: out.id,
        in_id: incoming.id,
        expected_gain,
        hit_cost,
        net_value: transfer_value(expected_gain, hit_cost),
        price_delta: incoming.price - out.price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Position;
    use crate::testutil::{make_player, with_stats};

    #[test]
    fn projection_scales_by_difficulty() {
        assert!((simple_expected_points(20.0, 4.0, false) - 5.0).abs() < 1e-12);
        assert!((simple_expected_points(20.0, 4.0, true) - 5.5).abs() < 1e-12);
    }

    #[test]
    fn projection_floors_difficulty_at_one() {
        assert!((simple_expected_points(12.0, 0.0, false) - 12.0).abs() < 1e-12);
        assert!((simple_expected_points(12.0, 0.5, true) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn value_subtracts_hit() {
        assert!((transfer_value(6.5, 4) - 2.5).abs() < 1e-12);
        assert!((transfer_value(1.0, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn free_transfer_with_gain_is_worth_it() {
        let out = with_stats(make_player(1, "Out", Position::Forward, 7.5), 2.0, 2.0, 0);
        let incoming = with_stats(make_player(2, "In", Position::Forward, 8.0), 6.0, 5.5, 0);
        let eval = evaluate_transfer(&out, &incoming, 0);
        assert!((eval.expected_gain - 3.5).abs() < 1e-9);
        assert_eq!(eval.hit_cost, 0);
        assert!(eval.is_worth_it());
        assert!((eval.price_delta - 0.5).abs() < 1e-9);
    }

    #[test]
    fn hit_can_wipe_out_gain() {
        let out = with_stats(make_player(1, "Out", Position::Forward, 7.5), 2.0, 2.0, 0);
        let incoming = with_stats(make_player(2, "In", Position::Forward, 7.0), 6.0, 5.5, 0);
        let eval = evaluate_transfer(&out, &incoming, 1);
        assert_eq!(eval.hit_cost, 4);
        assert!((eval.net_value - -0.5).abs() < 1e-9);
        assert!(!eval.is_worth_it());
    }
}
