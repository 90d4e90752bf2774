// Candidate desirability score.
//
// A weighted sum of next-fixture expected points (dominant), recent form
// (secondary) and transfers-in this gameweek (tie-breaker toward consensus
// picks; the weight is small enough that it never outranks the first two).

use serde::Deserialize;

use crate::player::Player;

/// Weights for the three score signals.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScoreWeights {
    pub expected_points_weight: f64,
    pub form_weight: f64,
    pub transfers_in_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            expected_points_weight: 0.6,
            form_weight: 0.3,
            transfers_in_weight: 0.0001,
        }
    }
}

/// Score one candidate. Pure: depends only on its arguments.
pub fn score(candidate: &Player, weights: &ScoreWeights) -> f64 {
    weights.expected_points_weight * candidate.ep_next
        + weights.form_weight * candidate.form
        + weights.transfers_in_weight * candidate.transfers_in_event as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Position, Status};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn make_player(ep_next: f64, form: f64, transfers_in_event: u64) -> Player {
        Player {
            id: 1,
            name: "Test".into(),
            full_name: "Test Player".into(),
            team_id: 1,
            team: "Arsenal".into(),
            position: Position::Midfielder,
            price: 5.0,
            form,
            ep_next,
            total_points: 0,
            event_points: 0,
            points_per_game: 0.0,
            status: Status::Available,
            news: String::new(),
            chance_of_playing_next: None,
            transfers_in_event,
        }
    }

    #[test]
    fn default_weights_known_value() {
        let p = make_player(5.0, 6.0, 100);
        assert!(approx_eq(score(&p, &ScoreWeights::default()), 4.81, 1e-9));
    }

    #[test]
    fn zero_transfers_is_scored_not_excluded() {
        let p = make_player(5.0, 6.0, 0);
        assert!(approx_eq(score(&p, &ScoreWeights::default()), 4.8, 1e-9));
    }

    #[test]
    fn score_is_strictly_monotonic_in_expected_points() {
        let w = ScoreWeights::default();
        let mut prev = score(&make_player(0.0, 4.0, 500), &w);
        for ep in [0.1, 1.0, 2.5, 7.0, 12.0] {
            let next = score(&make_player(ep, 4.0, 500), &w);
            assert!(next > prev, "score did not increase at ep_next={ep}");
            prev = next;
        }
    }

    #[test]
    fn popularity_only_breaks_near_ties() {
        let w = ScoreWeights::default();
        // 0.1 ep_next outweighs 500 extra transfers in.
        let better = make_player(5.1, 5.0, 0);
        let popular = make_player(5.0, 5.0, 500);
        assert!(score(&better, &w) > score(&popular, &w));
        // With equal signals the more popular pick wins.
        let popular_tie = make_player(5.1, 5.0, 10);
        assert!(score(&popular_tie, &w) > score(&better, &w));
    }

    #[test]
    fn score_is_pure() {
        let p = make_player(3.3, 2.2, 1234);
        let w = ScoreWeights::default();
        assert_eq!(score(&p, &w).to_bits(), score(&p, &w).to_bits());
    }

    #[test]
    fn custom_weights_apply() {
        let w = ScoreWeights {
            expected_points_weight: 1.0,
            form_weight: 0.0,
            transfers_in_weight: 0.0,
        };
        assert!(approx_eq(score(&make_player(7.5, 9.0, 9999), &w), 7.5, 1e-12));
    }
}
