// Shortlist selection: filter by position and price cap, score, rank.

use crate::player::{Player, Position};
use crate::scoring::{score, ScoreWeights};

/// A candidate player paired with its computed score.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortlistEntry {
    pub player: Player,
    pub score: f64,
}

/// Select the top `top_n` candidates at `position` priced at or below
/// `max_price`.
///
/// Ordering is descending by score. Equal scores keep their input order (the
/// sort is stable and there is no secondary key), so identical inputs always
/// produce identical output. An empty result is a normal outcome.
pub fn select(
    players: &[Player],
    position: Position,
    max_price: f64,
    top_n: usize,
    weights: &ScoreWeights,
) -> Vec<ShortlistEntry> {
    let mut entries: Vec<ShortlistEntry> = players
        .iter()
        .filter(|p| p.position == position && p.price <= max_price)
        .map(|p| ShortlistEntry {
            score: score(p, weights),
            player: p.clone(),
        })
        .collect();

    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries.truncate(top_n);
    entries
}
