// Issue flagging: players with a non-available status or any news text.

use crate::player::Player;

/// Default cap on the number of flagged players.
pub const DEFAULT_MAX_ISSUES: usize = 25;

/// Collect players with issues, worst first.
///
/// Selection: status is not available, or news is non-empty.
/// Ordering: status severity ascending (injured, suspended, doubtful,
/// available, unknown), then form descending. The sort is stable, so equal
/// keys keep input order. Truncation happens after ordering.
pub fn flag_issues<'a, I>(players: I, max_results: usize) -> Vec<&'a Player>
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut flagged: Vec<&Player> = players.into_iter().filter(|p| p.has_issue()).collect();
    flagged.sort_by(|a, b| {
        a.status
            .severity_rank()
            .cmp(&b.status.severity_rank())
            .then_with(|| b.form.total_cmp(&a.form))
    });
    flagged.truncate(max_results);
    flagged
}
