// Team reconstruction: join a manager's picks with the player index into an
// ordered squad view (starting XI + bench, captaincy, status).

use serde::Serialize;

use crate::error::CoreError;
use crate::issues::flag_issues;
use crate::player::{tenths_to_price, Player, PlayerIndex, Position, UNKNOWN_TEAM};
use crate::raw::{RawEntry, RawEntryHistory, RawPicks};

/// Last slot of the starting lineup; slots above it are the bench.
pub const STARTING_SLOTS: u8 = 11;
/// Number of slots in a full squad.
pub const SQUAD_SIZE: u8 = 15;
/// Display name for a pick whose player id is not in the index.
pub const UNKNOWN_PLAYER: &str = "Unknown";

/// Period used when neither the caller nor the entry names one (pre-season).
const FALLBACK_PERIOD: u32 = 1;

// ---------------------------------------------------------------------------
// Entry metadata
// ---------------------------------------------------------------------------

/// Manager entry metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryInfo {
    pub id: u32,
    pub team_name: String,
    pub manager_name: String,
    /// Current gameweek as reported upstream; `None` before the season starts.
    pub current_period: Option<u32>,
    pub overall_rank: Option<u64>,
    pub overall_points: i64,
}

impl EntryInfo {
    pub fn from_raw(raw: &RawEntry) -> Self {
        let manager_name = [raw.player_first_name.as_deref(), raw.player_last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            id: raw.id,
            team_name: raw.name.clone().unwrap_or_else(|| UNKNOWN_TEAM.to_string()),
            manager_name,
            current_period: raw.current_event,
            overall_rank: raw.summary_overall_rank,
            overall_points: raw.summary_overall_points.unwrap_or(0),
        }
    }
}

/// Resolve the gameweek to load: the caller's choice if given, else the
/// entry's current gameweek, else gameweek 1.
pub fn resolve_period(requested: Option<u32>, entry: &EntryInfo) -> u32 {
    requested
        .or(entry.current_period)
        .unwrap_or(FALLBACK_PERIOD)
}

// ---------------------------------------------------------------------------
// Picks
// ---------------------------------------------------------------------------

/// One slot of a manager's squad for one gameweek. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SquadPick {
    /// Player id.
    pub element: u32,
    /// Squad slot, 1..=15. 1-11 start, 12-15 bench in substitution order.
    pub slot: u8,
    pub is_captain: bool,
    pub is_vice_captain: bool,
    /// Points multiplier as reported upstream. Informational only.
    pub multiplier: u8,
}

impl SquadPick {
    pub fn is_starter(&self) -> bool {
        self.slot <= STARTING_SLOTS
    }
}

/// Convert raw picks, rejecting slots outside 1..=15.
pub fn squad_picks(raw: &RawPicks) -> Result<Vec<SquadPick>, CoreError> {
    raw.picks
        .iter()
        .map(|p| {
            let slot = u8::try_from(p.position)
                .ok()
                .filter(|s| (1..=SQUAD_SIZE).contains(s))
                .ok_or(CoreError::SlotOutOfRange {
                    element: p.element,
                    slot: p.position,
                })?;
            Ok(SquadPick {
                element: p.element,
                slot,
                is_captain: p.is_captain.unwrap_or(false),
                is_vice_captain: p.is_vice_captain.unwrap_or(false),
                multiplier: p.multiplier.unwrap_or(1),
            })
        })
        .collect()
}

/// Gameweek-level numbers attached to a picks response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameweekHistory {
    pub points: i32,
    pub bank: f64,
    pub squad_value: f64,
    pub transfers_cost: i32,
}

impl GameweekHistory {
    pub fn from_raw(raw: &RawEntryHistory) -> Self {
        Self {
            points: raw.points.unwrap_or(0),
            bank: tenths_to_price(raw.bank.unwrap_or(0)),
            squad_value: tenths_to_price(raw.value.unwrap_or(0)),
            transfers_cost: raw.event_transfers_cost.unwrap_or(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Squad view
// ---------------------------------------------------------------------------

/// A pick joined with its player, if the id resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SquadRow {
    pub pick: SquadPick,
    /// `None` when the pick referenced an id missing from the player index.
    pub player: Option<Player>,
}

impl SquadRow {
    pub fn is_resolved(&self) -> bool {
        self.player.is_some()
    }

    /// Player display name, or the "Unknown" placeholder.
    pub fn name(&self) -> &str {
        self.player
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or(UNKNOWN_PLAYER)
    }

    pub fn position(&self) -> Option<Position> {
        self.player.as_ref().map(|p| p.position)
    }
}

/// The reconstructed squad for one manager and one gameweek.
#[derive(Debug, Clone, PartialEq)]
pub struct SquadView {
    pub entry: EntryInfo,
    pub period: u32,
    /// Sorted by slot.
    pub rows: Vec<SquadRow>,
    pub active_chip: Option<String>,
    pub history: Option<GameweekHistory>,
}

impl SquadView {
    pub fn starting_xi(&self) -> impl Iterator<Item = &SquadRow> {
        self.rows.iter().filter(|r| r.pick.is_starter())
    }

    pub fn bench(&self) -> impl Iterator<Item = &SquadRow> {
        self.rows.iter().filter(|r| !r.pick.is_starter())
    }

    pub fn captain(&self) -> Option<&SquadRow> {
        self.rows.iter().find(|r| r.pick.is_captain)
    }

    pub fn vice_captain(&self) -> Option<&SquadRow> {
        self.rows.iter().find(|r| r.pick.is_vice_captain)
    }

    pub fn resolved_players(&self) -> impl Iterator<Item = &Player> {
        self.rows.iter().filter_map(|r| r.player.as_ref())
    }

    pub fn unresolved_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_resolved()).count()
    }

    /// Starting XI grouped GK, DEF, MID, FWD (slot order within a group).
    /// Unresolved starters are not placed in any group.
    pub fn starters_by_position(&self) -> Vec<(Position, Vec<&SquadRow>)> {
        Position::ALL
            .iter()
            .map(|&pos| {
                let rows = self
                    .starting_xi()
                    .filter(|r| r.position() == Some(pos))
                    .collect();
                (pos, rows)
            })
            .collect()
    }

    /// Squad-scoped issue list, same ordering as the league-wide one.
    pub fn issues(&self, max_results: usize) -> Vec<&Player> {
        flag_issues(self.resolved_players(), max_results)
    }

    pub fn summary(&self) -> SquadSummary {
        let players: Vec<&Player> = self.resolved_players().collect();
        let average_form = if players.is_empty() {
            0.0
        } else {
            players.iter().map(|p| p.form).sum::<f64>() / players.len() as f64
        };
        SquadSummary {
            total_value: players.iter().map(|p| p.price).sum(),
            average_form,
            total_ep_next: players.iter().map(|p| p.ep_next).sum(),
            issue_count: players.iter().filter(|p| !p.status.is_available()).count(),
            unresolved: self.unresolved_count(),
        }
    }
}

/// Aggregate numbers over the resolved players of a squad.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadSummary {
    pub total_value: f64,
    pub average_form: f64,
    pub total_ep_next: f64,
    /// Players whose status is anything other than available.
    pub issue_count: usize,
    pub unresolved: usize,
}

/// Join picks with the player index.
///
/// Unknown player ids do not fail the reconstruction: the row is kept with
/// no player. Captaincy flags are copied verbatim; see
/// [`captaincy_warnings`] for an explicit check.
pub fn reconstruct(
    picks: &[SquadPick],
    index: &PlayerIndex,
    entry: &EntryInfo,
    period: u32,
) -> SquadView {
    let mut rows: Vec<SquadRow> = picks
        .iter()
        .map(|pick| SquadRow {
            pick: *pick,
            player: index.get(pick.element).cloned(),
        })
        .collect();
    rows.sort_by_key(|r| r.pick.slot);

    SquadView {
        entry: entry.clone(),
        period,
        rows,
        active_chip: None,
        history: None,
    }
}

// ---------------------------------------------------------------------------
// Captaincy check
// ---------------------------------------------------------------------------

/// A captaincy anomaly in a set of picks. Reported, never enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptaincyWarning {
    NoCaptain,
    MultipleCaptains(Vec<u32>),
    MultipleViceCaptains(Vec<u32>),
    CaptainIsViceCaptain(u32),
}

impl std::fmt::Display for CaptaincyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptaincyWarning::NoCaptain => write!(f, "no captain set"),
            CaptaincyWarning::MultipleCaptains(ids) => write!(f, "multiple captains: {ids:?}"),
            CaptaincyWarning::MultipleViceCaptains(ids) => {
                write!(f, "multiple vice-captains: {ids:?}")
            }
            CaptaincyWarning::CaptainIsViceCaptain(id) => {
                write!(f, "element {id} is both captain and vice-captain")
            }
        }
    }
}

/// Check the at-most-one-captain, at-most-one-vice and captain != vice rules.
pub fn captaincy_warnings(picks: &[SquadPick]) -> Vec<CaptaincyWarning> {
    let captains: Vec<u32> = picks.iter().filter(|p| p.is_captain).map(|p| p.element).collect();
    let vices: Vec<u32> = picks
        .iter()
        .filter(|p| p.is_vice_captain)
        .map(|p| p.element)
        .collect();

    let mut warnings = Vec::new();
    match captains.len() {
        0 => warnings.push(CaptaincyWarning::NoCaptain),
        1 => {}
        _ => warnings.push(CaptaincyWarning::MultipleCaptains(captains.clone())),
    }
    if vices.len() > 1 {
        warnings.push(CaptaincyWarning::MultipleViceCaptains(vices.clone()));
    }
    for pick in picks.iter().filter(|p| p.is_captain && p.is_vice_captain) {
        warnings.push(CaptaincyWarning::CaptainIsViceCaptain(pick.element));
    }
    warnings
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawPick;
    use crate::testutil::{make_player, with_stats, with_status};

    fn entry(current: Option<u32>) -> EntryInfo {
        EntryInfo {
            id: 42,
            team_name: "Route One FC".into(),
            manager_name: "Sam Doe".into(),
            current_period: current,
            overall_rank: Some(120_000),
            overall_points: 410,
        }
    }

    fn make_pick(element: u32, slot: u8) -> SquadPick {
        SquadPick {
            element,
            slot,
            is_captain: false,
            is_vice_captain: false,
            multiplier: if slot <= STARTING_SLOTS { 1 } else { 0 },
        }
    }

    /// 2 GK, 5 DEF, 5 MID, 3 FWD with ids 1..=15; slots 1-11 line up 4-4-2.
    fn index() -> PlayerIndex {
        let positions = [
            Position::Goalkeeper,
            Position::Defender,
            Position::Defender,
            Position::Defender,
            Position::Defender,
            Position::Midfielder,
            Position::Midfielder,
            Position::Midfielder,
            Position::Midfielder,
            Position::Forward,
            Position::Forward,
            Position::Goalkeeper,
            Position::Defender,
            Position::Midfielder,
            Position::Forward,
        ];
        positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| {
                let id = i as u32 + 1;
                with_stats(make_player(id, &format!("P{id}"), pos, 5.0), 2.0, 3.0, 0)
            })
            .collect()
    }

    /// Picks for ids 1..=15 in slot order, deliberately shuffled.
    fn full_picks() -> Vec<SquadPick> {
        let mut picks: Vec<SquadPick> = (1..=15).map(|i| make_pick(i as u32, i)).collect();
        picks.reverse();
        picks.swap(0, 7);
        picks[5].is_captain = true;
        picks[5].multiplier = 2;
        picks[6].is_vice_captain = true;
        picks
    }

    #[test]
    fn resolve_period_prefers_request_then_current_then_first() {
        assert_eq!(resolve_period(Some(7), &entry(Some(12))), 7);
        assert_eq!(resolve_period(None, &entry(Some(12))), 12);
        assert_eq!(resolve_period(None, &entry(None)), 1);
    }

    #[test]
    fn rows_sorted_by_slot() {
        let view = reconstruct(&full_picks(), &index(), &entry(Some(3)), 3);
        let slots: Vec<u8> = view.rows.iter().map(|r| r.pick.slot).collect();
        assert_eq!(slots, (1..=15).collect::<Vec<u8>>());
        assert_eq!(view.period, 3);
    }

    #[test]
    fn slot_partition_eleven_and_four() {
        let view = reconstruct(&full_picks(), &index(), &entry(Some(3)), 3);
        assert_eq!(view.starting_xi().count(), 11);
        assert_eq!(view.bench().count(), 4);
        assert!(view.bench().all(|r| (12..=15).contains(&r.pick.slot)));
        let bench_ids: Vec<u32> = view.bench().map(|r| r.pick.element).collect();
        assert_eq!(bench_ids, vec![12, 13, 14, 15]);
    }

    #[test]
    fn unknown_reference_is_kept_as_unresolved_row() {
        let mut picks = full_picks();
        let slot4 = picks.iter_mut().find(|p| p.slot == 4).unwrap();
        slot4.element = 9_999;
        let view = reconstruct(&picks, &index(), &entry(Some(3)), 3);
        assert_eq!(view.rows.len(), 15);
        assert_eq!(view.unresolved_count(), 1);
        let row = &view.rows[3];
        assert!(!row.is_resolved());
        assert_eq!(row.name(), UNKNOWN_PLAYER);
        assert_eq!(row.pick.element, 9_999);
        assert_eq!(view.resolved_players().count(), 14);
    }

    #[test]
    fn captaincy_flags_pass_through() {
        let picks = full_picks();
        let captain_id = picks[5].element;
        let vice_id = picks[6].element;
        let view = reconstruct(&picks, &index(), &entry(Some(3)), 3);
        assert_eq!(view.captain().unwrap().pick.element, captain_id);
        assert_eq!(view.captain().unwrap().pick.multiplier, 2);
        assert_eq!(view.vice_captain().unwrap().pick.element, vice_id);
    }

    #[test]
    fn invalid_captaincy_is_not_rejected() {
        let mut picks = full_picks();
        for p in picks.iter_mut().take(3) {
            p.is_captain = true;
        }
        let view = reconstruct(&picks, &index(), &entry(Some(3)), 3);
        assert_eq!(view.rows.iter().filter(|r| r.pick.is_captain).count(), 4);
    }

    #[test]
    fn captaincy_warnings_on_valid_squad_are_empty() {
        assert!(captaincy_warnings(&full_picks()).is_empty());
    }

    #[test]
    fn captaincy_warnings_report_violations() {
        let mut picks: Vec<SquadPick> = (1..=15).map(|i| make_pick(i as u32, i)).collect();
        assert_eq!(captaincy_warnings(&picks), vec![CaptaincyWarning::NoCaptain]);

        picks[0].is_captain = true;
        picks[0].is_vice_captain = true;
        picks[1].is_captain = true;
        picks[2].is_vice_captain = true;
        let warnings = captaincy_warnings(&picks);
        assert!(warnings.contains(&CaptaincyWarning::MultipleCaptains(vec![1, 2])));
        assert!(warnings.contains(&CaptaincyWarning::MultipleViceCaptains(vec![1, 3])));
        assert!(warnings.contains(&CaptaincyWarning::CaptainIsViceCaptain(1)));
    }

    #[test]
    fn starters_grouped_by_position() {
        let view = reconstruct(&full_picks(), &index(), &entry(Some(3)), 3);
        let groups = view.starters_by_position();
        let counts: Vec<(Position, usize)> = groups.iter().map(|(p, r)| (*p, r.len())).collect();
        assert_eq!(
            counts,
            vec![
                (Position::Goalkeeper, 1),
                (Position::Defender, 4),
                (Position::Midfielder, 4),
                (Position::Forward, 2),
            ]
        );
    }

    #[test]
    fn squad_issues_and_summary() {
        let mut idx: Vec<Player> = (1..=15)
            .map(|id| with_stats(make_player(id, "P", Position::Midfielder, 6.0), 4.0, 2.0, 0))
            .collect();
        idx[2] = with_status(idx[2].clone(), "i", "Hamstring");
        idx[8] = with_status(idx[8].clone(), "a", "Illness, trained Friday");
        let index: PlayerIndex = idx.into_iter().collect();
        let mut picks = full_picks();
        picks.iter_mut().find(|p| p.slot == 15).unwrap().element = 500;

        let view = reconstruct(&picks, &index, &entry(Some(3)), 3);
        let issues: Vec<u32> = view.issues(25).iter().map(|p| p.id).collect();
        assert_eq!(issues, vec![3, 9]);

        let s = view.summary();
        assert!((s.total_value - 84.0).abs() < 1e-9);
        assert!((s.average_form - 4.0).abs() < 1e-9);
        assert!((s.total_ep_next - 28.0).abs() < 1e-9);
        assert_eq!(s.issue_count, 1);
        assert_eq!(s.unresolved, 1);
    }

    #[test]
    fn squad_picks_validates_slots() {
        let raw = RawPicks {
            picks: vec![
                RawPick {
                    element: 1,
                    position: 1,
                    multiplier: Some(2),
                    is_captain: Some(true),
                    is_vice_captain: None,
                },
                RawPick {
                    element: 2,
                    position: 12,
                    multiplier: None,
                    is_captain: None,
                    is_vice_captain: Some(true),
                },
            ],
            ..Default::default()
        };
        let picks = squad_picks(&raw).unwrap();
        assert_eq!(picks[0].multiplier, 2);
        assert!(picks[0].is_captain);
        assert!(!picks[1].is_captain);
        assert!(picks[1].is_vice_captain);
        assert!(!picks[1].is_starter());

        let bad = RawPicks {
            picks: vec![RawPick {
                element: 8,
                position: 16,
                multiplier: None,
                is_captain: None,
                is_vice_captain: None,
            }],
            ..Default::default()
        };
        assert_eq!(
            squad_picks(&bad).unwrap_err(),
            CoreError::SlotOutOfRange {
                element: 8,
                slot: 16
            }
        );
    }

    #[test]
    fn entry_info_from_sparse_raw() {
        let raw: RawEntry = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": "Route One FC",
            "player_first_name": "Sam",
            "player_last_name": "Doe"
        }))
        .unwrap();
        let info = EntryInfo::from_raw(&raw);
        assert_eq!(info.manager_name, "Sam Doe");
        assert_eq!(info.current_period, None);
        assert_eq!(info.overall_rank, None);
        assert_eq!(info.overall_points, 0);
    }

    #[test]
    fn history_converts_tenths() {
        let h = GameweekHistory::from_raw(&RawEntryHistory {
            points: Some(61),
            bank: Some(15),
            value: Some(1012),
            event_transfers_cost: Some(4),
        });
        assert!((h.bank - 1.5).abs() < 1e-9);
        assert!((h.squad_value - 101.2).abs() < 1e-9);
        assert_eq!(h.transfers_cost, 4);
    }
}
