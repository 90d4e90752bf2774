// Fixture difficulty outlook per team over a window of upcoming gameweeks.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::player::UNKNOWN_TEAM;
use crate::raw::{RawEvent, RawFixture};

/// A scheduled fixture. Unscheduled fixtures (no gameweek) are dropped
/// during normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub event: u32,
    pub home_team: u32,
    pub away_team: u32,
    pub home_difficulty: Option<u8>,
    pub away_difficulty: Option<u8>,
    pub kickoff: Option<DateTime<Utc>>,
    pub finished: bool,
}

pub fn normalize_fixtures(raw: &[RawFixture]) -> Vec<Fixture> {
    raw.iter()
        .filter_map(|f| {
            Some(Fixture {
                event: f.event?,
                home_team: f.team_h,
                away_team: f.team_a,
                home_difficulty: f.team_h_difficulty,
                away_difficulty: f.team_a_difficulty,
                kickoff: f.kickoff_time,
                finished: f.finished.unwrap_or(false),
            })
        })
        .collect()
}

/// First gameweek worth looking ahead from: the upcoming one if flagged,
/// else the current one, else 1.
pub fn next_event(events: &[RawEvent]) -> u32 {
    events
        .iter()
        .find(|e| e.is_next)
        .or_else(|| events.iter().find(|e| e.is_current))
        .map(|e| e.id)
        .unwrap_or(1)
}

/// One fixture from a single team's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamFixture {
    pub event: u32,
    pub opponent: String,
    pub home: bool,
    /// Difficulty rating for this team's side.
    pub difficulty: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamOutlook {
    pub team_id: u32,
    pub team: String,
    pub fixtures: Vec<TeamFixture>,
    /// Mean of the rated fixtures; `None` for a blank window.
    pub mean_difficulty: Option<f64>,
}

/// Build the outlook for every team across gameweeks
/// `from_event..from_event + horizon`.
///
/// Sorted easiest first; teams without a rated fixture in the window go last.
/// Ties break on team name.
pub fn team_outlook(
    fixtures: &[Fixture],
    teams: &HashMap<u32, String>,
    from_event: u32,
    horizon: u32,
) -> Vec<TeamOutlook> {
    let window = from_event..from_event.saturating_add(horizon);
    let team_name = |id: u32| {
        teams
            .get(&id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_TEAM.to_string())
    };

    let mut in_window: Vec<&Fixture> = fixtures
        .iter()
        .filter(|f| window.contains(&f.event))
        .collect();
    in_window.sort_by_key(|f| (f.event, f.kickoff));

    let mut outlook: Vec<TeamOutlook> = teams
        .keys()
        .map(|&team_id| {
            let team_fixtures: Vec<TeamFixture> = in_window
                .iter()
                .filter_map(|f| {
                    if f.home_team == team_id {
                        Some(TeamFixture {
                            event: f.event,
                            opponent: team_name(f.away_team),
                            home: true,
                            difficulty: f.home_difficulty,
                        })
                    } else if f.away_team == team_id {
                        Some(TeamFixture {
                            event: f.event,
                            opponent: team_name(f.home_team),
                            home: false,
                            difficulty: f.away_difficulty,
                        })
                    } else {
                        None
                    }
                })
                .collect();
            let rated: Vec<f64> = team_fixtures
                .iter()
                .filter_map(|f| f.difficulty.map(f64::from))
                .collect();
            let mean_difficulty = if rated.is_empty() {
                None
            } else {
                Some(rated.iter().sum::<f64>() / rated.len() as f64)
            };
            TeamOutlook {
                team_id,
                team: team_name(team_id),
                fixtures: team_fixtures,
                mean_difficulty,
            }
        })
        .collect();

    outlook.sort_by(|a, b| {
        let by_mean = match (a.mean_difficulty, b.mean_difficulty) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_mean.then_with(|| a.team.cmp(&b.team))
    });
    outlook
}
