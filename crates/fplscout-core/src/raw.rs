// Raw upstream payloads, as served by the fantasy API.
//
// Every field that is not an identity field is optional here. Nothing
// outside the normalization functions (player, fixtures, squad) reads these
// structs directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Loosely typed scalars
// ---------------------------------------------------------------------------

/// A decimal the API sends either as a JSON number or as a string ("5.0").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDecimal {
    Number(f64),
    Text(String),
}

impl RawDecimal {
    /// Parse into an f64. `Ok(None)` means "treat as missing" (blank text);
    /// `Err` carries the offending text.
    pub fn parse(&self) -> Result<Option<f64>, String> {
        match self {
            RawDecimal::Number(n) if n.is_finite() => Ok(Some(*n)),
            RawDecimal::Number(n) => Err(n.to_string()),
            RawDecimal::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                match trimmed.parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(Some(v)),
                    _ => Err(s.clone()),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// bootstrap-static
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBootstrap {
    #[serde(default)]
    pub elements: Vec<RawElement>,
    #[serde(default)]
    pub teams: Vec<RawTeam>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// One player record ("element") from bootstrap-static.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawElement {
    pub id: Option<u32>,
    pub web_name: Option<String>,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub team: Option<u32>,
    /// Position code: 1 GK, 2 DEF, 3 MID, 4 FWD.
    pub element_type: Option<i64>,
    /// Price in tenths of a currency unit.
    pub now_cost: Option<i64>,
    pub form: Option<RawDecimal>,
    pub ep_next: Option<RawDecimal>,
    pub points_per_game: Option<RawDecimal>,
    pub total_points: Option<i32>,
    pub event_points: Option<i32>,
    pub status: Option<String>,
    pub news: Option<String>,
    pub chance_of_playing_next_round: Option<u8>,
    pub transfers_in_event: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTeam {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
}

/// A gameweek ("event") descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: u32,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub finished: bool,
}

// ---------------------------------------------------------------------------
// fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFixture {
    #[serde(default)]
    pub id: Option<u32>,
    /// Gameweek; `None` while a fixture is unscheduled.
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    pub team_h_difficulty: Option<u8>,
    pub team_a_difficulty: Option<u8>,
    #[serde(default)]
    pub kickoff_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished: Option<bool>,
}

// ---------------------------------------------------------------------------
// entry + picks
// ---------------------------------------------------------------------------

/// Manager entry metadata from `/entry/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    pub id: u32,
    pub name: Option<String>,
    pub player_first_name: Option<String>,
    pub player_last_name: Option<String>,
    pub current_event: Option<u32>,
    pub summary_overall_rank: Option<u64>,
    pub summary_overall_points: Option<i64>,
}

/// Response of `/entry/{id}/event/{gw}/picks/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPicks {
    #[serde(default)]
    pub picks: Vec<RawPick>,
    pub active_chip: Option<String>,
    pub entry_history: Option<RawEntryHistory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPick {
    pub element: u32,
    /// Squad slot, 1..=15.
    pub position: i64,
    pub multiplier: Option<u8>,
    pub is_captain: Option<bool>,
    pub is_vice_captain: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntryHistory {
    pub points: Option<i32>,
    /// Money in the bank, in tenths.
    pub bank: Option<i64>,
    /// Squad value, in tenths.
    pub value: Option<i64>,
    pub event_transfers_cost: Option<i32>,
}
