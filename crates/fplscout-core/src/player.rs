// Canonical player table and the normalization boundary that builds it.
//
// Raw elements arrive with loosely typed, frequently missing fields. This
// module is the only place those are defaulted; everything downstream works
// on `Player`.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoreError;
use crate::raw::{RawBootstrap, RawDecimal, RawElement};

/// Team name used when an element references a team id missing from the
/// bootstrap team list.
pub const UNKNOWN_TEAM: &str = "Unknown";

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Squad position. Exactly four, no overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    /// All positions in display order.
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Map the upstream `element_type` code (1 GK, 2 DEF, 3 MID, 4 FWD).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    /// Parse a short label such as "MID" (case-insensitive).
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GK" | "GKP" => Some(Position::Goalkeeper),
            "DEF" => Some(Position::Defender),
            "MID" => Some(Position::Midfielder),
            "FWD" => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Deterministic ordering index for lineup display.
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Goalkeeper => 0,
            Position::Defender => 1,
            Position::Midfielder => 2,
            Position::Forward => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

impl std::str::FromStr for Position {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_str_pos(s).ok_or_else(|| CoreError::UnknownPositionLabel(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Availability status. Codes outside the four known ones are kept verbatim
/// rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Available,
    Doubtful,
    Injured,
    Suspended,
    Unknown(String),
}

impl Status {
    pub fn from_code(code: &str) -> Self {
        match code {
            "a" => Status::Available,
            "d" => Status::Doubtful,
            "i" => Status::Injured,
            "s" => Status::Suspended,
            other => Status::Unknown(other.to_string()),
        }
    }

    /// Upstream single-letter code.
    pub fn code(&self) -> &str {
        match self {
            Status::Available => "a",
            Status::Doubtful => "d",
            Status::Injured => "i",
            Status::Suspended => "s",
            Status::Unknown(code) => code,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Available => "Available",
            Status::Doubtful => "Doubtful",
            Status::Injured => "Injured",
            Status::Suspended => "Suspended",
            Status::Unknown(_) => "Unknown",
        }
    }

    /// Issue severity, lower is worse. Fixed table:
    /// injured 0, suspended 1, doubtful 2, available 3, anything else 4.
    pub fn severity_rank(&self) -> u8 {
        match self {
            Status::Injured => 0,
            Status::Suspended => 1,
            Status::Doubtful => 2,
            Status::Available => 3,
            Status::Unknown(_) => 4,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Status::Available)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One league player, fully typed. Rebuilt from scratch on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    /// Short display name (`web_name`).
    pub name: String,
    pub full_name: String,
    pub team_id: u32,
    pub team: String,
    pub position: Position,
    /// Price in currency units (raw tenths / 10).
    pub price: f64,
    pub form: f64,
    /// Expected points for the next fixture.
    pub ep_next: f64,
    pub total_points: i32,
    /// Points in the current gameweek. Can be negative.
    pub event_points: i32,
    pub points_per_game: f64,
    pub status: Status,
    /// Always present; empty when upstream sent nothing.
    pub news: String,
    pub chance_of_playing_next: Option<u8>,
    pub transfers_in_event: u64,
}

impl Player {
    /// Whether this player belongs in an issue report.
    pub fn has_issue(&self) -> bool {
        !self.status.is_available() || !self.news.is_empty()
    }
}

/// Lookup table from player id to canonical player.
#[derive(Debug, Clone, Default)]
pub struct PlayerIndex {
    by_id: HashMap<u32, Player>,
}

impl PlayerIndex {
    pub fn get(&self, id: u32) -> Option<&Player> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<Player> for PlayerIndex {
    fn from_iter<I: IntoIterator<Item = Player>>(iter: I) -> Self {
        Self {
            by_id: iter.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}

impl<'a> FromIterator<&'a Player> for PlayerIndex {
    fn from_iter<I: IntoIterator<Item = &'a Player>>(iter: I) -> Self {
        iter.into_iter().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Build the team id -> name map from a bootstrap payload.
pub fn team_names(bootstrap: &RawBootstrap) -> HashMap<u32, String> {
    bootstrap
        .teams
        .iter()
        .map(|t| (t.id, t.name.clone()))
        .collect()
}

/// Normalize every element of a bootstrap payload, preserving input order.
///
/// Fails on the first element that violates the payload contract.
pub fn normalize_players(bootstrap: &RawBootstrap) -> Result<Vec<Player>, CoreError> {
    let teams = team_names(bootstrap);
    bootstrap
        .elements
        .iter()
        .map(|raw| normalize_player(raw, &teams))
        .collect()
}

/// Normalize one raw element.
///
/// Sparse numeric fields default to zero, news defaults to the empty string.
/// Missing identity fields, unknown position codes, negative prices and
/// non-numeric decimal strings are errors.
pub fn normalize_player(
    raw: &RawElement,
    teams: &HashMap<u32, String>,
) -> Result<Player, CoreError> {
    let id = raw.id.ok_or(CoreError::MissingField {
        id: None,
        field: "id",
    })?;
    let name = raw.web_name.clone().ok_or(CoreError::MissingField {
        id: Some(id),
        field: "web_name",
    })?;
    let code = raw.element_type.ok_or(CoreError::MissingField {
        id: Some(id),
        field: "element_type",
    })?;
    let position = Position::from_code(code).ok_or(CoreError::UnknownPosition { id, code })?;

    let tenths = raw.now_cost.unwrap_or(0);
    if tenths < 0 {
        return Err(CoreError::NegativePrice { id, tenths });
    }

    let team_id = raw.team.unwrap_or(0);
    let team = match teams.get(&team_id) {
        Some(name) => name.clone(),
        None => {
            warn!("element {} references unknown team id {}", id, team_id);
            UNKNOWN_TEAM.to_string()
        }
    };

    Ok(Player {
        id,
        full_name: full_name(raw, &name),
        name,
        team_id,
        team,
        position,
        price: tenths_to_price(tenths),
        form: decimal(id, "form", raw.form.as_ref())?,
        ep_next: decimal(id, "ep_next", raw.ep_next.as_ref())?,
        total_points: raw.total_points.unwrap_or(0),
        event_points: raw.event_points.unwrap_or(0),
        points_per_game: decimal(id, "points_per_game", raw.points_per_game.as_ref())?,
        status: Status::from_code(raw.status.as_deref().unwrap_or("")),
        news: raw.news.clone().unwrap_or_default(),
        chance_of_playing_next: raw.chance_of_playing_next_round,
        transfers_in_event: raw.transfers_in_event.unwrap_or(0),
    })
}

/// Convert an upstream tenths value into currency units.
pub fn tenths_to_price(tenths: i64) -> f64 {
    tenths as f64 / 10.0
}

fn decimal(id: u32, field: &'static str, value: Option<&RawDecimal>) -> Result<f64, CoreError> {
    match value {
        None => Ok(0.0),
        Some(raw) => match raw.parse() {
            Ok(v) => Ok(v.unwrap_or(0.0)),
            Err(value) => Err(CoreError::InvalidDecimal { id, field, value }),
        },
    }
}

fn full_name(raw: &RawElement, fallback: &str) -> String {
    let joined = [raw.first_name.as_deref(), raw.second_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
