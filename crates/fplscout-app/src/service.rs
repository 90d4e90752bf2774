// Service layer: each operation fetches what it needs through an `FplSource`,
// runs the core transforms and, when configured, asks the LLM for prose.
//
// Operations run to completion one at a time. The only state carried between
// calls is the news digest cache, which the caller owns and lends in.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use fplscout_core::cache::TtlCache;
use fplscout_core::config::{Config, RecommendConfig};
use fplscout_core::fixtures::{next_event, normalize_fixtures, team_outlook, TeamOutlook};
use fplscout_core::issues::flag_issues;
use fplscout_core::player::{normalize_players, team_names, Player, PlayerIndex, Position};
use fplscout_core::raw::RawBootstrap;
use fplscout_core::shortlist::{select, ShortlistEntry};
use fplscout_core::squad::{
    captaincy_warnings, reconstruct, resolve_period, squad_picks, EntryInfo, GameweekHistory,
    SquadView,
};
use fplscout_core::transfer::{evaluate_transfer, TransferEvaluation};
use fplscout_core::CoreError;
use fplscout_llm::client::LlmClient;
use fplscout_llm::prompt;

use crate::api::{FetchError, FplSource};

/// Longest fixture window accepted; a season has 38 gameweeks.
pub const MAX_HORIZON: u32 = 38;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed league data: {0}")]
    Data(#[from] CoreError),

    #[error("invalid request: {0}")]
    Request(String),
}

impl ScoutError {
    /// One-line suggestion shown to the user under the error.
    pub fn hint(&self) -> &'static str {
        match self {
            ScoutError::Fetch(e) if e.is_not_found() => "check the entry id and gameweek",
            ScoutError::Fetch(FetchError::Transport { .. }) => {
                "check your network connection, or raise api.timeout_secs in config/fplscout.toml"
            }
            ScoutError::Fetch(FetchError::Status { .. }) => {
                "the game API may be updating between gameweeks; try again in a few minutes"
            }
            ScoutError::Fetch(FetchError::Decode { .. }) | ScoutError::Data(_) => {
                "the game API returned data in an unexpected shape; try again later"
            }
            ScoutError::Fetch(FetchError::Client(_)) => {
                "check the [api] section of config/fplscout.toml"
            }
            ScoutError::Request(_) => "check the command arguments",
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Normalized league-wide data from one bootstrap fetch.
#[derive(Debug, Clone)]
pub struct LeagueData {
    pub players: Vec<Player>,
    pub index: PlayerIndex,
    pub teams: HashMap<u32, String>,
    /// First gameweek still to be played.
    pub next_event: u32,
}

impl LeagueData {
    fn from_bootstrap(bootstrap: &RawBootstrap) -> Result<Self, CoreError> {
        let players = normalize_players(bootstrap)?;
        let index = players.iter().collect();
        Ok(Self {
            players,
            index,
            teams: team_names(bootstrap),
            next_event: next_event(&bootstrap.events),
        })
    }
}

/// League-wide availability digest.
#[derive(Debug, Clone)]
pub struct NewsDigest {
    /// Flagged players, most severe first.
    pub issues: Vec<Player>,
    /// Deterministic rendering of `issues`.
    pub issues_text: String,
    /// LLM summary; `None` when the LLM is disabled or the call failed.
    pub summary: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendRequest {
    pub position: Position,
    pub max_price: f64,
    pub top_n: usize,
    pub use_llm: bool,
}

impl RecommendRequest {
    pub fn from_config(config: &RecommendConfig) -> Self {
        Self {
            position: config.position,
            max_price: config.max_price,
            top_n: config.top_n,
            use_llm: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub request: RecommendRequest,
    pub shortlist: Vec<ShortlistEntry>,
    pub table: String,
    pub advice: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FixtureOutlook {
    pub from_event: u32,
    pub horizon: u32,
    pub teams: Vec<TeamOutlook>,
}

#[derive(Debug, Clone)]
pub struct TransferReport {
    pub out: Player,
    pub incoming: Player,
    pub evaluation: TransferEvaluation,
}

// ---------------------------------------------------------------------------
// Scout
// ---------------------------------------------------------------------------

pub struct Scout<S> {
    source: S,
    config: Config,
    llm: LlmClient,
}

impl<S: FplSource> Scout<S> {
    pub fn new(source: S, config: Config, llm: LlmClient) -> Self {
        Self {
            source,
            config,
            llm,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and normalize league-wide data.
    pub async fn league(&self) -> Result<LeagueData, ScoutError> {
        let bootstrap = self.source.bootstrap().await?;
        let league = LeagueData::from_bootstrap(&bootstrap)?;
        info!(
            players = league.players.len(),
            teams = league.teams.len(),
            next_event = league.next_event,
            "league data loaded"
        );
        Ok(league)
    }

    /// League-wide issues plus an optional summary, served from `cache`
    /// while it is fresh.
    pub async fn news_digest(
        &self,
        cache: &mut TtlCache<NewsDigest>,
        now: Instant,
    ) -> Result<NewsDigest, ScoutError> {
        if let Some(digest) = cache.get(now) {
            debug!(age = ?cache.age(now), "news digest served from cache");
            return Ok(digest.clone());
        }

        let league = self.league().await?;
        let issues: Vec<Player> = flag_issues(&league.players, self.config.news.max_issues)
            .into_iter()
            .cloned()
            .collect();
        let refs: Vec<&Player> = issues.iter().collect();
        let issues_text = prompt::issues_text(&refs);
        info!(flagged = issues.len(), "news issues flagged");

        let answer = if issues.is_empty() {
            LlmAnswer::Skipped
        } else {
            self.ask_llm(
                "news summary",
                &prompt::news_system_prompt(),
                &prompt::news_prompt(&issues_text),
                self.config.llm.news_max_tokens,
                prompt::NEWS_TEMPERATURE,
            )
            .await
        };
        let failed = answer == LlmAnswer::Failed;

        let digest = NewsDigest {
            issues,
            issues_text,
            summary: answer.into_text(),
            generated_at: Utc::now(),
        };
        // A failed summary is retried on the next call.
        if failed {
            debug!("news digest not cached after LLM failure");
        } else {
            cache.insert(digest.clone(), now);
        }
        Ok(digest)
    }

    /// Shortlist for `request` from freshly fetched data. Never cached.
    pub async fn recommend(&self, request: RecommendRequest) -> Result<Recommendation, ScoutError> {
        if request.top_n == 0 {
            return Err(ScoutError::Request("top_n must be at least 1".into()));
        }
        if !(request.max_price >= 0.0) {
            return Err(ScoutError::Request(format!(
                "max price must not be negative, got {}",
                request.max_price
            )));
        }

        let league = self.league().await?;
        let shortlist = select(
            &league.players,
            request.position,
            request.max_price,
            request.top_n,
            &self.config.scoring,
        );
        let table = prompt::shortlist_table(&shortlist);
        info!(
            position = %request.position,
            max_price = request.max_price,
            candidates = shortlist.len(),
            "shortlist selected"
        );

        let advice = if request.use_llm && !shortlist.is_empty() {
            self.ask_llm(
                "recommendation",
                &prompt::recommend_system_prompt(),
                &prompt::recommendation_prompt(request.position, request.max_price, &table),
                self.config.llm.recommend_max_tokens,
                prompt::RECOMMEND_TEMPERATURE,
            )
            .await
            .into_text()
        } else {
            None
        };

        Ok(Recommendation {
            request,
            shortlist,
            table,
            advice,
        })
    }

    /// Reconstruct a manager's squad for `period`, or for the entry's current
    /// gameweek when `period` is `None`.
    pub async fn load_team(
        &self,
        entry_id: u32,
        period: Option<u32>,
    ) -> Result<SquadView, ScoutError> {
        let entry = EntryInfo::from_raw(&self.source.entry(entry_id).await?);
        let period = resolve_period(period, &entry);
        debug!(entry_id, period, "period resolved");

        let raw_picks = self.source.picks(entry_id, period).await?;
        let picks = squad_picks(&raw_picks)?;
        for warning in captaincy_warnings(&picks) {
            warn!(entry_id, period, %warning, "captaincy anomaly");
        }

        let league = self.league().await?;
        let mut view = reconstruct(&picks, &league.index, &entry, period);
        view.active_chip = raw_picks.active_chip.clone();
        view.history = raw_picks.entry_history.as_ref().map(GameweekHistory::from_raw);

        let unresolved = view.unresolved_count();
        if unresolved > 0 {
            warn!(entry_id, period, unresolved, "picks reference unknown players");
        }
        info!(
            entry_id,
            period,
            team = %view.entry.team_name,
            picks = view.rows.len(),
            "squad reconstructed"
        );
        Ok(view)
    }

    /// Fixture difficulty per team over the next `horizon` gameweeks
    /// (configured default when `None`).
    pub async fn fixture_outlook(
        &self,
        horizon: Option<u32>,
    ) -> Result<FixtureOutlook, ScoutError> {
        let horizon = horizon.unwrap_or(self.config.fixtures.horizon);
        if !(1..=MAX_HORIZON).contains(&horizon) {
            return Err(ScoutError::Request(format!(
                "horizon must be between 1 and {MAX_HORIZON}, got {horizon}"
            )));
        }

        let bootstrap = self.source.bootstrap().await?;
        let raw_fixtures = self.source.fixtures().await?;
        let fixtures = normalize_fixtures(&raw_fixtures);
        let from_event = next_event(&bootstrap.events);
        debug!(
            fixtures = fixtures.len(),
            dropped = raw_fixtures.len() - fixtures.len(),
            from_event,
            "fixtures normalized"
        );

        let teams = team_outlook(&fixtures, &team_names(&bootstrap), from_event, horizon);
        Ok(FixtureOutlook {
            from_event,
            horizon,
            teams,
        })
    }

    /// Compare swapping `out_id` for `in_id` at a cost of `hits` paid
    /// transfers.
    pub async fn evaluate_transfer(
        &self,
        out_id: u32,
        in_id: u32,
        hits: u32,
    ) -> Result<TransferReport, ScoutError> {
        if out_id == in_id {
            return Err(ScoutError::Request(format!(
                "player {out_id} cannot be swapped for themselves"
            )));
        }
        let league = self.league().await?;
        let lookup = |id: u32| {
            league
                .index
                .get(id)
                .cloned()
                .ok_or_else(|| ScoutError::Request(format!("unknown player id {id}")))
        };
        let out = lookup(out_id)?;
        let incoming = lookup(in_id)?;
        let evaluation = evaluate_transfer(&out, &incoming, hits);
        debug!(
            out_id,
            in_id,
            hits,
            net = evaluation.net_value,
            "transfer evaluated"
        );
        Ok(TransferReport {
            out,
            incoming,
            evaluation,
        })
    }

    /// Run one completion. A failed or disabled LLM degrades to `None`.
    async fn ask_llm(
        &self,
        purpose: &str,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> LlmAnswer {
        if !self.llm.is_enabled() {
            debug!(purpose, "LLM disabled, skipping");
            return LlmAnswer::Skipped;
        }
        match self.llm.complete(system, user, max_tokens, temperature).await {
            Ok(text) => LlmAnswer::Text(text),
            Err(e) => {
                warn!(purpose, error = %e, "LLM call failed");
                LlmAnswer::Failed
            }
        }
    }
}

/// Outcome of an optional LLM call.
#[derive(Debug, PartialEq)]
enum LlmAnswer {
    Text(String),
    Skipped,
    Failed,
}

impl LlmAnswer {
    fn into_text(self) -> Option<String> {
        match self {
            LlmAnswer::Text(text) => Some(text),
            LlmAnswer::Skipped | LlmAnswer::Failed => None,
        }
    }
}
