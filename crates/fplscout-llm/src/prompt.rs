// Prompt construction for the news digest and the recommender.
//
// The text blocks built here are deterministic renderings of core data; the
// model only sees what these functions produce.

use fplscout_core::player::{Player, Position};
use fplscout_core::shortlist::ShortlistEntry;

pub const NO_ISSUES: &str = "No major issues found.";
pub const NO_CANDIDATES: &str = "No candidates found for these filters.";

/// Sampling temperature for the news digest.
pub const NEWS_TEMPERATURE: f32 = 0.2;
/// Sampling temperature for recommendations.
pub const RECOMMEND_TEMPERATURE: f32 = 0.3;

// ---------------------------------------------------------------------------
// Data blocks
// ---------------------------------------------------------------------------

/// One line per flagged player, in the order given.
pub fn issues_text(players: &[&Player]) -> String {
    if players.is_empty() {
        return NO_ISSUES.to_string();
    }
    players
        .iter()
        .map(|p| {
            format!(
                "{} ({}, {}) - status={} - form={:.2} - news={}",
                p.name,
                p.team,
                p.position,
                p.status.code(),
                p.form,
                p.news
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fixed-width shortlist table, two decimals for every float column.
pub fn shortlist_table(entries: &[ShortlistEntry]) -> String {
    if entries.is_empty() {
        return NO_CANDIDATES.to_string();
    }
    let mut out = format!(
        "{:<20} {:<16} {:<4} {:>6} {:>6} {:>7} {:>6} {:>9} {:>6}\n",
        "player", "team", "pos", "price", "form", "ep_next", "pts", "trans_in", "score"
    );
    for e in entries {
        let p = &e.player;
        out.push_str(&format!(
            "{:<20} {:<16} {:<4} {:>6.2} {:>6.2} {:>7.2} {:>6} {:>9} {:>6.2}\n",
            p.name,
            p.team,
            p.position,
            p.price,
            p.form,
            p.ep_next,
            p.total_points,
            p.transfers_in_event,
            e.score
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// News digest
// ---------------------------------------------------------------------------

pub fn news_system_prompt() -> String {
    "You summarise Fantasy Premier League player news for fantasy managers.".to_string()
}

pub fn news_prompt(issues: &str) -> String {
    format!(
        "Here is a list of players, their teams, status and short news from the official game:\n\
         \n\
         {issues}\n\
         \n\
         Summarise this in 8-12 bullet points, focusing only on news that matters for team selection:\n\
         - key attackers or defenders with injuries or doubts\n\
         - suspensions\n\
         - returns from injury\n\
         \n\
         Group bullets by team where possible. Be concise."
    )
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

pub fn recommend_system_prompt() -> String {
    "You recommend Fantasy Premier League players given stats and a pre-scored shortlist."
        .to_string()
}

pub fn recommendation_prompt(position: Position, max_price: f64, table: &str) -> String {
    format!(
        "You are given a shortlist of players in position {position}, with a maximum price of \
         {max_price:.1}M. Each row has price (millions), form, expected points next gameweek \
         (ep_next), total points, transfers in this gameweek and a pre-computed score.\n\
         \n\
         {table}\n\
         Task:\n\
         - Recommend 5 players for this gameweek as a ranked list 1-5: player, team, price.\n\
         - For each, add 1-2 sentences on why (form, ep_next, optionally popularity or value).\n\
         - Finish with a 2-3 sentence summary of the overall approach \
         (template picks versus differentials, floor versus ceiling).\n\
         \n\
         Use the numbers provided; do not recompute them. Be concrete."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fplscout_core::player::Status;

    fn make_player(name: &str, status: &str, news: &str, form: f64) -> Player {
        Player {
            id: 1,
            name: name.into(),
            full_name: name.into(),
            team_id: 12,
            team: "Liverpool".into(),
            position: Position::Midfielder,
            price: 13.1,
            form,
            ep_next: 7.25,
            total_points: 88,
            event_points: 2,
            points_per_game: 6.1,
            status: Status::from_code(status),
            news: news.into(),
            chance_of_playing_next: None,
            transfers_in_event: 4321,
        }
    }

    #[test]
    fn issues_text_line_format() {
        let p = make_player("Salah", "d", "Knock - 75% chance of playing", 5.0);
        assert_eq!(
            issues_text(&[&p]),
            "Salah (Liverpool, MID) - status=d - form=5.00 - news=Knock - 75% chance of playing"
        );
    }

    #[test]
    fn issues_text_keeps_order_one_line_each() {
        let a = make_player("A", "i", "", 1.0);
        let b = make_player("B", "s", "", 1.0);
        let text = issues_text(&[&a, &b]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("A "));
        assert!(lines[1].starts_with("B "));
    }

    #[test]
    fn empty_blocks_render_placeholders() {
        assert_eq!(issues_text(&[]), NO_ISSUES);
        assert_eq!(shortlist_table(&[]), NO_CANDIDATES);
    }

    #[test]
    fn shortlist_table_has_header_and_rows() {
        let entries = vec![ShortlistEntry {
            player: make_player("Salah", "a", "", 8.0),
            score: 6.83,
        }];
        let table = shortlist_table(&entries);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("player"));
        assert!(lines[1].contains("Salah"));
        assert!(lines[1].contains("13.10"));
        assert!(lines[1].contains("4321"));
        assert!(lines[1].trim_end().ends_with("6.83"));
    }

    #[test]
    fn recommendation_prompt_embeds_parameters_and_table() {
        let prompt = recommendation_prompt(Position::Forward, 8.5, "TABLE");
        assert!(prompt.contains("position FWD"));
        assert!(prompt.contains("8.5M"));
        assert!(prompt.contains("TABLE"));
    }

    #[test]
    fn news_prompt_embeds_issues() {
        let prompt = news_prompt("Saka (Arsenal, MID) - status=i");
        assert!(prompt.contains("Saka (Arsenal, MID) - status=i"));
    }
}
