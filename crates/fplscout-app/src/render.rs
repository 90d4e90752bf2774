// Terminal and CSV rendering of service results.

use std::io;

use serde::Serialize;

use fplscout_core::shortlist::ShortlistEntry;
use fplscout_core::squad::{SquadRow, SquadView};

use crate::service::{FixtureOutlook, NewsDigest, Recommendation, TransferReport};

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub fn render_digest(digest: &NewsDigest) -> String {
    let mut out = format!(
        "Player news as of {}\n\n",
        digest.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    match &digest.summary {
        Some(summary) => {
            out.push_str(summary.trim_end());
            out.push_str("\n\nFlagged players:\n");
        }
        None if !digest.issues.is_empty() => out.push_str("Flagged players:\n"),
        None => {}
    }
    out.push_str(&digest.issues_text);
    out.push('\n');
    out
}

pub fn render_recommendation(reco: &Recommendation) -> String {
    let req = &reco.request;
    let mut out = format!(
        "Top {} {} at or under {:.1}M\n\n",
        req.top_n, req.position, req.max_price
    );
    out.push_str(&reco.table);
    if let Some(advice) = &reco.advice {
        out.push('\n');
        out.push_str(advice.trim_end());
        out.push('\n');
    }
    out
}

fn squad_line(row: &SquadRow) -> String {
    let armband = if row.pick.is_captain {
        " (C)"
    } else if row.pick.is_vice_captain {
        " (V)"
    } else {
        ""
    };
    match &row.player {
        Some(p) => format!(
            "  {:>2}. {:<22} {:<16} {:>5.1}M  form {:>4.1}  xP {:>4.1}  {}\n",
            row.pick.slot,
            format!("{}{armband}", p.name),
            p.team,
            p.price,
            p.form,
            p.ep_next,
            p.status.label()
        ),
        None => format!(
            "  {:>2}. {:<22} (player {} not found)\n",
            row.pick.slot,
            format!("{}{armband}", row.name()),
            row.pick.element
        ),
    }
}

/// Squad page: header, starting XI by position, bench, summary and issues.
pub fn render_squad(view: &SquadView, max_issues: usize) -> String {
    let entry = &view.entry;
    let mut out = format!(
        "{} ({})  gameweek {}\n",
        entry.team_name, entry.manager_name, view.period
    );
    let rank = entry
        .overall_rank
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!(
        "Overall: {} pts, rank {}\n",
        entry.overall_points, rank
    ));
    if let Some(history) = &view.history {
        out.push_str(&format!(
            "Gameweek: {} pts, bank {:.1}M, value {:.1}M, hits -{}\n",
            history.points, history.bank, history.squad_value, history.transfers_cost
        ));
    }
    if let Some(chip) = &view.active_chip {
        out.push_str(&format!("Active chip: {chip}\n"));
    }

    out.push_str("\nStarting XI\n");
    for (position, rows) in view.starters_by_position() {
        if rows.is_empty() {
            continue;
        }
        out.push_str(&format!(" {position}\n"));
        for row in rows {
            out.push_str(&squad_line(row));
        }
    }
    let unplaced: Vec<&SquadRow> = view.starting_xi().filter(|r| !r.is_resolved()).collect();
    if !unplaced.is_empty() {
        out.push_str(" ???\n");
        for row in unplaced {
            out.push_str(&squad_line(row));
        }
    }

    out.push_str("\nBench\n");
    for row in view.bench() {
        out.push_str(&squad_line(row));
    }

    let summary = view.summary();
    out.push_str(&format!(
        "\nSquad value {:.1}M | avg form {:.2} | total xP {:.1} | {} with issues\n",
        summary.total_value, summary.average_form, summary.total_ep_next, summary.issue_count
    ));
    if summary.unresolved > 0 {
        out.push_str(&format!("{} pick(s) could not be matched to a player\n", summary.unresolved));
    }

    let issues = view.issues(max_issues);
    if !issues.is_empty() {
        out.push_str("\nIssues\n");
        out.push_str(&fplscout_llm::prompt::issues_text(&issues));
        out.push('\n');
    }
    out
}

pub fn render_outlook(outlook: &FixtureOutlook) -> String {
    let last = outlook
        .from_event
        .saturating_add(outlook.horizon)
        .saturating_sub(1);
    let mut out = format!(
        "Fixture difficulty, gameweeks {}-{} (easiest first)\n\n",
        outlook.from_event, last
    );
    for team in &outlook.teams {
        let mean = team
            .mean_difficulty
            .map(|m| format!("{m:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let fixtures = if team.fixtures.is_empty() {
            "blank".to_string()
        } else {
            team.fixtures
                .iter()
                .map(|f| {
                    let venue = if f.home { "H" } else { "A" };
                    let difficulty = f
                        .difficulty
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "?".into());
                    format!("GW{} {} ({venue}) {difficulty}", f.event, f.opponent)
                })
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&format!("{:<16} {:>5}  {}\n", team.team, mean, fixtures));
    }
    out
}

pub fn render_transfer(report: &TransferReport) -> String {
    let e = &report.evaluation;
    let verdict = if e.is_worth_it() {
        "worth it"
    } else {
        "not worth it"
    };
    format!(
        "OUT {} ({}, {:.1}M, xP {:.2})\n\
         IN  {} ({}, {:.1}M, xP {:.2})\n\
         expected gain {:+.2}, hit cost -{}, net {:+.2}: {verdict}\n\
         price change {:+.1}M\n",
        report.out.name,
        report.out.team,
        report.out.price,
        report.out.ep_next,
        report.incoming.name,
        report.incoming.team,
        report.incoming.price,
        report.incoming.ep_next,
        e.expected_gain,
        e.hit_cost,
        e.net_value,
        e.price_delta
    )
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ShortlistCsvRow<'a> {
    id: u32,
    player: &'a str,
    team: &'a str,
    position: &'a str,
    price: f64,
    form: f64,
    ep_next: f64,
    total_points: i32,
    transfers_in_event: u64,
    score: f64,
}

pub fn write_shortlist_csv<W: io::Write>(
    entries: &[ShortlistEntry],
    out: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for entry in entries {
        let p = &entry.player;
        writer.serialize(ShortlistCsvRow {
            id: p.id,
            player: &p.name,
            team: &p.team,
            position: p.position.display_str(),
            price: p.price,
            form: p.form,
            ep_next: p.ep_next,
            total_points: p.total_points,
            transfers_in_event: p.transfers_in_event,
            score: entry.score,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct SquadCsvRow<'a> {
    slot: u8,
    element: u32,
    player: &'a str,
    team: Option<&'a str>,
    position: Option<&'a str>,
    price: Option<f64>,
    form: Option<f64>,
    ep_next: Option<f64>,
    status: Option<&'a str>,
    captain: bool,
    vice_captain: bool,
    multiplier: u8,
}

pub fn write_squad_csv<W: io::Write>(view: &SquadView, out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for row in &view.rows {
        let p = row.player.as_ref();
        writer.serialize(SquadCsvRow {
            slot: row.pick.slot,
            element: row.pick.element,
            player: row.name(),
            team: p.map(|p| p.team.as_str()),
            position: p.map(|p| p.position.display_str()),
            price: p.map(|p| p.price),
            form: p.map(|p| p.form),
            ep_next: p.map(|p| p.ep_next),
            status: p.map(|p| p.status.label()),
            captain: row.pick.is_captain,
            vice_captain: row.pick.is_vice_captain,
            multiplier: row.pick.multiplier,
        })?;
    }
    writer.flush()?;
    Ok(())
}
