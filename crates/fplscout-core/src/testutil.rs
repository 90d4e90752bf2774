// Shared builders for unit tests.

use crate::player::{Player, Position, Status};

pub(crate) fn make_player(id: u32, name: &str, position: Position, price: f64) -> Player {
    Player {
        id,
        name: name.to_string(),
        full_name: name.to_string(),
        team_id: 1,
        team: "Arsenal".to_string(),
        position,
        price,
        form: 0.0,
        ep_next: 0.0,
        total_points: 0,
        event_points: 0,
        points_per_game: 0.0,
        status: Status::Available,
        news: String::new(),
        chance_of_playing_next: None,
        transfers_in_event: 0,
    }
}

pub(crate) fn with_stats(
    mut p: Player,
    form: f64,
    ep_next: f64,
    transfers_in_event: u64,
) -> Player {
    p.form = form;
    p.ep_next = ep_next;
    p.transfers_in_event = transfers_in_event;
    p
}

pub(crate) fn with_status(mut p: Player, code: &str, news: &str) -> Player {
    p.status = Status::from_code(code);
    p.news = news.to_string();
    p
}
