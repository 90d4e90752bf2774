// Core domain for fplscout: canonical player table, scoring, shortlist
// selection, squad reconstruction, issue flagging and fixture outlook.
//
// Everything here is a pure function over in-memory data. Fetching lives in
// fplscout-app; prompt construction lives in fplscout-llm.

pub mod cache;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod issues;
pub mod player;
pub mod raw;
pub mod scoring;
pub mod shortlist;
pub mod squad;
pub mod transfer;

pub use error::CoreError;
pub use player::{Player, PlayerIndex, Position, Status};

#[cfg(test)]
pub(crate) mod testutil;
