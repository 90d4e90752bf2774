// fplscout application crate: fetch layer, services and rendering behind the
// `fplscout` binary.

pub mod api;
pub mod render;
pub mod service;
