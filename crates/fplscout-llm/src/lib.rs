// Natural-language layer: prompt construction from core data and a
// streaming Claude client.

pub mod client;
pub mod prompt;

pub use client::{ClaudeClient, LlmClient, LlmEvent};
