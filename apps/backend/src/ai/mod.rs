//! Bot players for seats without a human.
//!
//! - `BotPlayer` trait for move selection over a board snapshot
//! - `HeuristicBot`: win / block / centre / random, seedable for tests

mod heuristic;
mod trait_def;

pub use heuristic::{pick_column, HeuristicBot};
pub use trait_def::{AiError, BotPlayer};

/// Create a bot player from a name and optional seed.
///
/// Currently supports `"heuristic"`. Returns None if the name is unrecognized.
pub fn create_bot(name: &str, seed: Option<u64>) -> Option<Box<dyn BotPlayer>> {
    match name {
        "heuristic" => Some(Box::new(HeuristicBot::new(seed))),
        _ => None,
    }
}
