pub mod leaderboard;
mod lifecycle;
pub mod matchmaking;
pub mod session_manager;

pub use leaderboard::{
    CompletedGame, InMemoryLeaderboard, LeaderboardEntry, LeaderboardError, LeaderboardStore,
    DEFAULT_LEADERBOARD_LIMIT,
};
pub use matchmaking::{Waiting, WaitingSlot};
pub use session_manager::{Effect, SessionManager, Timer};
