//! Leaderboard collaborator: win counters and completed-match records.
//!
//! The engine only writes through this trait and never waits on it; the
//! `Lobby` actor spawns each write and logs failures. A durable store is an
//! external concern; `InMemoryLeaderboard` keeps everything process-local.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

/// Default number of rows returned by `get_leaderboard`.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard store unavailable: {0}")]
    Unavailable(String),

    #[error("leaderboard write rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub wins: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedGame {
    pub player1: String,
    pub player2: String,
    pub winner: String,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
}

#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    /// Add one win to `username`'s counter.
    async fn record_win(&self, username: &str) -> Result<(), LeaderboardError>;

    /// Append an immutable record of a finished match.
    async fn record_completed_game(
        &self,
        player1: &str,
        player2: &str,
        winner: &str,
    ) -> Result<(), LeaderboardError>;

    /// Top `limit` players by descending wins.
    async fn get_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
}

#[derive(Default)]
pub struct InMemoryLeaderboard {
    wins: RwLock<HashMap<String, u64>>,
    games: RwLock<Vec<CompletedGame>>,
}

impl InMemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed_games(&self) -> Vec<CompletedGame> {
        self.games.read().clone()
    }

    pub fn wins_for(&self, username: &str) -> u64 {
        self.wins.read().get(username).copied().unwrap_or(0)
    }
}

#[async_trait]
impl LeaderboardStore for InMemoryLeaderboard {
    async fn record_win(&self, username: &str) -> Result<(), LeaderboardError> {
        *self.wins.write().entry(username.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn record_completed_game(
        &self,
        player1: &str,
        player2: &str,
        winner: &str,
    ) -> Result<(), LeaderboardError> {
        self.games.write().push(CompletedGame {
            player1: player1.to_string(),
            player2: player2.to_string(),
            winner: winner.to_string(),
            finished_at: OffsetDateTime::now_utc(),
        });
        Ok(())
    }

    async fn get_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut entries: Vec<LeaderboardEntry> = self
            .wins
            .read()
            .iter()
            .map(|(username, wins)| LeaderboardEntry {
                username: username.clone(),
                wins: *wins,
            })
            .collect();
        // Ties break on username so the order is stable.
        entries.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.username.cmp(&b.username)));
        entries.truncate(limit);
        Ok(entries)
    }
}
