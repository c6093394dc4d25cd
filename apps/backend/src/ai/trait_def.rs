//! Bot player trait definition.

use thiserror::Error;

use crate::domain::{Board, Color};

/// Errors that can occur during bot decision-making.
#[derive(Debug, Error)]
pub enum AiError {
    /// No column has room; the board is full.
    #[error("AI has no legal move: {0}")]
    NoLegalMove(String),
    /// Bot encountered an internal error
    #[error("AI internal error: {0}")]
    Internal(String),
}

/// Trait for computer-controlled seats.
///
/// Implementations receive a snapshot of the live board and must return a
/// column with room. They must not assume the snapshot outlives the call.
pub trait BotPlayer: Send + Sync {
    /// Choose a column for `me` to play.
    fn choose_column(&self, board: &Board, me: Color) -> Result<usize, AiError>;
}
