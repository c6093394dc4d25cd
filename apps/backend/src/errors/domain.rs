//! Domain-level error type used by the board model and the match engine.
//!
//! This error type is transport-agnostic. The engine never surfaces these
//! to clients: a rejected move is logged and otherwise has no effect.

use thiserror::Error;

/// Why a submitted move was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidMoveKind {
    /// No live session carries the requested id.
    UnknownGame,
    /// The session already reached a terminal outcome.
    GameEnded,
    /// The named color is not the color to move.
    OutOfTurn,
    /// The sending connection is not bound to the seat of the named color.
    SeatMismatch,
    /// The column does not exist or has no free cell.
    ColumnUnavailable,
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("column {column} is full")]
    ColumnFull { column: usize },

    #[error("column {column} is outside the board")]
    ColumnOutOfRange { column: usize },

    #[error("invalid move {kind:?}: {detail}")]
    InvalidMove {
        kind: InvalidMoveKind,
        detail: String,
    },
}

impl DomainError {
    pub fn invalid_move(kind: InvalidMoveKind, detail: impl Into<String>) -> Self {
        Self::InvalidMove {
            kind,
            detail: detail.into(),
        }
    }

    /// The move rejection kind, if this error is one.
    pub fn invalid_move_kind(&self) -> Option<InvalidMoveKind> {
        match self {
            DomainError::InvalidMove { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
