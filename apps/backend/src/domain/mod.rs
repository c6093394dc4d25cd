//! Domain layer: pure board and match logic.

pub mod board;
pub mod match_session;


// Re-exports for ergonomics
pub use board::{empty_board, Board, Cell, Color, Coord, Evaluation, CENTER_COLUMN, COLS, ROWS};
pub use match_session::{
    ConnId, GameId, MatchSession, MoveProgress, Outcome, Participant, Seat, Status, BOT_USERNAME,
    DRAW_LABEL,
};
