//! Heuristic bot: win if possible, otherwise block, otherwise centre.
//!
//! Decision order, each candidate tried on a throwaway copy of the board:
//! 1. the lowest column that completes four for the bot;
//! 2. the lowest column where the opponent would complete four;
//! 3. the centre column;
//! 4. a uniformly random column with room.
//!
//! Only step 4 uses randomness, so the bot is reproducible when seeded.

use std::sync::Mutex;

use rand::prelude::*;
use rand::rngs::StdRng;

use super::trait_def::{AiError, BotPlayer};
use crate::domain::{Board, Color, CENTER_COLUMN};

pub struct HeuristicBot {
    rng: Mutex<StdRng>,
}

impl HeuristicBot {
    /// `Some(seed)` gives reproducible tie-breaks; `None` draws from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl BotPlayer for HeuristicBot {
    fn choose_column(&self, board: &Board, me: Color) -> Result<usize, AiError> {
        let available = board.available_columns();
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| AiError::Internal(format!("RNG lock poisoned: {e}")))?;
        pick_column(board, me, me.opponent(), &available, &mut *rng)
    }
}

/// Core selection over an explicit list of available columns.
pub fn pick_column<R: Rng + ?Sized>(
    board: &Board,
    me: Color,
    opponent: Color,
    available: &[usize],
    rng: &mut R,
) -> Result<usize, AiError> {
    if available.is_empty() {
        return Err(AiError::NoLegalMove("no column has room".into()));
    }

    if let Some(col) = first_winning_column(board, me, available) {
        return Ok(col);
    }
    if let Some(col) = first_winning_column(board, opponent, available) {
        return Ok(col);
    }
    if available.contains(&CENTER_COLUMN) {
        return Ok(CENTER_COLUMN);
    }

    available
        .choose(rng)
        .copied()
        .ok_or_else(|| AiError::Internal("failed to choose random column".into()))
}

fn first_winning_column(board: &Board, color: Color, available: &[usize]) -> Option<usize> {
    available.iter().copied().find(|&col| wins_with(board, col, color))
}

fn wins_with(board: &Board, column: usize, color: Color) -> bool {
    let mut scratch = board.clone();
    scratch.place(column, color).is_ok() && scratch.evaluate(color).is_win()
}
