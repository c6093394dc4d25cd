//! Per-match state: seats, turn order, move legality and termination.
//!
//! A session starts `Active` with an empty board and Red to move, and moves
//! to `Ended` exactly once. The session never talks to the outside world;
//! the session manager turns its transitions into outbound messages.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::domain::board::{Board, Color, Coord, Evaluation};
use crate::errors::domain::{DomainError, InvalidMoveKind};

pub type GameId = u64;

/// Identifies one live transport connection.
pub type ConnId = Uuid;

/// Username reported for the computer-controlled seat.
pub const BOT_USERNAME: &str = "bot";

/// Winner label used when the board fills without a line.
pub const DRAW_LABEL: &str = "draw";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    /// Bound to a live connection.
    Connected(ConnId),
    /// The player dropped; the seat waits for the same username to rejoin.
    AwaitingReconnect,
    /// Permanently played by the bot.
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Win { winner: String, seat: usize },
    Draw,
    Forfeit { winner: String },
}

impl Outcome {
    pub fn winner_label(&self) -> &str {
        match self {
            Outcome::Win { winner, .. } | Outcome::Forfeit { winner } => winner,
            Outcome::Draw => DRAW_LABEL,
        }
    }
}

/// When a seat dropped, plus the generation its forfeit check was tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disconnect {
    pub at: Instant,
    pub generation: u64,
}

/// What an accepted move did to the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveProgress {
    Continued { next: Color },
    Won,
    Drawn,
}

/// A human participant at match creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub conn: ConnId,
    pub username: String,
}

impl Participant {
    pub fn new(conn: ConnId, username: impl Into<String>) -> Self {
        Self {
            conn,
            username: username.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchSession {
    id: GameId,
    board: Board,
    seats: [Seat; 2],
    usernames: [String; 2],
    current: Color,
    status: Status,
    disconnects: [Option<Disconnect>; 2],
    outcome: Option<Outcome>,
    win_cells: Vec<Coord>,
    ply: u32,
}

impl MatchSession {
    /// Two humans: `red` takes seat 0, `yellow` seat 1.
    pub fn between(id: GameId, red: Participant, yellow: Participant) -> Self {
        Self::with_seats(
            id,
            [Seat::Connected(red.conn), Seat::Connected(yellow.conn)],
            [red.username, yellow.username],
        )
    }

    /// A human on seat 0 against the bot on seat 1.
    pub fn against_bot(id: GameId, red: Participant) -> Self {
        Self::with_seats(
            id,
            [Seat::Connected(red.conn), Seat::Bot],
            [red.username, BOT_USERNAME.to_string()],
        )
    }

    fn with_seats(id: GameId, seats: [Seat; 2], usernames: [String; 2]) -> Self {
        Self {
            id,
            board: Board::empty(),
            seats,
            usernames,
            current: Color::Red,
            status: Status::Active,
            disconnects: [None, None],
            outcome: None,
            win_cells: Vec::new(),
            ply: 0,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Color {
        self.current
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn win_cells(&self) -> &[Coord] {
        &self.win_cells
    }

    /// Number of accepted moves so far.
    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn seat(&self, seat: usize) -> Seat {
        self.seats[seat]
    }

    pub fn username(&self, seat: usize) -> &str {
        &self.usernames[seat]
    }

    pub fn usernames(&self) -> &[String; 2] {
        &self.usernames
    }

    pub fn disconnect(&self, seat: usize) -> Option<Disconnect> {
        self.disconnects[seat]
    }

    pub fn is_bot_seat(&self, seat: usize) -> bool {
        self.seats[seat] == Seat::Bot
    }

    pub fn has_bot(&self) -> bool {
        self.seats.contains(&Seat::Bot)
    }

    pub fn is_bot_turn(&self) -> bool {
        self.is_bot_seat(self.current.seat())
    }

    /// Seat currently bound to `conn`, if any.
    pub fn seat_of(&self, conn: ConnId) -> Option<usize> {
        self.seats
            .iter()
            .position(|seat| *seat == Seat::Connected(conn))
    }

    /// Connections still bound to a seat, in seat order.
    pub fn connected(&self) -> impl Iterator<Item = (usize, ConnId)> + '_ {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(idx, seat)| match seat {
                Seat::Connected(conn) => Some((idx, *conn)),
                _ => None,
            })
    }

    /// Name shown to the player on `seat` for their opponent.
    pub fn opponent_label(&self, seat: usize) -> &str {
        self.username(1 - seat)
    }

    /// Place a disc for `color` and advance the match.
    ///
    /// Rejected without any state change unless the session is active,
    /// `color` is to move and the column has room.
    pub fn apply_move(&mut self, color: Color, column: usize) -> Result<MoveProgress, DomainError> {
        if !self.is_active() {
            return Err(DomainError::invalid_move(
                InvalidMoveKind::GameEnded,
                format!("game {} has ended", self.id),
            ));
        }
        if color != self.current {
            return Err(DomainError::invalid_move(
                InvalidMoveKind::OutOfTurn,
                format!("{:?} to move in game {}", self.current, self.id),
            ));
        }
        self.board.place(column, color).map_err(|err| {
            DomainError::invalid_move(InvalidMoveKind::ColumnUnavailable, err.to_string())
        })?;
        self.ply += 1;

        match self.board.evaluate(color) {
            Evaluation::Win { cells } => {
                self.win_cells = cells.to_vec();
                self.end(Outcome::Win {
                    winner: self.usernames[color.seat()].clone(),
                    seat: color.seat(),
                });
                Ok(MoveProgress::Won)
            }
            Evaluation::Draw => {
                self.end(Outcome::Draw);
                Ok(MoveProgress::Drawn)
            }
            Evaluation::Ongoing => {
                self.current = color.opponent();
                Ok(MoveProgress::Continued { next: self.current })
            }
        }
    }

    /// End the match in favour of `winner` after the opponent abandoned it.
    pub fn apply_forfeit(&mut self, winner: impl Into<String>) -> Result<(), DomainError> {
        if !self.is_active() {
            return Err(DomainError::invalid_move(
                InvalidMoveKind::GameEnded,
                format!("game {} has ended", self.id),
            ));
        }
        self.end(Outcome::Forfeit {
            winner: winner.into(),
        });
        Ok(())
    }

    fn end(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
        self.status = Status::Ended;
    }

    /// Unbind `seat` from its connection and start its grace window.
    pub fn mark_disconnected(&mut self, seat: usize, at: Instant, generation: u64) {
        self.seats[seat] = Seat::AwaitingReconnect;
        self.disconnects[seat] = Some(Disconnect { at, generation });
    }

    /// Seat that `username` may reclaim at `now`, if any.
    pub fn reclaimable_seat(&self, username: &str, now: Instant, grace: Duration) -> Option<usize> {
        (0..2).find(|&seat| {
            self.usernames[seat] == username
                && self.disconnects[seat]
                    .is_some_and(|d| now.saturating_duration_since(d.at) < grace)
        })
    }

    /// Bind `seat` to a new connection and clear its disconnect record.
    pub fn rebind(&mut self, seat: usize, conn: ConnId) {
        self.seats[seat] = Seat::Connected(conn);
        self.disconnects[seat] = None;
    }
}
