//! The session manager: one per process, owning every match, the waiting
//! slot and the id counter.
//!
//! Every operation takes the current `Instant` and returns the effects the
//! caller must carry out. Nothing here sends, sleeps or spawns, which keeps
//! the manager synchronous and lets the `Lobby` actor be its only writer.
//!
//! Scheduled work is returned as `Timer` values. Timers are never
//! cancelled; each one carries enough identity (ticket, ply, generation)
//! for `fire` to recognise when it has been superseded and do nothing.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::matchmaking::WaitingSlot;
use crate::ai::BotPlayer;
use crate::config::engine::EngineConfig;
use crate::domain::{Color, ConnId, GameId, MatchSession, MoveProgress, Outcome, Participant};
use crate::errors::domain::{DomainError, InvalidMoveKind};
use crate::ws::protocol::{MatchResult, ServerMsg};

/// Deferred work requested by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Start a bot match if the slot still holds `ticket`.
    BotFallback { ticket: u64 },
    /// Let the bot move if the match is still at `ply` with the bot to move.
    BotMove { game_id: GameId, ply: u32 },
    /// Forfeit `seat` if its disconnect record still carries `generation`.
    ForfeitCheck {
        game_id: GameId,
        seat: usize,
        generation: u64,
    },
    /// Drop an ended match from the table.
    Release { game_id: GameId },
}

/// Something the owner of the manager must do on its behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Send {
        conn: ConnId,
        msg: ServerMsg,
    },
    Schedule {
        after: Duration,
        timer: Timer,
    },
    RecordWin {
        username: String,
    },
    RecordGame {
        player1: String,
        player2: String,
        winner: String,
    },
}

pub struct SessionManager {
    pub(super) config: EngineConfig,
    pub(super) sessions: BTreeMap<GameId, MatchSession>,
    pub(super) slot: WaitingSlot,
    next_game_id: GameId,
    next_generation: u64,
    bot: Box<dyn BotPlayer>,
}

impl SessionManager {
    pub fn new(config: EngineConfig, bot: Box<dyn BotPlayer>) -> Self {
        Self {
            config,
            sessions: BTreeMap::new(),
            slot: WaitingSlot::default(),
            next_game_id: 1,
            next_generation: 1,
            bot,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session(&self, game_id: GameId) -> Option<&MatchSession> {
        self.sessions.get(&game_id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &MatchSession> {
        self.sessions.values()
    }

    pub fn active_games(&self) -> usize {
        self.sessions.values().filter(|s| s.is_active()).count()
    }

    /// Connection and username currently waiting for an opponent.
    pub fn waiting(&self) -> Option<(ConnId, &str)> {
        self.slot
            .occupant()
            .map(|w| (w.conn, w.username.as_str()))
    }

    pub(super) fn next_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    /// True when `conn` already waits in the slot or holds a live seat.
    pub(super) fn is_engaged(&self, conn: ConnId) -> bool {
        self.slot.holds(conn)
            || self
                .sessions
                .values()
                .any(|s| s.is_active() && s.seat_of(conn).is_some())
    }

    /// Open a match with `red` on seat 0 and `yellow` (or the bot) on seat 1.
    pub(super) fn start_match(
        &mut self,
        red: Participant,
        yellow: Option<Participant>,
    ) -> Vec<Effect> {
        let game_id = self.next_game_id;
        self.next_game_id += 1;

        let session = match yellow {
            Some(yellow) => MatchSession::between(game_id, red, yellow),
            None => MatchSession::against_bot(game_id, red),
        };

        info!(
            game_id,
            red = session.username(0),
            yellow = session.username(1),
            "Match started"
        );

        let effects = session
            .connected()
            .map(|(seat, conn)| Effect::Send {
                conn,
                msg: ServerMsg::Start {
                    game_id,
                    board: session.board().clone(),
                    current_player: session.current_turn(),
                    color: Color::for_seat(seat),
                    opponent: session.opponent_label(seat).to_string(),
                },
            })
            .collect();

        self.sessions.insert(game_id, session);
        effects
    }

    /// Handle a move submitted by `conn`.
    ///
    /// The sender must hold the seat of `color`. Rejections leave every
    /// session untouched and produce no effects; the caller decides whether
    /// to log them.
    pub fn submit_move(
        &mut self,
        conn: ConnId,
        game_id: GameId,
        column: usize,
        color: Color,
    ) -> Result<Vec<Effect>, DomainError> {
        let session = self.sessions.get(&game_id).ok_or_else(|| {
            DomainError::invalid_move(
                InvalidMoveKind::UnknownGame,
                format!("no game with id {game_id}"),
            )
        })?;
        if session.seat_of(conn) != Some(color.seat()) {
            return Err(DomainError::invalid_move(
                InvalidMoveKind::SeatMismatch,
                format!("connection does not hold {color:?} in game {game_id}"),
            ));
        }
        self.apply_move(game_id, color, column)
    }

    /// Apply a move for `color` and turn the transition into effects.
    pub(super) fn apply_move(
        &mut self,
        game_id: GameId,
        color: Color,
        column: usize,
    ) -> Result<Vec<Effect>, DomainError> {
        let session = self.sessions.get_mut(&game_id).ok_or_else(|| {
            DomainError::invalid_move(
                InvalidMoveKind::UnknownGame,
                format!("no game with id {game_id}"),
            )
        })?;

        match session.apply_move(color, column)? {
            MoveProgress::Continued { next } => {
                let update = ServerMsg::Update {
                    board: session.board().clone(),
                    current_player: next,
                    result: MatchResult::Ongoing,
                    winner: None,
                    win_cells: Vec::new(),
                };
                let mut effects = broadcast(session, &update);
                if session.is_bot_turn() {
                    effects.push(Effect::Schedule {
                        after: self.config.bot_move_delay,
                        timer: Timer::BotMove {
                            game_id,
                            ply: session.ply(),
                        },
                    });
                }
                Ok(effects)
            }
            MoveProgress::Won | MoveProgress::Drawn => Ok(self.conclude(game_id)),
        }
    }

    /// Termination broadcast and bookkeeping for a match that just ended on
    /// the board.
    fn conclude(&self, game_id: GameId) -> Vec<Effect> {
        let Some(session) = self.sessions.get(&game_id) else {
            return Vec::new();
        };
        let Some(outcome) = session.outcome() else {
            return Vec::new();
        };
        let winner = outcome.winner_label().to_string();
        let result = match outcome {
            Outcome::Draw => MatchResult::Draw,
            _ => MatchResult::Win,
        };

        info!(game_id, winner = %winner, "Match ended");

        let mut effects = broadcast(
            session,
            &ServerMsg::Update {
                board: session.board().clone(),
                current_player: session.current_turn(),
                result,
                winner: Some(winner.clone()),
                win_cells: session.win_cells().to_vec(),
            },
        );
        effects.extend(broadcast(
            session,
            &ServerMsg::GameOver {
                winner: winner.clone(),
                win_cells: session.win_cells().to_vec(),
            },
        ));

        // Bot wins count as completed games but never as leaderboard wins.
        if let Outcome::Win { seat, .. } = outcome {
            if !session.is_bot_seat(*seat) {
                effects.push(Effect::RecordWin {
                    username: winner.clone(),
                });
            }
        }
        effects.extend(self.closing_effects(session, winner));
        effects
    }

    /// Match record plus the delayed release of the session.
    pub(super) fn closing_effects(&self, session: &MatchSession, winner: String) -> Vec<Effect> {
        let [player1, player2] = session.usernames().clone();
        vec![
            Effect::RecordGame {
                player1,
                player2,
                winner,
            },
            Effect::Schedule {
                after: self.config.release_linger,
                timer: Timer::Release {
                    game_id: session.id(),
                },
            },
        ]
    }

    /// Run a timer that came due at `now`.
    pub fn fire(&mut self, timer: Timer, now: Instant) -> Vec<Effect> {
        match timer {
            Timer::BotFallback { ticket } => self.on_bot_fallback(ticket, now),
            Timer::BotMove { game_id, ply } => self.on_bot_move(game_id, ply),
            Timer::ForfeitCheck {
                game_id,
                seat,
                generation,
            } => self.on_forfeit_check(game_id, seat, generation, now),
            Timer::Release { game_id } => self.on_release(game_id),
        }
    }

    fn on_bot_move(&mut self, game_id: GameId, ply: u32) -> Vec<Effect> {
        let Some(session) = self.sessions.get(&game_id) else {
            debug!(game_id, "Bot move for released game ignored");
            return Vec::new();
        };
        if !session.is_active() || session.ply() != ply || !session.is_bot_turn() {
            debug!(game_id, ply, "Stale bot move ignored");
            return Vec::new();
        }

        let me = session.current_turn();
        let column = match self.bot.choose_column(session.board(), me) {
            Ok(column) => column,
            Err(err) => {
                warn!(game_id, error = %err, "Bot failed to choose a column");
                return Vec::new();
            }
        };

        debug!(game_id, column, "Bot plays");
        self.apply_move(game_id, me, column).unwrap_or_else(|err| {
            warn!(game_id, column, error = %err, "Bot move rejected");
            Vec::new()
        })
    }

    fn on_release(&mut self, game_id: GameId) -> Vec<Effect> {
        match self.sessions.get(&game_id) {
            Some(session) if !session.is_active() => {
                self.sessions.remove(&game_id);
                info!(game_id, "Match released");
            }
            Some(_) => debug!(game_id, "Release for active game ignored"),
            None => debug!(game_id, "Release for unknown game ignored"),
        }
        Vec::new()
    }
}

/// The same message to every seat still bound to a connection.
pub(super) fn broadcast(session: &MatchSession, msg: &ServerMsg) -> Vec<Effect> {
    session
        .connected()
        .map(|(_, conn)| Effect::Send {
            conn,
            msg: msg.clone(),
        })
        .collect()
}
