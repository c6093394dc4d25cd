//! Matchmaking: a single waiting slot with a timed bot fallback.

use std::time::Instant;

use tracing::{debug, info};

use super::session_manager::{Effect, SessionManager, Timer};
use crate::domain::{ConnId, Participant};

/// The connection currently waiting for an opponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waiting {
    pub conn: ConnId,
    pub username: String,
    /// Identifies this occupancy; the bot-fallback timer carries it.
    pub ticket: u64,
    pub since: Instant,
}

/// At most one waiting connection.
#[derive(Debug, Default)]
pub struct WaitingSlot {
    occupant: Option<Waiting>,
    next_ticket: u64,
}

impl WaitingSlot {
    pub fn occupant(&self) -> Option<&Waiting> {
        self.occupant.as_ref()
    }

    pub fn holds(&self, conn: ConnId) -> bool {
        self.occupant.as_ref().is_some_and(|w| w.conn == conn)
    }

    /// Seat `conn` in the empty slot and return its ticket.
    pub fn occupy(&mut self, conn: ConnId, username: String, now: Instant) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.occupant = Some(Waiting {
            conn,
            username,
            ticket,
            since: now,
        });
        ticket
    }

    pub fn take(&mut self) -> Option<Waiting> {
        self.occupant.take()
    }

    /// Empty the slot only if it still holds `ticket`.
    pub fn take_ticket(&mut self, ticket: u64) -> Option<Waiting> {
        if self.occupant.as_ref().is_some_and(|w| w.ticket == ticket) {
            self.occupant.take()
        } else {
            None
        }
    }

    /// Empty the slot only if `conn` is the occupant.
    pub fn take_conn(&mut self, conn: ConnId) -> Option<Waiting> {
        if self.holds(conn) {
            self.occupant.take()
        } else {
            None
        }
    }
}

impl SessionManager {
    /// Handle a join request from a fresh connection.
    ///
    /// Reconnection to a dropped seat wins over matchmaking. Otherwise the
    /// joiner either pairs with the waiting connection (which keeps seat 0
    /// and Red) or takes the empty slot and arms the bot fallback.
    pub fn join(&mut self, conn: ConnId, username: &str, now: Instant) -> Vec<Effect> {
        if self.is_engaged(conn) {
            debug!(conn_id = %conn, username, "Join from engaged connection ignored");
            return Vec::new();
        }

        if let Some(effects) = self.try_reconnect(conn, username, now) {
            return effects;
        }

        match self.slot.take() {
            Some(waiting) => self.start_match(
                Participant::new(waiting.conn, waiting.username),
                Some(Participant::new(conn, username)),
            ),
            None => {
                let ticket = self.slot.occupy(conn, username.to_string(), now);
                info!(conn_id = %conn, username, ticket, "Player waiting for opponent");
                vec![Effect::Schedule {
                    after: self.config.bot_fallback,
                    timer: Timer::BotFallback { ticket },
                }]
            }
        }
    }

    pub(super) fn on_bot_fallback(&mut self, ticket: u64, now: Instant) -> Vec<Effect> {
        match self.slot.take_ticket(ticket) {
            Some(waiting) => {
                info!(
                    conn_id = %waiting.conn,
                    username = %waiting.username,
                    waited_ms = now.saturating_duration_since(waiting.since).as_millis() as u64,
                    "No opponent arrived, starting bot match"
                );
                self.start_match(Participant::new(waiting.conn, waiting.username), None)
            }
            None => {
                debug!(ticket, "Stale bot fallback ignored");
                Vec::new()
            }
        }
    }
}
