//! Disconnect, reconnect and forfeit handling for seated connections.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::session_manager::{broadcast, Effect, SessionManager, Timer};
use crate::domain::{Color, ConnId, GameId};
use crate::ws::protocol::ServerMsg;

impl SessionManager {
    /// Rebind a dropped seat for `username`, if one is inside its grace
    /// window. Sessions are scanned in ascending id order.
    pub(super) fn try_reconnect(
        &mut self,
        conn: ConnId,
        username: &str,
        now: Instant,
    ) -> Option<Vec<Effect>> {
        let grace = self.config.reconnect_grace;
        let (game_id, seat) = self.sessions.values().find_map(|session| {
            if !session.is_active() {
                return None;
            }
            session
                .reclaimable_seat(username, now, grace)
                .map(|seat| (session.id(), seat))
        })?;

        let session = self.sessions.get_mut(&game_id)?;
        session.rebind(seat, conn);
        info!(game_id, seat, username, conn_id = %conn, "Player reconnected");

        Some(vec![Effect::Send {
            conn,
            msg: ServerMsg::Resume {
                game_id,
                board: session.board().clone(),
                current_player: session.current_turn(),
                color: Color::for_seat(seat),
                opponent: session.opponent_label(seat).to_string(),
                win_cells: session.win_cells().to_vec(),
            },
        }])
    }

    /// Handle a closed connection.
    ///
    /// A waiting connection simply leaves the slot. A seated one starts its
    /// grace window and arms a forfeit check for the end of it.
    pub fn disconnect(&mut self, conn: ConnId, now: Instant) -> Vec<Effect> {
        if let Some(waiting) = self.slot.take_conn(conn) {
            info!(conn_id = %conn, username = %waiting.username, "Waiting player left");
            return Vec::new();
        }

        let Some((game_id, seat)) = self.sessions.values().find_map(|session| {
            if !session.is_active() {
                return None;
            }
            session.seat_of(conn).map(|seat| (session.id(), seat))
        }) else {
            debug!(conn_id = %conn, "Closed connection held no live seat");
            return Vec::new();
        };

        let generation = self.next_generation();
        let Some(session) = self.sessions.get_mut(&game_id) else {
            return Vec::new();
        };
        session.mark_disconnected(seat, now, generation);
        info!(
            game_id,
            seat,
            username = session.username(seat),
            "Player disconnected, grace window started"
        );

        vec![Effect::Schedule {
            after: self.config.reconnect_grace,
            timer: Timer::ForfeitCheck {
                game_id,
                seat,
                generation,
            },
        }]
    }

    /// Forfeit `seat` unless it reconnected (or dropped again) since the
    /// check was armed, or the match is already over.
    pub(super) fn on_forfeit_check(
        &mut self,
        game_id: GameId,
        seat: usize,
        generation: u64,
        now: Instant,
    ) -> Vec<Effect> {
        let Some(session) = self.sessions.get_mut(&game_id) else {
            debug!(game_id, seat, "Forfeit check for released game ignored");
            return Vec::new();
        };
        let still_dropped = session
            .disconnect(seat)
            .is_some_and(|d| d.generation == generation);
        if !session.is_active() || !still_dropped {
            debug!(game_id, seat, generation, "Stale forfeit check ignored");
            return Vec::new();
        }

        let winner = session.opponent_label(seat).to_string();
        if let Err(err) = session.apply_forfeit(winner.clone()) {
            warn!(game_id, error = %err, "Forfeit rejected");
            return Vec::new();
        }
        let away_for = session
            .disconnect(seat)
            .map(|d| now.saturating_duration_since(d.at).as_millis());
        info!(
            game_id,
            seat,
            winner = %winner,
            away_ms = ?away_for,
            "Match forfeited"
        );

        let session = &self.sessions[&game_id];
        let mut effects = broadcast(
            session,
            &ServerMsg::Forfeit {
                winner: winner.clone(),
            },
        );
        effects.extend(self.closing_effects(session, winner));
        effects
    }
}
