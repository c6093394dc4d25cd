//! The lobby actor: sole owner of the `SessionManager`.
//!
//! Every join, move, close and timer callback arrives here as an actor
//! message or a `run_later` callback, so the manager is only ever touched
//! by one task at a time.

use std::sync::Arc;
use std::time::Instant;

use actix::prelude::*;
use tracing::{debug, warn};

use crate::domain::{Color, ConnId, GameId};
use crate::services::{Effect, LeaderboardStore, SessionManager};
use crate::ws::hub::ConnectionRegistry;

#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct Join {
    pub conn: ConnId,
    pub username: String,
}

#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct SubmitMove {
    pub conn: ConnId,
    pub game_id: GameId,
    pub column: usize,
    pub color: Color,
}

#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct Disconnected {
    pub conn: ConnId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobbyStats {
    pub active_games: usize,
    pub waiting: usize,
}

#[derive(Message, Debug)]
#[rtype(result = "LobbyStats")]
pub struct GetStats;

pub struct Lobby {
    manager: SessionManager,
    registry: Arc<ConnectionRegistry>,
    leaderboard: Arc<dyn LeaderboardStore>,
}

impl Lobby {
    pub fn new(
        manager: SessionManager,
        registry: Arc<ConnectionRegistry>,
        leaderboard: Arc<dyn LeaderboardStore>,
    ) -> Self {
        Self {
            manager,
            registry,
            leaderboard,
        }
    }

    /// Carry out the effects returned by the manager, in order.
    fn apply(&mut self, effects: Vec<Effect>, ctx: &mut Context<Self>) {
        for effect in effects {
            match effect {
                Effect::Send { conn, msg } => {
                    self.registry.send(conn, msg);
                }
                Effect::Schedule { after, timer } => {
                    ctx.run_later(after, move |act, ctx| {
                        let effects = act.manager.fire(timer, Instant::now());
                        act.apply(effects, ctx);
                    });
                }
                Effect::RecordWin { username } => {
                    let leaderboard = self.leaderboard.clone();
                    actix::spawn(async move {
                        if let Err(err) = leaderboard.record_win(&username).await {
                            warn!(username = %username, error = %err, "Failed to record win");
                        }
                    });
                }
                Effect::RecordGame {
                    player1,
                    player2,
                    winner,
                } => {
                    let leaderboard = self.leaderboard.clone();
                    actix::spawn(async move {
                        if let Err(err) = leaderboard
                            .record_completed_game(&player1, &player2, &winner)
                            .await
                        {
                            warn!(
                                player1 = %player1,
                                player2 = %player2,
                                error = %err,
                                "Failed to record completed game"
                            );
                        }
                    });
                }
            }
        }
    }
}

impl Actor for Lobby {
    type Context = Context<Self>;
}

impl Handler<Join> for Lobby {
    type Result = ();

    fn handle(&mut self, msg: Join, ctx: &mut Self::Context) -> Self::Result {
        let effects = self.manager.join(msg.conn, &msg.username, Instant::now());
        self.apply(effects, ctx);
    }
}

impl Handler<SubmitMove> for Lobby {
    type Result = ();

    fn handle(&mut self, msg: SubmitMove, ctx: &mut Self::Context) -> Self::Result {
        match self
            .manager
            .submit_move(msg.conn, msg.game_id, msg.column, msg.color)
        {
            Ok(effects) => self.apply(effects, ctx),
            Err(err) => debug!(
                conn_id = %msg.conn,
                game_id = msg.game_id,
                column = msg.column,
                error = %err,
                "Move ignored"
            ),
        }
    }
}

impl Handler<Disconnected> for Lobby {
    type Result = ();

    fn handle(&mut self, msg: Disconnected, ctx: &mut Self::Context) -> Self::Result {
        let effects = self.manager.disconnect(msg.conn, Instant::now());
        self.apply(effects, ctx);
    }
}

impl Handler<GetStats> for Lobby {
    type Result = MessageResult<GetStats>;

    fn handle(&mut self, _msg: GetStats, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(LobbyStats {
            active_games: self.manager.active_games(),
            waiting: usize::from(self.manager.waiting().is_some()),
        })
    }
}
