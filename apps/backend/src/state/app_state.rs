use std::sync::Arc;

use actix::{Actor, Addr};

use crate::ai::BotPlayer;
use crate::config::EngineConfig;
use crate::services::{LeaderboardStore, SessionManager};
use crate::ws::hub::ConnectionRegistry;
use crate::ws::lobby::Lobby;

/// Shared handles passed to every HTTP and websocket handler.
#[derive(Clone)]
pub struct AppState {
    /// The single actor that owns all match state.
    pub lobby: Addr<Lobby>,
    /// Live websocket connections by id.
    pub registry: Arc<ConnectionRegistry>,
    pub leaderboard: Arc<dyn LeaderboardStore>,
}

impl AppState {
    /// Start the lobby actor on the current arbiter and wrap its handles.
    ///
    /// Must be called from inside a running actix system.
    pub fn start(
        config: EngineConfig,
        bot: Box<dyn BotPlayer>,
        leaderboard: Arc<dyn LeaderboardStore>,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let manager = SessionManager::new(config, bot);
        let lobby = Lobby::new(manager, registry.clone(), leaderboard.clone()).start();
        Self {
            lobby,
            registry,
            leaderboard,
        }
    }
}
