#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod ai;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod ws;

// Re-exports for public API
pub use config::{EngineConfig, ServerConfig};
pub use error::AppError;
pub use errors::{DomainError, InvalidMoveKind};
pub use middleware::StructuredLogger;
pub use services::{Effect, InMemoryLeaderboard, LeaderboardStore, SessionManager, Timer};
pub use state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
