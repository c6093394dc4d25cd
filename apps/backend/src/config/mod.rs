//! Environment-driven configuration.

pub mod engine;
pub mod server;

pub use engine::EngineConfig;
pub use server::ServerConfig;
