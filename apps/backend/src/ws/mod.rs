pub mod hub;
pub mod lobby;
pub mod protocol;
pub mod session;

pub use hub::{ConnectionRegistry, Outbound};
pub use lobby::{Lobby, LobbyStats};
pub use protocol::{decode_client_msg, ClientMsg, MatchResult, ProtocolError, ServerMsg};
