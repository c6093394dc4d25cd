use actix::prelude::*;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::ConnId;
use crate::ws::protocol::ServerMsg;

/// A server message addressed to one connection actor.
#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub struct Outbound(pub ServerMsg);

/// Live connections by id.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnId, Recipient<Outbound>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, conn: ConnId, recipient: Recipient<Outbound>) {
        self.connections.insert(conn, recipient);
    }

    pub fn unregister(&self, conn: ConnId) {
        self.connections.remove(&conn);
    }

    /// Deliver `msg` to `conn`. Returns false when the connection is gone.
    pub fn send(&self, conn: ConnId, msg: ServerMsg) -> bool {
        match self.connections.get(&conn) {
            Some(recipient) => {
                recipient.do_send(Outbound(msg));
                true
            }
            None => {
                debug!(conn_id = %conn, "Dropping message for closed connection");
                false
            }
        }
    }

    pub fn active_connections_count(&self) -> usize {
        self.connections.len()
    }
}
