use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::ConnId;
use crate::state::app_state::AppState;
use crate::ws::hub::{ConnectionRegistry, Outbound};
use crate::ws::lobby::{Disconnected, Join, Lobby, SubmitMove};
use crate::ws::protocol::{decode_client_msg, ClientMsg, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(
        Uuid::new_v4(),
        app_state.lobby.clone(),
        app_state.registry.clone(),
    );
    ws::start(session, &req, stream)
}

/// One websocket connection. Decodes inbound frames for the lobby and
/// writes whatever the lobby addresses to this connection.
pub struct WsSession {
    conn_id: ConnId,
    lobby: Addr<Lobby>,
    registry: Arc<ConnectionRegistry>,
    last_heartbeat: Instant,
}

impl WsSession {
    fn new(conn_id: ConnId, lobby: Addr<Lobby>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            conn_id,
            lobby,
            registry,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_text(&self, text: &str) {
        match decode_client_msg(text) {
            Ok(ClientMsg::Join { username }) => self.lobby.do_send(Join {
                conn: self.conn_id,
                username,
            }),
            Ok(ClientMsg::Move {
                game_id,
                col_index,
                player,
            }) => self.lobby.do_send(SubmitMove {
                conn: self.conn_id,
                game_id,
                column: col_index,
                color: player,
            }),
            Err(err) => {
                debug!(conn_id = %self.conn_id, error = %err, "[WS SESSION] dropped inbound frame");
            }
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] started");
        self.registry
            .register(self.conn_id, ctx.address().recipient::<Outbound>());
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.registry.unregister(self.conn_id);
        self.lobby.do_send(Disconnected { conn: self.conn_id });
        info!(conn_id = %self.conn_id, "[WS SESSION] stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_text(&text);
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                debug!(conn_id = %self.conn_id, "[WS SESSION] binary frame ignored");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[WS SESSION] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, Outbound(msg): Outbound, ctx: &mut Self::Context) -> Self::Result {
        Self::send_json(ctx, &msg);
    }
}
