use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use thiserror::Error;

use crate::domain::{Board, Color, Coord, GameId};

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Join {
        username: String,
    },

    #[serde(rename_all = "camelCase")]
    Move {
        #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
        game_id: GameId,
        col_index: usize,
        player: Color,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Ongoing,
    Win,
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    #[serde(rename_all = "camelCase")]
    Start {
        game_id: GameId,
        board: Board,
        current_player: Color,
        color: Color,
        opponent: String,
    },

    #[serde(rename_all = "camelCase")]
    Resume {
        game_id: GameId,
        board: Board,
        current_player: Color,
        color: Color,
        opponent: String,
        win_cells: Vec<Coord>,
    },

    #[serde(rename_all = "camelCase")]
    Update {
        board: Board,
        current_player: Color,
        result: MatchResult,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner: Option<String>,
        win_cells: Vec<Coord>,
    },

    #[serde(rename_all = "camelCase")]
    GameOver {
        winner: String,
        win_cells: Vec<Coord>,
    },

    Forfeit {
        winner: String,
    },
}

/// Inbound frames that cannot be turned into a `ClientMsg`.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("join requires a non-blank username")]
    BlankUsername,
}

/// Decode one inbound text frame.
///
/// Usernames are trimmed; a blank one is rejected like any other malformed
/// frame.
pub fn decode_client_msg(text: &str) -> Result<ClientMsg, ProtocolError> {
    match serde_json::from_str(text)? {
        ClientMsg::Join { username } => {
            let username = username.trim();
            if username.is_empty() {
                return Err(ProtocolError::BlankUsername);
            }
            Ok(ClientMsg::Join {
                username: username.to_string(),
            })
        }
        other => Ok(other),
    }
}
