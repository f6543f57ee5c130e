use serde::{Deserialize, Serialize};

use crate::card::CardId;
use crate::snapshot::{GameSnapshot, PlayerId};

/// Client to server events, framed as `{"event": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMsg {
    CreateRoom {
        name: String,
        player_id: PlayerId,
        face: Option<String>,
    },
    JoinRoom {
        name: String,
        room_id: String,
        player_id: PlayerId,
        face: Option<String>,
    },
    StartRound {
        room_id: String,
    },
    ActionDraw {
        room_id: String,
        from_discard: bool,
    },
    ActionDrop {
        room_id: String,
        selected_ids: Vec<CardId>,
    },
    ActionClose {
        room_id: String,
    },
    SendGif {
        room_id: String,
        target_id: PlayerId,
        gif_id: String,
    },
    TurnTimeout {
        room_id: String,
    },
    RejoinRoom {
        room_id: String,
        name: String,
        player_id: PlayerId,
    },
}

impl ClientMsg {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMsg::CreateRoom { .. } => "create-room",
            ClientMsg::JoinRoom { .. } => "join-room",
            ClientMsg::StartRound { .. } => "start-round",
            ClientMsg::ActionDraw { .. } => "action-draw",
            ClientMsg::ActionDrop { .. } => "action-drop",
            ClientMsg::ActionClose { .. } => "action-close",
            ClientMsg::SendGif { .. } => "send-gif",
            ClientMsg::TurnTimeout { .. } => "turn-timeout",
            ClientMsg::RejoinRoom { .. } => "rejoin-room",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMsg {
    GameState(GameSnapshot),
    RejoinSuccess(GameSnapshot),
    GifPlay { target_id: PlayerId, gif_id: String },
    Error { message: String },
}

impl ServerMsg {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMsg::GameState(_) => "game-state",
            ServerMsg::RejoinSuccess(_) => "rejoin-success",
            ServerMsg::GifPlay { .. } => "gif-play",
            ServerMsg::Error { .. } => "error",
        }
    }
}
