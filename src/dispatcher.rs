use std::collections::BTreeSet;

use cardroom_core::{CardId, ClientMsg, GameSnapshot, RoomId};

use crate::error::ClientError;
use crate::identity::PlayerIdentity;
use crate::view;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateRoom,
    JoinRoom { room_id: String },
    StartRound,
    Draw { from_discard: bool },
    DropSelected,
    CallClose,
    SendReaction { target_id: String, gif_id: String },
}

impl Intent {
    pub fn clears_selection(&self) -> bool {
        matches!(self, Intent::DropSelected | Intent::CallClose)
    }
}

pub struct DispatchContext<'a> {
    pub connected: bool,
    pub identity: &'a PlayerIdentity,
    pub snapshot: Option<&'a GameSnapshot>,
    pub selection: &'a BTreeSet<CardId>,
}

impl DispatchContext<'_> {
    fn require_connected(&self) -> Result<(), ClientError> {
        if self.connected {
            Ok(())
        } else {
            Err(ClientError::NotConnected)
        }
    }

    fn require_name(&self) -> Result<String, ClientError> {
        let name = self.identity.name.trim();
        if name.is_empty() {
            return Err(ClientError::MissingName);
        }
        Ok(name.to_string())
    }

    fn require_room(&self) -> Result<(&GameSnapshot, String), ClientError> {
        let snapshot = self.snapshot.ok_or(ClientError::NoRoom)?;
        if snapshot.room_id.is_empty() {
            return Err(ClientError::NoRoom);
        }
        self.require_connected()?;
        Ok((snapshot, snapshot.room_id.clone()))
    }

    fn viewer<'s>(&'s self, snapshot: &'s GameSnapshot) -> &'s str {
        view::viewer_id(snapshot, &self.identity.id)
    }
}

/// Checks the local preconditions of `intent` and builds the message to send.
pub fn build_message(intent: &Intent, ctx: &DispatchContext<'_>) -> Result<ClientMsg, ClientError> {
    match intent {
        Intent::CreateRoom => {
            let name = ctx.require_name()?;
            ctx.require_connected()?;
            Ok(ClientMsg::CreateRoom {
                name,
                player_id: ctx.identity.id.clone(),
                face: ctx.identity.face.clone(),
            })
        }
        Intent::JoinRoom { room_id } => {
            let name = ctx.require_name()?;
            let room_id = RoomId::parse(room_id)?;
            ctx.require_connected()?;
            Ok(ClientMsg::JoinRoom {
                name,
                room_id: room_id.to_string(),
                player_id: ctx.identity.id.clone(),
                face: ctx.identity.face.clone(),
            })
        }
        Intent::StartRound => {
            let (_, room_id) = ctx.require_room()?;
            Ok(ClientMsg::StartRound { room_id })
        }
        Intent::Draw { from_discard } => {
            let (snapshot, room_id) = ctx.require_room()?;
            if !view::is_my_turn(snapshot, ctx.viewer(snapshot)) {
                return Err(ClientError::NotYourTurn);
            }
            Ok(ClientMsg::ActionDraw {
                room_id,
                from_discard: *from_discard,
            })
        }
        Intent::DropSelected => {
            let (snapshot, room_id) = ctx.require_room()?;
            let me = ctx.viewer(snapshot);
            if !view::is_my_turn(snapshot, me) {
                return Err(ClientError::NotYourTurn);
            }
            let selected_ids: Vec<CardId> = view::selected_cards(snapshot, me, ctx.selection)
                .into_iter()
                .map(|card| card.id)
                .collect();
            if selected_ids.is_empty() {
                return Err(ClientError::EmptySelection);
            }
            Ok(ClientMsg::ActionDrop {
                room_id,
                selected_ids,
            })
        }
        Intent::CallClose => {
            let (snapshot, room_id) = ctx.require_room()?;
            let me = ctx.viewer(snapshot);
            if !view::is_my_turn(snapshot, me) {
                return Err(ClientError::NotYourTurn);
            }
            if !view::can_close(snapshot, me) {
                return Err(ClientError::CloseNotAllowed);
            }
            Ok(ClientMsg::ActionClose { room_id })
        }
        Intent::SendReaction { target_id, gif_id } => {
            let (snapshot, room_id) = ctx.require_room()?;
            if snapshot.player(target_id).is_none() {
                return Err(ClientError::UnknownPlayer(target_id.clone()));
            }
            Ok(ClientMsg::SendGif {
                room_id,
                target_id: target_id.clone(),
                gif_id: gif_id.clone(),
            })
        }
    }
}
