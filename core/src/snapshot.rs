use serde::{Deserialize, Serialize};

use crate::card::Card;

pub type PlayerId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub face: Option<String>,
    /// Only populated for the viewing player.
    #[serde(default)]
    pub hand: Vec<Card>,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub has_drawn: bool,
    #[serde(default)]
    pub hand_size: u32,
}

impl Player {
    pub fn holds(&self, card_id: &str) -> bool {
        self.hand.iter().any(|card| card.id == card_id)
    }
}

/// Full room state as pushed by the server. Each push replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub room_id: String,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub current_turn: usize,
    #[serde(default)]
    pub discard_top: Option<Card>,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub close_called: bool,
    #[serde(default)]
    pub host_id: Option<PlayerId>,
    #[serde(default)]
    pub your_id: Option<PlayerId>,
}

impl GameSnapshot {
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_turn)
    }

    pub fn current_player_id(&self) -> Option<&str> {
        self.current_player().map(|player| player.id.as_str())
    }

    pub fn is_host(&self, viewer_id: &str) -> bool {
        self.host_id.as_deref() == Some(viewer_id)
    }
}
