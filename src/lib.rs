//! Client state and runtime for a multiplayer card table.
//!
//! The server is authoritative for everything about the game. This crate keeps
//! the latest snapshot, derives what the player may do from it, runs a local
//! turn countdown, tracks short-lived reactions and forwards intents over a
//! single websocket that reconnects and rejoins on its own.

pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod identity;
mod persisted;
pub mod persisted_store;
pub mod reactions;
pub mod runtime;
pub mod session;
pub mod snapshot_store;
pub mod turn_timer;
pub mod view;

pub use config::ClientConfig;
pub use dispatcher::Intent;
pub use error::{ClientError, StoreError};
pub use identity::{IdentityStore, PlayerIdentity, SavedSession};
pub use persisted::{PLAYER_FACE_KEY, PLAYER_ID_KEY, PLAYER_NAME_KEY, ROOM_ID_KEY};
pub use persisted_store::{FileStore, KeyValueStore, MemoryStore};
pub use runtime::{start, ClientHandle, Command};
pub use session::{Session, SessionEvent};
pub use view::TableView;
