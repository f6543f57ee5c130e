use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use tracing::{debug, info, warn};

use cardroom_core::PlayerId;

use crate::error::StoreError;
use crate::persisted::{PLAYER_FACE_KEY, PLAYER_ID_KEY, PLAYER_NAME_KEY, ROOM_ID_KEY};
use crate::persisted_store::KeyValueStore;

const PLAYER_ID_BYTES: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub id: PlayerId,
    pub name: String,
    pub face: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedSession {
    pub room_id: String,
    pub name: String,
}

pub struct IdentityStore {
    store: Box<dyn KeyValueStore>,
    identity: PlayerIdentity,
}

impl IdentityStore {
    pub fn load_or_create(mut store: Box<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let id = match store.get(PLAYER_ID_KEY).filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => {
                let id = generate_player_id();
                store.set(PLAYER_ID_KEY, &id)?;
                info!(player_id = %id, "generated player id");
                id
            }
        };
        let identity = PlayerIdentity {
            id,
            name: store.get(PLAYER_NAME_KEY).unwrap_or_default(),
            face: store.get(PLAYER_FACE_KEY),
        };
        Ok(Self { store, identity })
    }

    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    pub fn player_id(&self) -> &str {
        &self.identity.id
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name == self.identity.name {
            return Ok(());
        }
        self.store.set(PLAYER_NAME_KEY, name)?;
        self.identity.name = name.to_string();
        Ok(())
    }

    pub fn set_face(&mut self, face: Option<&str>) -> Result<(), StoreError> {
        let face = face.map(str::trim).filter(|face| !face.is_empty());
        match face {
            Some(face) => self.store.set(PLAYER_FACE_KEY, face)?,
            None => self.store.remove(PLAYER_FACE_KEY)?,
        }
        self.identity.face = face.map(str::to_string);
        Ok(())
    }

    pub fn saved_room(&self) -> Option<String> {
        self.store
            .get(ROOM_ID_KEY)
            .filter(|room| !room.trim().is_empty())
    }

    pub fn saved_session(&self) -> Option<SavedSession> {
        let room_id = self.saved_room()?;
        if self.identity.name.is_empty() {
            return None;
        }
        Some(SavedSession {
            room_id,
            name: self.identity.name.clone(),
        })
    }

    pub fn remember_room(&mut self, room_id: &str) {
        if room_id.is_empty() || self.identity.name.is_empty() {
            return;
        }
        if self.saved_room().as_deref() == Some(room_id) {
            return;
        }
        match self.store.set(ROOM_ID_KEY, room_id) {
            Ok(()) => debug!(room_id, "remembered room"),
            Err(err) => warn!(room_id, %err, "failed to persist room id"),
        }
    }

    pub fn forget_room(&mut self) -> Result<(), StoreError> {
        self.store.remove(ROOM_ID_KEY)
    }
}

fn generate_player_id() -> PlayerId {
    let mut bytes = [0u8; PLAYER_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persisted_store::{FileStore, MemoryStore};

    #[test]
    fn generated_player_id_survives_reopen() {
        let nonce: u64 = rand::random();
        let path = std::env::temp_dir().join(format!("cardroom-identity-{nonce:016x}.bin"));
        let id = {
            let store = FileStore::open(&path).expect("open");
            let identity = IdentityStore::load_or_create(Box::new(store)).expect("load");
            assert_eq!(identity.player_id().len(), 22);
            identity.player_id().to_string()
        };
        let store = FileStore::open(&path).expect("reopen");
        let again = IdentityStore::load_or_create(Box::new(store)).expect("reload");
        assert_eq!(again.player_id(), id);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn saved_session_needs_room_and_name() {
        let mut store = IdentityStore::load_or_create(Box::new(MemoryStore::new())).expect("load");
        store.remember_room("ROOM1");
        assert_eq!(store.saved_session(), None, "no name yet, nothing remembered");

        store.set_name("  Bo ").expect("name");
        store.remember_room("ROOM1");
        assert_eq!(
            store.saved_session(),
            Some(SavedSession {
                room_id: "ROOM1".to_string(),
                name: "Bo".to_string(),
            })
        );

        store.forget_room().expect("forget");
        assert_eq!(store.saved_session(), None);
        assert_eq!(store.identity().name, "Bo");
    }

    #[test]
    fn face_can_be_cleared() {
        let mut store = IdentityStore::load_or_create(Box::new(MemoryStore::new())).expect("load");
        store.set_face(Some("cat")).expect("face");
        assert_eq!(store.identity().face.as_deref(), Some("cat"));
        store.set_face(Some("  ")).expect("blank face");
        assert_eq!(store.identity().face, None);
    }
}
