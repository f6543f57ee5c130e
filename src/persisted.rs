pub(crate) const STORE_RECORD_VERSION: u32 = 1;

pub const PLAYER_ID_KEY: &str = "cardroom.player_id";
pub const PLAYER_NAME_KEY: &str = "cardroom.player_name";
pub const PLAYER_FACE_KEY: &str = "cardroom.player_face";
pub const ROOM_ID_KEY: &str = "cardroom.room_id";

#[derive(Clone, Debug, PartialEq, Eq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub(crate) struct StoreEntry {
    pub(crate) key: String,
    pub(crate) value: String,
}

#[derive(Clone, Debug, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub(crate) struct StoreRecord {
    pub(crate) version: u32,
    pub(crate) entries: Vec<StoreEntry>,
}

impl Default for StoreRecord {
    fn default() -> Self {
        Self {
            version: STORE_RECORD_VERSION,
            entries: Vec::new(),
        }
    }
}
