use cardroom_core::RoomIdError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("player name is empty")]
    MissingName,
    #[error("invalid room id: {0}")]
    InvalidRoomId(#[from] RoomIdError),
    #[error("not in a room")]
    NoRoom,
    #[error("not connected to the server")]
    NotConnected,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("no cards selected")]
    EmptySelection,
    #[error("close is not allowed right now")]
    CloseNotAllowed,
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("client runtime has stopped")]
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store record could not be encoded")]
    Encode,
    #[error("store record is corrupt or has an unsupported version")]
    Decode,
}
