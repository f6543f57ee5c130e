pub mod card;
pub mod codec;
pub mod protocol;
pub mod room_id;
pub mod snapshot;

pub use card::{Card, CardId, Rank, Suit, CLOSING_RANK};
pub use codec::{decode, encode};
pub use protocol::{ClientMsg, ServerMsg};
pub use room_id::{RoomId, RoomIdError, ROOM_ID_MAX_LEN};
pub use snapshot::{GameSnapshot, Player, PlayerId};
