use std::fmt;

pub const ROOM_ID_MAX_LEN: usize = 64;

// Server-issued ids are opaque; only reject what can never survive a prompt.
fn is_room_id_char(ch: char) -> bool {
    !ch.is_whitespace() && !ch.is_control()
}

/// Room identifier as typed by a user or handed out by the server.
///
/// Surrounding whitespace is ignored; the stored value is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn parse(value: &str) -> Result<Self, RoomIdError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RoomIdError::Empty);
        }
        let len = value.chars().count();
        if len > ROOM_ID_MAX_LEN {
            return Err(RoomIdError::TooLong {
                max: ROOM_ID_MAX_LEN,
                found: len,
            });
        }
        for (idx, ch) in value.chars().enumerate() {
            if !is_room_id_char(ch) {
                return Err(RoomIdError::InvalidCharacter { ch, index: idx });
            }
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for RoomId {
    type Err = RoomIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomIdError {
    Empty,
    TooLong { max: usize, found: usize },
    InvalidCharacter { ch: char, index: usize },
}

impl fmt::Display for RoomIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomIdError::Empty => write!(f, "room id is empty"),
            RoomIdError::TooLong { max, found } => {
                write!(f, "room id must be at most {max} chars, got {found}")
            }
            RoomIdError::InvalidCharacter { ch, index } => {
                write!(f, "invalid character '{ch}' at position {index}")
            }
        }
    }
}

impl std::error::Error for RoomIdError {}
