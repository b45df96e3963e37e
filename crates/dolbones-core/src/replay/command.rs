use serde::Serialize;
use strum::{Display, FromRepr, IntoStaticStr};

/// Command ids this parser knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, FromRepr, IntoStaticStr, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum CommandId {
    SplitMessage = 0x10,
    Descriptions = 0x35,
    GameInfo = 0x36,
    PreFrame = 0x37,
    PostFrame = 0x38,
    GameEnd = 0x39,
    InitialRng = 0x3A,
    Item = 0x3B,
    FrameBookend = 0x3C,
    GeckoList = 0x3D,
    Bones = 0x60,
}

impl CommandId {
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::from_repr(value)
    }
}

/// Name of a raw command id, or its hex value if unnamed
pub fn command_name(id: u8) -> String {
    match CommandId::from_u8(id) {
        Some(command) => command.to_string(),
        None => format!("{:#04x}", id),
    }
}

/// One entry of the descriptions table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandSize {
    pub command: u8,
    /// Payload size, not counting the id byte
    pub size: u16,
}

/// A decoded record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Packet {
    Descriptions {
        sizes: Vec<CommandSize>,
    },
    Command {
        id: u8,
        payload: Vec<u8>,
        /// Reassembled from split chunks
        split: bool,
    },
}

impl Packet {
    pub fn id(&self) -> u8 {
        match self {
            Self::Descriptions { .. } => CommandId::Descriptions as u8,
            Self::Command { id, .. } => *id,
        }
    }

    pub fn command(&self) -> Option<CommandId> {
        CommandId::from_u8(self.id())
    }

    pub fn name(&self) -> String {
        command_name(self.id())
    }
}
