//! Slippi replay (`.slp`) command streams
//!
//! Payloads other than the descriptions table and split chunks are returned
//! undecoded.

mod command;
mod reader;

pub use command::{CommandId, CommandSize, Packet, command_name};
pub use reader::{HEADER_SIZE, ReplayReader, SPLIT_BLOCK_SIZE, SPLIT_PAYLOAD_SIZE};
