//! Streaming reader for Slippi replay command streams

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::replay::command::{CommandId, CommandSize, Packet, command_name};

/// Bytes before the raw stream length
pub const HEADER_SIZE: usize = 11;
/// Data block carried by every split chunk
pub const SPLIT_BLOCK_SIZE: usize = 0x200;
/// Block, actual size (u16), wrapped id (u8), is_last (bool)
pub const SPLIT_PAYLOAD_SIZE: usize = SPLIT_BLOCK_SIZE + 4;

struct SplitState {
    command: u8,
    buffer: Vec<u8>,
}

/// Iterator over the records of a replay.
///
/// Split chunks are reassembled and yielded once as the wrapped command.
/// The first error ends iteration.
pub struct ReplayReader<R: Read> {
    inner: R,
    /// Bytes left in the stream, or `None` to read until EOF
    remaining: Option<u64>,
    sizes: HashMap<u8, u16>,
    split: Option<SplitState>,
    done: bool,
}

impl ReplayReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read> ReplayReader<R> {
    /// Consume the file header. A stream length of zero (as written by an
    /// unfinished recording) means read until EOF.
    pub fn new(mut inner: R) -> Result<Self> {
        let mut header = [0u8; HEADER_SIZE];
        inner.read_exact(&mut header)?;

        let mut len = [0u8; 4];
        inner.read_exact(&mut len)?;
        let raw_len = u32::from_be_bytes(len);
        debug!("Replay stream length: {}", raw_len);

        Ok(Self {
            inner,
            remaining: (raw_len != 0).then_some(u64::from(raw_len)),
            sizes: HashMap::new(),
            split: None,
            done: false,
        })
    }

    /// Payload sizes learned from the descriptions record
    pub fn command_sizes(&self) -> &HashMap<u8, u16> {
        &self.sizes
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if let Some(remaining) = self.remaining {
            if (buf.len() as u64) > remaining {
                return Err(Error::DecodeMismatch {
                    expected: format!("{} more bytes", buf.len()),
                    actual: format!("{} left in stream", remaining),
                });
            }
            self.remaining = Some(remaining - buf.len() as u64);
        }
        self.inner.read_exact(buf)?;
        Ok(())
    }

    fn read_payload(&mut self, size: usize) -> Result<Vec<u8>> {
        let mut payload = vec![0u8; size];
        self.read_exact(&mut payload)?;
        Ok(payload)
    }

    /// Next command id, or `None` at the end of the stream
    fn next_id(&mut self) -> Result<Option<u8>> {
        if self.remaining == Some(0) {
            return Ok(None);
        }
        let mut id = [0u8; 1];
        loop {
            match self.inner.read(&mut id) {
                Ok(0) => {
                    if let Some(remaining) = self.remaining {
                        warn!("Replay ended {} bytes early", remaining);
                    }
                    return Ok(None);
                }
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Ok(Some(id[0]))
    }

    fn read_descriptions(&mut self) -> Result<Packet> {
        let mut size = [0u8; 1];
        self.read_exact(&mut size)?;
        let payload = self.read_payload(usize::from(size[0]).saturating_sub(1))?;

        let sizes: Vec<CommandSize> = payload
            .chunks_exact(3)
            .map(|entry| CommandSize {
                command: entry[0],
                size: u16::from_be_bytes([entry[1], entry[2]]),
            })
            .collect();

        for entry in &sizes {
            self.sizes.insert(entry.command, entry.size);
        }
        debug!("Learned {} command sizes", sizes.len());
        Ok(Packet::Descriptions { sizes })
    }

    fn payload_size(&self, id: u8) -> Result<usize> {
        match self.sizes.get(&id) {
            Some(&size) => Ok(usize::from(size)),
            None if id == CommandId::SplitMessage as u8 => Ok(SPLIT_PAYLOAD_SIZE),
            None => Err(Error::UnknownCommand(id)),
        }
    }

    /// Fold one split chunk in; returns the whole message after the last one
    fn accept_split(&mut self, payload: &[u8]) -> Result<Option<Packet>> {
        if payload.len() < SPLIT_PAYLOAD_SIZE {
            return Err(Error::DecodeMismatch {
                expected: format!("{} byte split chunk", SPLIT_PAYLOAD_SIZE),
                actual: format!("{} bytes", payload.len()),
            });
        }

        let block = &payload[..SPLIT_BLOCK_SIZE];
        let tail = &payload[SPLIT_BLOCK_SIZE..];
        let actual = usize::from(u16::from_be_bytes([tail[0], tail[1]])).min(SPLIT_BLOCK_SIZE);
        let wrapped = tail[2];
        let is_last = tail[3] != 0;

        let state = self.split.get_or_insert_with(|| {
            debug!("Reassembling split {}", command_name(wrapped));
            SplitState {
                command: wrapped,
                buffer: Vec::new(),
            }
        });

        if state.command != wrapped {
            return Err(Error::DecodeMismatch {
                expected: format!("split chunk for {}", command_name(state.command)),
                actual: command_name(wrapped),
            });
        }
        state.buffer.extend_from_slice(&block[..actual]);

        if !is_last {
            return Ok(None);
        }

        Ok(self.split.take().map(|state| Packet::Command {
            id: state.command,
            payload: state.buffer,
            split: true,
        }))
    }

    fn next_packet(&mut self) -> Result<Option<Packet>> {
        while let Some(id) = self.next_id()? {
            if id == CommandId::Descriptions as u8 {
                return self.read_descriptions().map(Some);
            }

            let size = self.payload_size(id)?;
            let payload = self.read_payload(size)?;

            if id == CommandId::SplitMessage as u8 {
                if let Some(packet) = self.accept_split(&payload)? {
                    return Ok(Some(packet));
                }
                continue;
            }

            return Ok(Some(Packet::Command {
                id,
                payload,
                split: false,
            }));
        }

        if let Some(state) = self.split.take() {
            warn!(
                "Replay ended inside a split {} ({} bytes buffered)",
                command_name(state.command),
                state.buffer.len()
            );
        }
        Ok(None)
    }
}

impl<R: Read> Iterator for ReplayReader<R> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_packet() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
