//! CLI command implementations.

pub mod draw;
pub mod fighter;
pub mod hex_utils;
pub mod hexdump;
pub mod jobj;
pub mod read;
pub mod replay;
pub mod skeleton;
pub mod validate;

use anyhow::{Context, Result, bail};
use dolbones_core::{Fighter, InspectConfig, Melee, MemoryReader};
use tracing::info;

/// Settings shared by every command that talks to the emulator
pub struct Session {
    pub config: InspectConfig,
    pid: Option<u32>,
}

impl Session {
    pub fn new(config: InspectConfig, pid: Option<u32>) -> Self {
        Self { config, pid }
    }

    /// Attach to the emulator by pid, or by the configured process names
    pub fn attach(&self) -> Result<MemoryReader> {
        let reader = match self.pid {
            Some(pid) => MemoryReader::attach_pid(pid)
                .with_context(|| format!("Failed to attach to pid {}", pid))?,
            None => MemoryReader::attach_by_name(&self.config.process_names()).with_context(|| {
                format!(
                    "Failed to attach to any of {:?}; is Slippi Dolphin running with a game booted?",
                    self.config.process_names
                )
            })?,
        };

        let region = reader.region();
        info!(
            "Guest RAM mapped at {:#x} ({:#x} bytes)",
            region.host_base.get(),
            region.size
        );
        Ok(reader)
    }

    pub fn slot(&self, slot: Option<u32>) -> u32 {
        slot.unwrap_or(self.config.slot)
    }
}

/// Fighter in `slot`, failing if the slot is empty
pub fn present_fighter(reader: &MemoryReader, slot: u32) -> Result<Fighter> {
    let fighter = Melee::new(reader).get_fighter(slot)?;
    if !fighter.is_present() {
        bail!("No fighter in slot {}", slot);
    }
    Ok(fighter)
}
