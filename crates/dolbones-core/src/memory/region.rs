//! Location of emulated RAM inside the emulator process.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::memory::address::{GC_RAM_SIZE, GuestAddr, HostAddr};
use crate::memory::process::{ProcessMemory, RegionKind};

/// The host region backing guest RAM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    pub host_base: HostAddr,
    pub size: u64,
}

impl MemoryRegion {
    pub fn new(host_base: HostAddr, size: u64) -> Self {
        Self { host_base, size }
    }

    /// Host address of a guest span, or `None` if any byte of it falls
    /// outside guest RAM or past the end of the region
    pub fn translate(&self, address: GuestAddr, size: usize) -> Option<HostAddr> {
        let offset = address.ram_offset()?;
        let end = offset.checked_add(size as u64)?;
        if end > self.size {
            return None;
        }
        self.host_base.checked_offset(offset)
    }
}

/// Scan the target's address space for the emulator's RAM mapping.
///
/// Dolphin maps guest RAM as one large section view with no symbol to find
/// it by. A region qualifies when its size is a positive multiple of
/// `GC_RAM_SIZE`, it is a mapped (not private or image) view, and its first
/// page is resident. The first qualifying region wins.
pub fn find_ram_region<P: ProcessMemory + ?Sized>(process: &P) -> Result<MemoryRegion> {
    let mut cursor = HostAddr::new(0);

    while let Some(info) = process.query_region(cursor) {
        let Some(next) = info.end() else {
            break;
        };

        if info.size >= GC_RAM_SIZE
            && info.size % GC_RAM_SIZE == 0
            && info.kind == RegionKind::Mapped
            && !info.base.is_null()
        {
            if process.is_resident(info.base) {
                info!(
                    "Found guest RAM at host {:#x} (size {:#x})",
                    info.base, info.size
                );
                return Ok(MemoryRegion::new(info.base, info.size));
            }
            debug!("Candidate region at {:#x} is not resident", info.base);
        }

        if next <= cursor {
            break;
        }
        cursor = next;
    }

    Err(Error::RegionNotFound)
}
