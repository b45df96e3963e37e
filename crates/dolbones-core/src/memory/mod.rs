pub mod address;
pub mod layout;
mod process;
mod reader;
mod region;

#[cfg(test)]
pub mod mock;

pub use address::{GC_RAM_END, GC_RAM_SIZE, GC_RAM_START, GuestAddr, HostAddr};
pub use process::*;
pub use reader::{MemoryReader, ReadMemory};
pub use region::{MemoryRegion, find_ram_region};

#[cfg(test)]
pub use mock::{MockMemoryBuilder, MockProcess};
