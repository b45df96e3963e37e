//! Guest and host address types.
//!
//! Guest addresses are the emulated console's own 32-bit pointers; host
//! addresses live in the emulator process. The two never mix implicitly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Start of GameCube main RAM in guest address space
pub const GC_RAM_START: u32 = 0x8000_0000;
/// Highest guest address accepted by the reader (inclusive)
pub const GC_RAM_END: u32 = 0x8180_0000;
/// Granularity of the emulator's RAM mapping
pub const GC_RAM_SIZE: u64 = 0x0200_0000;

/// A pointer in the emulated console's address space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestAddr(u32);

impl GuestAddr {
    pub const NULL: GuestAddr = GuestAddr(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Whether the address falls in `[GC_RAM_START, GC_RAM_END]`
    pub const fn is_in_ram(self) -> bool {
        self.0 >= GC_RAM_START && self.0 <= GC_RAM_END
    }

    /// Offset into guest RAM, if the address is in range
    pub fn ram_offset(self) -> Option<u64> {
        self.is_in_ram()
            .then(|| u64::from(self.0 % GC_RAM_START))
    }

    /// Field address `self + offset`
    pub const fn offset(self, offset: u32) -> Self {
        Self(self.0.wrapping_add(offset))
    }

    /// Address of element `index` in an array of `stride`-byte records
    pub const fn index(self, index: u32, stride: u32) -> Self {
        self.offset(index.wrapping_mul(stride))
    }
}

impl From<u32> for GuestAddr {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for GuestAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GuestAddr({:#010x})", self.0)
    }
}

impl fmt::Display for GuestAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl fmt::LowerHex for GuestAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for GuestAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl FromStr for GuestAddr {
    type Err = Error;

    /// Parse a hex address, with or without a `0x` prefix
    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .trim()
            .trim_start_matches("0x")
            .trim_start_matches("0X");
        u32::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| Error::InvalidStructure(format!("Invalid guest address '{}': {}", s, e)))
    }
}

/// An address in the emulator (host) process.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostAddr(u64);

impl HostAddr {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// `self + offset`, or `None` on overflow
    pub fn checked_offset(self, offset: u64) -> Option<Self> {
        self.0.checked_add(offset).map(Self)
    }
}

impl fmt::Debug for HostAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostAddr({:#x})", self.0)
    }
}

impl fmt::LowerHex for HostAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for HostAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}
