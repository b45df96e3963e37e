//! Fake process for testing readers and decoders without a live emulator.

use std::cell::Cell;

use crate::error::{Error, Result};
use crate::memory::address::{GC_RAM_SIZE, GuestAddr, HostAddr};
use crate::memory::process::{ProcessMemory, RegionInfo, RegionKind};
use crate::memory::reader::MemoryReader;
use crate::memory::region::MemoryRegion;

/// Host address the builder maps guest RAM at
pub const MOCK_HOST_BASE: u64 = 0x7FF6_0000_0000;

/// A fake `ProcessMemory` with configurable regions and backing bytes.
pub struct MockProcess {
    /// Regions in ascending address order, with their residency
    regions: Vec<(RegionInfo, bool)>,
    data: Vec<u8>,
    data_base: HostAddr,
    /// Cap on bytes returned per read, to simulate short reads
    short_read: Option<usize>,
    read_calls: Cell<usize>,
}

impl MockProcess {
    /// A process with no regions and no readable memory
    pub fn empty() -> Self {
        Self {
            regions: Vec::new(),
            data: Vec::new(),
            data_base: HostAddr::new(0),
            short_read: None,
            read_calls: Cell::new(0),
        }
    }

    /// A process whose only readable memory is `data` at `base`, exposed as
    /// one resident mapped region
    pub fn with_data(data: Vec<u8>, base: u64) -> Self {
        let size = data.len() as u64;
        let mut process = Self::empty().with_region(base, size, RegionKind::Mapped, true);
        process.data = data;
        process.data_base = HostAddr::new(base);
        process
    }

    /// Add a region; regions must be added in ascending order
    pub fn with_region(mut self, base: u64, size: u64, kind: RegionKind, resident: bool) -> Self {
        self.regions.push((
            RegionInfo {
                base: HostAddr::new(base),
                size,
                kind,
            },
            resident,
        ));
        self
    }

    /// Return at most `max` bytes from every read
    pub fn with_short_reads(mut self, max: usize) -> Self {
        self.short_read = Some(max);
        self
    }

    /// Number of `read_raw` calls made so far
    pub fn read_calls(&self) -> usize {
        self.read_calls.get()
    }
}

impl ProcessMemory for MockProcess {
    fn read_raw(&self, address: HostAddr, buf: &mut [u8]) -> Result<usize> {
        self.read_calls.set(self.read_calls.get() + 1);

        let start = address
            .get()
            .checked_sub(self.data_base.get())
            .map(|offset| offset as usize)
            .filter(|&offset| offset + buf.len() <= self.data.len())
            .ok_or_else(|| Error::ReadFailed {
                address: address.get(),
                message: "unmapped memory".to_string(),
            })?;

        let len = self.short_read.map_or(buf.len(), |max| max.min(buf.len()));
        buf[..len].copy_from_slice(&self.data[start..start + len]);
        Ok(len)
    }

    fn query_region(&self, address: HostAddr) -> Option<RegionInfo> {
        // Gaps between configured regions are reported as free space
        let mut gap_start = 0u64;
        for (info, _) in &self.regions {
            if address.get() < info.base.get() {
                return Some(RegionInfo {
                    base: HostAddr::new(gap_start.max(address.get())),
                    size: info.base.get() - gap_start.max(address.get()),
                    kind: RegionKind::Free,
                });
            }
            let end = info.end()?;
            if address < end {
                return Some(*info);
            }
            gap_start = end.get();
        }
        None
    }

    fn is_resident(&self, address: HostAddr) -> bool {
        self.regions
            .iter()
            .any(|(info, resident)| *resident && info.base == address)
    }
}

/// Builds a guest RAM image with big-endian values at guest addresses.
pub struct MockMemoryBuilder {
    ram: Vec<u8>,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self {
            ram: vec![0u8; GC_RAM_SIZE as usize],
        }
    }

    fn offset(address: u32) -> usize {
        GuestAddr::new(address)
            .ram_offset()
            .map(|o| o as usize)
            .unwrap_or_else(|| panic!("fixture address {:#x} is outside guest RAM", address))
    }

    pub fn write_bytes(mut self, address: u32, bytes: &[u8]) -> Self {
        let start = Self::offset(address);
        self.ram[start..start + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn write_u8(self, address: u32, value: u8) -> Self {
        self.write_bytes(address, &[value])
    }

    pub fn write_u16(self, address: u32, value: u16) -> Self {
        self.write_bytes(address, &value.to_be_bytes())
    }

    pub fn write_u32(self, address: u32, value: u32) -> Self {
        self.write_bytes(address, &value.to_be_bytes())
    }

    pub fn write_f32(self, address: u32, value: f32) -> Self {
        self.write_bytes(address, &value.to_be_bytes())
    }

    pub fn write_f32s(self, address: u32, values: &[f32]) -> Self {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.write_bytes(address, &bytes)
    }

    /// A process exposing the image as its guest RAM mapping
    pub fn build(self) -> MockProcess {
        MockProcess::with_data(self.ram, MOCK_HOST_BASE)
    }

    /// A reader over the image with the RAM region already located
    pub fn reader(self) -> MemoryReader<MockProcess> {
        let region = MemoryRegion::new(HostAddr::new(MOCK_HOST_BASE), GC_RAM_SIZE);
        MemoryReader::with_process(self.build(), region)
    }
}

impl Default for MockMemoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_read_raw() {
        let process = MockProcess::with_data(vec![0x41, 0x42, 0x43, 0x44], 0x1000);

        let mut buf = [0u8; 2];
        assert_eq!(process.read_raw(HostAddr::new(0x1001), &mut buf).unwrap(), 2);
        assert_eq!(buf, [0x42, 0x43]);
        assert_eq!(process.read_calls(), 1);

        let mut past_end = [0u8; 4];
        assert!(process.read_raw(HostAddr::new(0x1002), &mut past_end).is_err());
        assert_eq!(process.read_calls(), 2);
    }

    #[test]
    fn test_mock_short_read() {
        let process = MockProcess::with_data(vec![1, 2, 3, 4], 0x1000).with_short_reads(3);
        let mut buf = [0u8; 4];
        assert_eq!(process.read_raw(HostAddr::new(0x1000), &mut buf).unwrap(), 3);
    }

    #[test]
    fn test_mock_query_reports_gaps() {
        let process = MockProcess::empty()
            .with_region(0x1000, 0x1000, RegionKind::Image, true)
            .with_region(0x4000, 0x1000, RegionKind::Mapped, false);

        let gap = process.query_region(HostAddr::new(0)).unwrap();
        assert_eq!(gap.kind, RegionKind::Free);
        assert_eq!(gap.end(), Some(HostAddr::new(0x1000)));

        let image = process.query_region(HostAddr::new(0x1800)).unwrap();
        assert_eq!(image.base, HostAddr::new(0x1000));

        let second_gap = process.query_region(HostAddr::new(0x2000)).unwrap();
        assert_eq!(second_gap.base, HostAddr::new(0x2000));
        assert_eq!(second_gap.size, 0x2000);

        assert!(process.query_region(HostAddr::new(0x5000)).is_none());
        assert!(!process.is_resident(HostAddr::new(0x4000)));
    }

    #[test]
    fn test_builder_writes_big_endian() {
        let process = MockMemoryBuilder::new()
            .write_u32(0x8000_0010, 0xDEAD_BEEF)
            .build();
        let mut buf = [0u8; 4];
        process
            .read_raw(HostAddr::new(MOCK_HOST_BASE + 0x10), &mut buf)
            .unwrap();
        assert_eq!(buf, [0xDE, 0xAD, 0xBE, 0xEF]);
    }
}
