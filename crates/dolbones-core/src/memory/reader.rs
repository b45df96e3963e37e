use tracing::debug;

use crate::decode::{FloatArray, Layout, Value};
use crate::error::{Error, Result};
use crate::memory::address::GuestAddr;
use crate::memory::process::{ProcessHandle, ProcessMemory};
use crate::memory::region::{MemoryRegion, find_ram_region};

/// Fixed-size read; a buffer of any other length is a failed read
fn read_array<R: ReadMemory + ?Sized, const N: usize>(
    reader: &R,
    address: GuestAddr,
) -> Result<[u8; N]> {
    let buffer = reader.read_bytes(address, N)?;
    let len = buffer.len();
    buffer.try_into().map_err(|_| Error::ReadFailed {
        address: u64::from(address.get()),
        message: format!("asked for {} bytes, got {}", N, len),
    })
}

/// Trait for reading guest memory
///
/// All multi-byte values are big-endian, as on the console.
pub trait ReadMemory {
    /// Read exactly `size` bytes starting at `address`
    fn read_bytes(&self, address: GuestAddr, size: usize) -> Result<Vec<u8>>;

    fn read_u8(&self, address: GuestAddr) -> Result<u8> {
        read_array::<_, 1>(self, address).map(|[b]| b)
    }

    fn read_u16(&self, address: GuestAddr) -> Result<u16> {
        read_array(self, address).map(u16::from_be_bytes)
    }

    fn read_u32(&self, address: GuestAddr) -> Result<u32> {
        read_array(self, address).map(u32::from_be_bytes)
    }

    fn read_i32(&self, address: GuestAddr) -> Result<i32> {
        self.read_u32(address).map(|v| v as i32)
    }

    fn read_f32(&self, address: GuestAddr) -> Result<f32> {
        self.read_u32(address).map(f32::from_bits)
    }

    /// Read a guest pointer. Zero means absent and is returned as-is.
    fn read_ptr(&self, address: GuestAddr) -> Result<GuestAddr> {
        self.read_u32(address).map(GuestAddr::new)
    }

    /// Read and unpack a struct layout. A single-field layout yields a bare
    /// scalar, anything else an ordered list.
    fn read_value(&self, address: GuestAddr, layout: &Layout) -> Result<Value> {
        let buffer = self.read_bytes(address, layout.size())?;
        layout.unpack_value(&buffer)
    }

    /// Read `product(shape)` contiguous big-endian f32s
    fn read_float_array(&self, address: GuestAddr, shape: &[usize]) -> Result<FloatArray> {
        let count = FloatArray::element_count(shape)?;
        let buffer = self.read_bytes(address, count * 4)?;
        FloatArray::from_be_bytes(&buffer, shape)
    }
}

impl<R: ReadMemory + ?Sized> ReadMemory for &R {
    fn read_bytes(&self, address: GuestAddr, size: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(address, size)
    }
}

/// Bounds-checked reader over an emulator's guest RAM
///
/// Owns the process handle for its lifetime; the handle is released when the
/// reader is dropped.
#[derive(Debug)]
pub struct MemoryReader<P: ProcessMemory = ProcessHandle> {
    process: P,
    region: MemoryRegion,
}

impl MemoryReader<ProcessHandle> {
    /// Find a running emulator and locate its guest RAM
    pub fn attach() -> Result<Self> {
        Self::new(ProcessHandle::find_and_open()?)
    }

    /// Attach to the first running process matching one of `names`
    pub fn attach_by_name(names: &[&str]) -> Result<Self> {
        Self::new(ProcessHandle::find_by_name(names)?)
    }

    /// Attach to a specific PID
    pub fn attach_pid(pid: u32) -> Result<Self> {
        Self::new(ProcessHandle::open(pid)?)
    }
}

impl<P: ProcessMemory> MemoryReader<P> {
    /// Locate guest RAM in `process`
    pub fn new(process: P) -> Result<Self> {
        let region = find_ram_region(&process)?;
        Ok(Self::with_process(process, region))
    }

    /// Use an already-located region
    pub fn with_process(process: P, region: MemoryRegion) -> Self {
        Self { process, region }
    }

    pub fn region(&self) -> MemoryRegion {
        self.region
    }

    pub fn process(&self) -> &P {
        &self.process
    }
}

impl<P: ProcessMemory> ReadMemory for MemoryReader<P> {
    fn read_bytes(&self, address: GuestAddr, size: usize) -> Result<Vec<u8>> {
        let host = self
            .region
            .translate(address, size)
            .ok_or(Error::OutOfRange {
                address: u64::from(address.get()),
                size,
            })?;

        if size == 0 {
            return Ok(Vec::new());
        }

        let mut buffer = vec![0u8; size];
        let read = self.process.read_raw(host, &mut buffer)?;
        if read != size {
            return Err(Error::ReadFailed {
                address: u64::from(address.get()),
                message: format!("asked for {} bytes, only read {}", size, read),
            });
        }

        debug!("read {} bytes from {}", size, address);
        Ok(buffer)
    }
}
