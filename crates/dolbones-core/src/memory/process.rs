//! Target process discovery and raw OS access.
//!
//! `ProcessMemory` is the seam between the guest-memory reader and the
//! platform. The Windows implementation uses ToolHelp snapshots,
//! `VirtualQueryEx`, `QueryWorkingSetEx` and `ReadProcessMemory`.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::address::HostAddr;

/// Executable names of the Slippi build of Dolphin
pub const DEFAULT_PROCESS_NAMES: &[&str] = &["Slippi_Dolphin.exe", "Slippi Dolphin.exe"];

/// Mapping type of a host memory region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegionKind {
    /// Mapped view of an executable image
    Image,
    /// Mapped view of a section (file or pagefile backed)
    Mapped,
    /// Private allocation
    Private,
    /// Unallocated address range
    Free,
}

/// One contiguous host region as reported by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionInfo {
    pub base: HostAddr,
    pub size: u64,
    pub kind: RegionKind,
}

impl RegionInfo {
    /// First address past the region, or `None` on overflow
    pub fn end(&self) -> Option<HostAddr> {
        self.base.checked_offset(self.size)
    }
}

/// Read-only access to another process's address space
pub trait ProcessMemory {
    /// Copy bytes at `address` into `buf`, returning how many were copied
    fn read_raw(&self, address: HostAddr, buf: &mut [u8]) -> Result<usize>;

    /// Describe the region containing `address`, or `None` past the end of
    /// the address space
    fn query_region(&self, address: HostAddr) -> Option<RegionInfo>;

    /// Whether the page at `address` is currently resident
    fn is_resident(&self, address: HostAddr) -> bool;
}

impl<P: ProcessMemory + ?Sized> ProcessMemory for &P {
    fn read_raw(&self, address: HostAddr, buf: &mut [u8]) -> Result<usize> {
        (**self).read_raw(address, buf)
    }

    fn query_region(&self, address: HostAddr) -> Option<RegionInfo> {
        (**self).query_region(address)
    }

    fn is_resident(&self, address: HostAddr) -> bool {
        (**self).is_resident(address)
    }
}

/// One row of the OS process list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

/// Pick the first entry named in `names` that `open` accepts.
///
/// `open` is only tried on name matches, in list order; a rejected
/// candidate (exited, access denied) is skipped.
pub fn select_process<T, I, F>(
    entries: I,
    names: &[&str],
    mut open: F,
) -> Result<(ProcessEntry, T)>
where
    I: IntoIterator<Item = ProcessEntry>,
    F: FnMut(&ProcessEntry) -> Result<T>,
{
    for entry in entries {
        if !names.contains(&entry.name.as_str()) {
            continue;
        }
        match open(&entry) {
            Ok(opened) => return Ok((entry, opened)),
            Err(e) => debug!("Skipping {} (PID {}): {}", entry.name, entry.pid, e),
        }
    }

    Err(Error::ProcessNotFound(format!(
        "no running process named {}",
        names.join(" or ")
    )))
}

/// An opened emulator process. The OS handle is closed on drop.
pub struct ProcessHandle {
    pub pid: u32,
    pub name: String,
    #[cfg(target_os = "windows")]
    handle: windows::Win32::Foundation::HANDLE,
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("name", &self.name)
            .finish()
    }
}

impl ProcessHandle {
    /// Find a running Slippi Dolphin process
    pub fn find_and_open() -> Result<Self> {
        Self::find_by_name(DEFAULT_PROCESS_NAMES)
    }
}

#[cfg(target_os = "windows")]
mod imp {
    use std::ffi::c_void;

    use tracing::info;
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
        TH32CS_SNAPPROCESS,
    };
    use windows::Win32::System::Memory::{
        MEM_FREE, MEM_IMAGE, MEM_MAPPED, MEMORY_BASIC_INFORMATION, VirtualQueryEx,
    };
    use windows::Win32::System::ProcessStatus::{
        PSAPI_WORKING_SET_EX_INFORMATION, QueryWorkingSetEx,
    };
    use windows::Win32::System::Threading::{
        GetExitCodeProcess, OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_OPERATION,
        PROCESS_VM_READ,
    };

    use super::{ProcessEntry, ProcessHandle, ProcessMemory, RegionInfo, RegionKind, select_process};
    use crate::error::{Error, Result};
    use crate::memory::address::HostAddr;

    /// GetExitCodeProcess value for a process that has not exited
    const STILL_ACTIVE: u32 = 259;

    /// Closes a raw handle on drop
    struct HandleGuard(HANDLE);

    impl HandleGuard {
        /// Release ownership without closing
        fn into_raw(self) -> HANDLE {
            let handle = self.0;
            std::mem::forget(self);
            handle
        }
    }

    impl Drop for HandleGuard {
        fn drop(&mut self) {
            // SAFETY: the guard owns a handle returned by a successful OS call.
            unsafe {
                let _ = CloseHandle(self.0);
            }
        }
    }

    fn exe_name(entry: &PROCESSENTRY32W) -> String {
        let len = entry
            .szExeFile
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(entry.szExeFile.len());
        String::from_utf16_lossy(&entry.szExeFile[..len])
    }

    /// Open `pid` for reading and confirm it is still running
    fn open_live(pid: u32) -> Result<HandleGuard> {
        // SAFETY: OpenProcess has no pointer arguments.
        let handle = unsafe {
            OpenProcess(
                PROCESS_VM_OPERATION | PROCESS_VM_READ | PROCESS_QUERY_INFORMATION,
                false,
                pid,
            )
        }
        .map_err(|e| Error::ProcessOpenFailed(format!("PID {}: {}", pid, e)))?;
        let guard = HandleGuard(handle);

        let mut exit_code = 0u32;
        // SAFETY: exit_code is a valid out pointer for the duration of the call.
        let alive = unsafe { GetExitCodeProcess(guard.0, &mut exit_code) }.is_ok()
            && exit_code == STILL_ACTIVE;
        if !alive {
            return Err(Error::ProcessOpenFailed(format!(
                "PID {} is not running (exit code {})",
                pid, exit_code
            )));
        }

        Ok(guard)
    }

    /// Snapshot of the running processes
    fn process_list() -> Result<Vec<ProcessEntry>> {
        // SAFETY: CreateToolhelp32Snapshot has no pointer arguments.
        let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
            .map_err(|e| Error::ProcessNotFound(format!("process snapshot failed: {}", e)))?;
        let snapshot = HandleGuard(snapshot);

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        let mut entries = Vec::new();
        // SAFETY: entry is a properly sized PROCESSENTRY32W.
        let mut more = unsafe { Process32FirstW(snapshot.0, &mut entry) }.is_ok();
        while more {
            entries.push(ProcessEntry {
                pid: entry.th32ProcessID,
                name: exe_name(&entry),
            });
            // SAFETY: as above.
            more = unsafe { Process32NextW(snapshot.0, &mut entry) }.is_ok();
        }
        Ok(entries)
    }

    impl ProcessHandle {
        /// Open the first running process whose executable matches one of `names`
        pub fn find_by_name(names: &[&str]) -> Result<Self> {
            let (entry, guard) = select_process(process_list()?, names, |e| open_live(e.pid))?;
            info!("Attached to {} (PID {})", entry.name, entry.pid);
            Ok(Self {
                pid: entry.pid,
                name: entry.name,
                handle: guard.into_raw(),
            })
        }

        /// Open a specific process by PID
        pub fn open(pid: u32) -> Result<Self> {
            let handle = open_live(pid)?.into_raw();
            Ok(Self {
                pid,
                name: format!("pid {}", pid),
                handle,
            })
        }
    }

    impl Drop for ProcessHandle {
        fn drop(&mut self) {
            // SAFETY: self.handle was returned by OpenProcess and is owned by self.
            unsafe {
                let _ = CloseHandle(self.handle);
            }
        }
    }

    impl ProcessMemory for ProcessHandle {
        fn read_raw(&self, address: HostAddr, buf: &mut [u8]) -> Result<usize> {
            let mut read = 0usize;
            // SAFETY: buf is a valid writable buffer of buf.len() bytes and
            // read is a valid out pointer.
            unsafe {
                ReadProcessMemory(
                    self.handle,
                    address.get() as *const c_void,
                    buf.as_mut_ptr().cast(),
                    buf.len(),
                    Some(&mut read as *mut usize),
                )
            }
            .map_err(|e| Error::ReadFailed {
                address: address.get(),
                message: e.to_string(),
            })?;
            Ok(read)
        }

        fn query_region(&self, address: HostAddr) -> Option<RegionInfo> {
            let mut info = MEMORY_BASIC_INFORMATION::default();
            let expected = std::mem::size_of::<MEMORY_BASIC_INFORMATION>();
            // SAFETY: info is a valid out buffer of `expected` bytes.
            let written = unsafe {
                VirtualQueryEx(
                    self.handle,
                    Some(address.get() as *const c_void),
                    &mut info,
                    expected,
                )
            };
            if written != expected {
                return None;
            }

            let kind = if info.State == MEM_FREE {
                RegionKind::Free
            } else if info.Type == MEM_MAPPED {
                RegionKind::Mapped
            } else if info.Type == MEM_IMAGE {
                RegionKind::Image
            } else {
                RegionKind::Private
            };

            Some(RegionInfo {
                base: HostAddr::new(info.BaseAddress as u64),
                size: info.RegionSize as u64,
                kind,
            })
        }

        fn is_resident(&self, address: HostAddr) -> bool {
            let mut info = PSAPI_WORKING_SET_EX_INFORMATION {
                VirtualAddress: address.get() as *mut c_void,
                ..Default::default()
            };
            // SAFETY: info is a valid in/out buffer of the size passed.
            let ok = unsafe {
                QueryWorkingSetEx(
                    self.handle,
                    (&mut info as *mut PSAPI_WORKING_SET_EX_INFORMATION).cast(),
                    std::mem::size_of::<PSAPI_WORKING_SET_EX_INFORMATION>() as u32,
                )
            }
            .is_ok();

            // SAFETY: Flags is the plain-integer view of the union.
            ok && unsafe { info.VirtualAttributes.Flags } & 1 != 0
        }
    }
}

#[cfg(not(target_os = "windows"))]
mod imp {
    use super::{ProcessHandle, ProcessMemory, RegionInfo};
    use crate::error::{Error, Result};
    use crate::memory::address::HostAddr;

    impl ProcessHandle {
        pub fn find_by_name(names: &[&str]) -> Result<Self> {
            Err(Error::ProcessNotFound(format!(
                "looking up {} is only supported on Windows",
                names.join(" or ")
            )))
        }

        pub fn open(pid: u32) -> Result<Self> {
            Err(Error::ProcessNotFound(format!(
                "opening PID {} is only supported on Windows",
                pid
            )))
        }
    }

    impl ProcessMemory for ProcessHandle {
        fn read_raw(&self, address: HostAddr, _buf: &mut [u8]) -> Result<usize> {
            Err(Error::ReadFailed {
                address: address.get(),
                message: "process memory access is only supported on Windows".to_string(),
            })
        }

        fn query_region(&self, _address: HostAddr) -> Option<RegionInfo> {
            None
        }

        fn is_resident(&self, _address: HostAddr) -> bool {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_end() {
        let region = RegionInfo {
            base: HostAddr::new(0x1000),
            size: 0x2000,
            kind: RegionKind::Private,
        };
        assert_eq!(region.end(), Some(HostAddr::new(0x3000)));

        let wrapping = RegionInfo {
            base: HostAddr::new(u64::MAX - 1),
            size: 0x10,
            kind: RegionKind::Free,
        };
        assert_eq!(wrapping.end(), None);
    }

    fn entry(pid: u32, name: &str) -> ProcessEntry {
        ProcessEntry {
            pid,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_select_skips_dead_match() {
        let entries = vec![
            entry(4, "System"),
            entry(10, "Slippi_Dolphin.exe"),
            entry(11, "explorer.exe"),
            entry(12, "Slippi Dolphin.exe"),
            entry(13, "Slippi_Dolphin.exe"),
        ];
        let mut tried = Vec::new();

        let (chosen, opened) = select_process(entries, DEFAULT_PROCESS_NAMES, |e| {
            tried.push(e.pid);
            if e.pid == 10 {
                Err(Error::ProcessOpenFailed("PID 10 is not running (exit code 0)".into()))
            } else {
                Ok(e.pid * 100)
            }
        })
        .unwrap();

        assert_eq!(chosen, entry(12, "Slippi Dolphin.exe"));
        assert_eq!(opened, 1200);
        // non-matching names are never opened; later matches are not tried
        assert_eq!(tried, vec![10, 12]);
    }

    #[test]
    fn test_select_no_match() {
        let entries = vec![entry(4, "System"), entry(20, "Dolphin.exe")];
        let err = select_process(entries, DEFAULT_PROCESS_NAMES, |_| -> Result<()> {
            panic!("nothing should be opened")
        })
        .unwrap_err();

        assert!(matches!(err, Error::ProcessNotFound(_)));
        assert!(err.to_string().contains("Slippi_Dolphin.exe"));
    }

    #[test]
    fn test_select_all_matches_dead() {
        let entries = vec![entry(10, "Slippi_Dolphin.exe"), entry(12, "Slippi_Dolphin.exe")];
        let result = select_process(entries, &["Slippi_Dolphin.exe"], |e| -> Result<()> {
            Err(Error::ProcessOpenFailed(format!("PID {} exited", e.pid)))
        });
        assert!(matches!(result, Err(Error::ProcessNotFound(_))));
    }

    #[test]
    fn test_select_is_case_sensitive() {
        let entries = vec![entry(10, "slippi_dolphin.exe")];
        assert!(select_process(entries, DEFAULT_PROCESS_NAMES, |_| Ok(())).is_err());
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_lookup_unsupported_off_windows() {
        let err = ProcessHandle::find_and_open().unwrap_err();
        assert!(err.is_attach_error());
        assert!(err.to_string().contains("Slippi_Dolphin.exe"));
    }
}
