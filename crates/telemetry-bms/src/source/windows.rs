//! Named shared memory source for Windows hosts.
#![expect(unsafe_code, reason = "Win32 file mapping calls")]

use super::RawFrameSource;
use crate::frame::RawFrame;
use falcon_telemetry_core::TelemetryError;
use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use tracing::{debug, info};
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{FILE_MAP_READ, MapViewOfFile, OpenFileMappingW, UnmapViewOfFile};
use winapi::um::winnt::HANDLE;

struct MappedView {
    handle: HANDLE,
    base_ptr: *const u8,
}

// SAFETY: the view is read-only and only touched by the thread owning the source.
unsafe impl Send for MappedView {}

impl MappedView {
    fn open(wide_name: &[u16]) -> Result<Self, TelemetryError> {
        // SAFETY: `wide_name` is a valid null-terminated UTF-16 string and every
        // handle obtained here is released on the error paths or in `Drop`.
        unsafe {
            let handle = OpenFileMappingW(FILE_MAP_READ, 0, wide_name.as_ptr());
            if handle.is_null() {
                return Err(TelemetryError::source_unavailable(
                    "shared memory area is not open",
                ));
            }
            let view = MapViewOfFile(handle, FILE_MAP_READ, 0, 0, RawFrame::SIZE);
            if view.is_null() {
                CloseHandle(handle);
                return Err(TelemetryError::source_unavailable(
                    "failed to map shared memory view",
                ));
            }
            Ok(Self {
                handle,
                base_ptr: view as *const u8,
            })
        }
    }

    fn bytes(&self) -> &[u8] {
        // SAFETY: the view was mapped with at least `RawFrame::SIZE` bytes and
        // stays mapped for the lifetime of `self`.
        unsafe { std::slice::from_raw_parts(self.base_ptr, RawFrame::SIZE) }
    }
}

impl Drop for MappedView {
    fn drop(&mut self) {
        // SAFETY: these handles/pointers were created by MapViewOfFile/OpenFileMappingW.
        unsafe {
            if !self.base_ptr.is_null() {
                UnmapViewOfFile(self.base_ptr as *const _);
            }
            if !self.handle.is_null() {
                CloseHandle(self.handle);
            }
        }
    }
}

/// Reads frames from the simulator's named file mapping.
///
/// The mapping is opened lazily, kept across reads and released after a failed
/// read so the next attempt reopens it.
pub struct SharedMemorySource {
    name: String,
    wide_name: Vec<u16>,
    view: Option<MappedView>,
}

impl SharedMemorySource {
    pub fn new(name: &str) -> Self {
        let wide_name = OsStr::new(name)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();
        Self {
            name: name.to_string(),
            wide_name,
            view: None,
        }
    }
}

impl RawFrameSource for SharedMemorySource {
    fn read(&mut self) -> Result<RawFrame, TelemetryError> {
        if self.view.is_none() {
            let view = MappedView::open(&self.wide_name)?;
            info!(name = %self.name, "Opened Falcon shared memory");
            self.view = Some(view);
        }
        let decoded = match &self.view {
            Some(view) => RawFrame::decode(view.bytes()),
            None => Err(TelemetryError::source_unavailable("shared memory view missing")),
        };
        if decoded.is_err() {
            debug!(name = %self.name, "Releasing shared memory view after failed read");
            self.view = None;
        }
        decoded
    }

    fn describe(&self) -> String {
        format!("shared memory {}", self.name)
    }
}
