use std::{fs::File, os::windows::io::AsRawHandle, sync::OnceLock};

use windows_sys::Win32::{
    Foundation::{CloseHandle, GetLastError, HANDLE},
    System::{
        Memory::{
            CreateFileMappingW, FILE_MAP_READ, FILE_MAP_WRITE, FlushViewOfFile,
            MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile, PAGE_READWRITE, UnmapViewOfFile,
        },
        SystemInformation::{GetSystemInfo, SYSTEM_INFO},
    },
};

/// Platform mapping object for a file (a section object created by
/// `CreateFileMappingW`).
#[derive(Debug)]
pub struct MappingHandle {
    handle: HANDLE,
}

fn last_error() -> std::io::Error {
    let error = unsafe { GetLastError() };
    std::io::Error::from_raw_os_error(error as i32)
}

/// Creates a read-write mapping object for `file`.
///
/// The mapping object is sized to the current length of the file; `len` only
/// has to be non-zero and not larger than the file.
///
/// # Errors
///
/// Fails with `PermissionDenied` when the file handle was not opened for both
/// reading and writing.
pub fn create_mapping(file: &File, len: usize) -> std::io::Result<MappingHandle> {
    if len == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "cannot map a zero-length region",
        ));
    }
    let handle = unsafe {
        CreateFileMappingW(
            file.as_raw_handle() as HANDLE,
            std::ptr::null(),
            PAGE_READWRITE,
            0,
            0,
            std::ptr::null(),
        )
    };
    if handle.is_null() {
        return Err(last_error());
    }
    Ok(MappingHandle { handle })
}

/// Closes a mapping object created by [`create_mapping`].
///
/// # Safety
///
/// The handle must not be used after this call. Views mapped from it stay
/// valid until they are unmapped.
pub unsafe fn close_mapping(handle: MappingHandle) -> std::io::Result<()> {
    let result = unsafe { CloseHandle(handle.handle) };
    if result == 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Maps the first `len` bytes of the mapping object for read-write access.
///
/// # Safety
///
/// The returned pointer must be released with [`unmap_view`], exactly once.
pub unsafe fn map_view(
    handle: &MappingHandle,
    len: usize,
) -> std::io::Result<*mut std::ffi::c_void> {
    let view = unsafe { MapViewOfFile(handle.handle, FILE_MAP_READ | FILE_MAP_WRITE, 0, 0, len) };
    if view.Value.is_null() {
        return Err(last_error());
    }
    Ok(view.Value)
}

/// Writes the dirty pages of a view back to the file.
///
/// `FlushViewOfFile` initiates the write-back; forcing the data and metadata to
/// stable storage additionally requires flushing the file handle.
///
/// # Safety
///
/// `ptr` and `len` must describe a live view returned by [`map_view`].
pub unsafe fn flush_view(
    handle: &MappingHandle,
    ptr: *mut std::ffi::c_void,
    len: usize,
) -> std::io::Result<()> {
    let _ = handle;
    let result = unsafe { FlushViewOfFile(ptr as *const _, len) };
    if result == 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Releases a view returned by [`map_view`].
///
/// # Safety
///
/// This function is safe to call as long as:
/// - `ptr` was returned by a previous call to [`map_view`]
/// - The view has not already been released
/// - No references into the view remain
pub unsafe fn unmap_view(
    handle: &MappingHandle,
    ptr: *mut std::ffi::c_void,
    len: usize,
) -> std::io::Result<()> {
    let _ = (handle, len);
    let result = unsafe { UnmapViewOfFile(MEMORY_MAPPED_VIEW_ADDRESS { Value: ptr }) };
    if result == 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Sequential access is requested through `FILE_FLAG_SEQUENTIAL_SCAN` when the
/// file is opened; there is no per-view equivalent.
///
/// # Safety
///
/// `ptr` and `len` must describe a live view returned by [`map_view`].
pub unsafe fn advise_sequential(ptr: *mut std::ffi::c_void, len: usize) -> std::io::Result<()> {
    let _ = (ptr, len);
    Ok(())
}

/// Gets the system's standard page size in bytes.
pub fn get_page_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| {
        let mut info: SYSTEM_INFO = unsafe { std::mem::zeroed() };
        unsafe { GetSystemInfo(&mut info) };
        if info.dwPageSize == 0 {
            4 * 1024
        } else {
            info.dwPageSize as usize
        }
    })
}
