use std::{
    fs::File,
    os::fd::{AsRawFd, RawFd},
    sync::OnceLock,
};

/// Platform mapping object for a file.
///
/// POSIX has no separate mapping object: `mmap` maps straight from the file
/// descriptor. The handle only remembers the descriptor, which must stay open
/// until [`map_view`] has returned. An established view keeps its own reference
/// to the file and survives closing the descriptor.
#[derive(Debug)]
pub struct MappingHandle {
    fd: RawFd,
}

/// Creates the mapping object for `file`.
///
/// The `len` is validated only on platforms that size the mapping object
/// up front; here it is accepted as is.
pub fn create_mapping(file: &File, len: usize) -> std::io::Result<MappingHandle> {
    if len == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "cannot map a zero-length region",
        ));
    }
    Ok(MappingHandle {
        fd: file.as_raw_fd(),
    })
}

/// Closes a mapping object created by [`create_mapping`].
///
/// # Safety
///
/// No view created from `handle` may be mapped when this is called on platforms
/// that require it; on POSIX this is a no-op.
pub unsafe fn close_mapping(handle: MappingHandle) -> std::io::Result<()> {
    let _ = handle;
    Ok(())
}

/// Maps the first `len` bytes of the file behind `handle` for shared
/// read-write access.
///
/// # Returns
///
/// The base address of the view. It is aligned to [`get_page_size`].
///
/// # Safety
///
/// The returned pointer must be released with [`unmap_view`] using the same
/// `len`, exactly once. The file must be at least `len` bytes long; touching
/// pages past the end of the file raises `SIGBUS`.
pub unsafe fn map_view(
    handle: &MappingHandle,
    len: usize,
) -> std::io::Result<*mut std::ffi::c_void> {
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            handle.fd,
            0,
        )
    };
    if ptr.is_null() || ptr == libc::MAP_FAILED {
        return Err(std::io::Error::last_os_error());
    }
    Ok(ptr)
}

/// Synchronously writes the dirty pages of a view back to the file.
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
    let res = unsafe { libc::msync(ptr, len, libc::MS_SYNC) };
    if res < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Releases a view returned by [`map_view`].
///
/// # Safety
///
/// This function is safe to call as long as:
/// - `ptr` was returned by a previous call to [`map_view`]
/// - `len` matches the length passed to that call
/// - The view has not already been released
/// - No references into the view remain
pub unsafe fn unmap_view(
    handle: &MappingHandle,
    ptr: *mut std::ffi::c_void,
    len: usize,
) -> std::io::Result<()> {
    let _ = handle;
    let res = unsafe { libc::munmap(ptr, len) };
    if res < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Tells the kernel the view will be accessed sequentially, enabling
/// aggressive read-ahead.
///
/// # Safety
///
/// `ptr` and `len` must describe a live view returned by [`map_view`].
pub unsafe fn advise_sequential(ptr: *mut std::ffi::c_void, len: usize) -> std::io::Result<()> {
    let res = unsafe { libc::madvise(ptr, len, libc::MADV_SEQUENTIAL) };
    if res < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Gets the system's standard page size in bytes.
///
/// The value is cached after the first call. If the page size cannot be
/// determined, returns a default value of 4KB.
pub fn get_page_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    if let Some(&size) = SIZE.get() {
        size
    } else {
        match read_page_size() {
            Ok(size) => {
                let _ = SIZE.set(size);
                size
            }
            Err(_) => 4 * 1024,
        }
    }
}

fn read_page_size() -> std::io::Result<usize> {
    let res = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if res < 0 {
        return Err(std::io::Error::last_os_error());
    }
    assert!(res < i32::MAX as _);
    Ok(res as usize)
}
