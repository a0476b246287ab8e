//! Emulated file mapping for targets without a virtual-memory mapping API.
//!
//! A "view" is a page-aligned heap copy of the file prefix. It is written back
//! to the file on flush, so contents become durable only through
//! [`flush_view`].

use std::{
    alloc::{Layout, alloc_zeroed, dealloc},
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
};

#[derive(Debug)]
pub struct MappingHandle {
    file: File,
}

pub fn create_mapping(file: &File, len: usize) -> std::io::Result<MappingHandle> {
    if len == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "cannot map a zero-length region",
        ));
    }
    Ok(MappingHandle {
        file: file.try_clone()?,
    })
}

pub unsafe fn close_mapping(handle: MappingHandle) -> std::io::Result<()> {
    drop(handle);
    Ok(())
}

fn view_layout(len: usize) -> std::io::Result<Layout> {
    Layout::from_size_align(len, get_page_size())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "Invalid layout"))
}

pub unsafe fn map_view(
    handle: &MappingHandle,
    len: usize,
) -> std::io::Result<*mut std::ffi::c_void> {
    let layout = view_layout(len)?;
    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::OutOfMemory,
            "Failed to allocate memory",
        ));
    }
    let buf = unsafe { std::slice::from_raw_parts_mut(ptr, len) };
    let mut file = &handle.file;
    let res = file
        .seek(SeekFrom::Start(0))
        .and_then(|_| file.read_exact(buf));
    if let Err(e) = res {
        unsafe { dealloc(ptr, layout) };
        return Err(e);
    }
    Ok(ptr as *mut std::ffi::c_void)
}

pub unsafe fn flush_view(
    handle: &MappingHandle,
    ptr: *mut std::ffi::c_void,
    len: usize,
) -> std::io::Result<()> {
    let buf = unsafe { std::slice::from_raw_parts(ptr as *const u8, len) };
    let mut file = &handle.file;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(buf)
}

pub unsafe fn unmap_view(
    handle: &MappingHandle,
    ptr: *mut std::ffi::c_void,
    len: usize,
) -> std::io::Result<()> {
    let _ = handle;
    let layout = view_layout(len)?;
    unsafe { dealloc(ptr as *mut u8, layout) };
    Ok(())
}

pub unsafe fn advise_sequential(ptr: *mut std::ffi::c_void, len: usize) -> std::io::Result<()> {
    let _ = (ptr, len);
    Ok(())
}

/// Returns the "standard page" size in bytes.
pub fn get_page_size() -> usize {
    4 * 1024
}
