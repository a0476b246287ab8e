//! Windows-specific open flags.
//!
//! Files are opened with `FILE_SHARE_READ` so that other processes may read
//! the file while the block is live, and the access hints map onto
//! `FILE_FLAG_SEQUENTIAL_SCAN` and `FILE_FLAG_WRITE_THROUGH`.

use std::{
    fs::{File, OpenOptions},
    os::windows::fs::OpenOptionsExt,
};

use windows_sys::Win32::Storage::FileSystem::{
    FILE_FLAG_SEQUENTIAL_SCAN, FILE_FLAG_WRITE_THROUGH, FILE_SHARE_READ,
};

use crate::{fs::AccessMode, options::AccessHints};

pub fn apply_open_options(options: &mut OpenOptions, hints: &AccessHints) {
    options.share_mode(FILE_SHARE_READ);
    let mut flags = 0;
    if hints.sequential_scan {
        flags |= FILE_FLAG_SEQUENTIAL_SCAN;
    }
    if hints.write_through {
        flags |= FILE_FLAG_WRITE_THROUGH;
    }
    if flags != 0 {
        options.custom_flags(flags);
    }
}

pub fn advise(_file: &File, _hints: &AccessHints) {}

/// The granted access of a handle is not queryable through the stable API.
/// A handle lacking read or write access is detected when the mapping object
/// is refused.
pub fn access_mode(_file: &File) -> std::io::Result<Option<AccessMode>> {
    Ok(None)
}
