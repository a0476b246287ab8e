//! Unix-specific open flags and file advice.

use std::{
    fs::{File, OpenOptions},
    os::{fd::AsRawFd, unix::fs::OpenOptionsExt},
};

use crate::{fs::AccessMode, options::AccessHints};

/// Requests synchronized data writes (`O_DSYNC`) for write-through.
pub fn apply_open_options(options: &mut OpenOptions, hints: &AccessHints) {
    if hints.write_through {
        options.custom_flags(libc::O_DSYNC);
    }
}

/// Advises the kernel of sequential access where `posix_fadvise` is available.
///
/// Failures are ignored: the advice has no effect on correctness.
#[allow(unused_variables)]
pub fn advise(file: &File, hints: &AccessHints) {
    #[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
    if hints.sequential_scan {
        let res =
            unsafe { libc::posix_fadvise(file.as_raw_fd(), 0, 0, libc::POSIX_FADV_SEQUENTIAL) };
        if res != 0 {
            log::trace!("posix_fadvise(SEQUENTIAL) failed: errno {res}");
        }
    }
}

/// Reads the access mode the descriptor was opened with (`fcntl(F_GETFL)`).
pub fn access_mode(file: &File) -> std::io::Result<Option<AccessMode>> {
    let flags = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_GETFL) };
    if flags < 0 {
        return Err(std::io::Error::last_os_error());
    }
    let mode = match flags & libc::O_ACCMODE {
        libc::O_RDONLY => AccessMode {
            readable: true,
            writable: false,
        },
        libc::O_WRONLY => AccessMode {
            readable: false,
            writable: true,
        },
        _ => AccessMode {
            readable: true,
            writable: true,
        },
    };
    Ok(Some(mode))
}
