//! File-open layer for mapped file blocks.
//!
//! Files are always opened for reading and writing, with other readers allowed
//! where the platform supports share modes. [`AccessHints`] translate into
//! platform open flags and advice.

#[cfg_attr(unix, path = "unix.rs")]
#[cfg_attr(windows, path = "windows.rs")]
#[cfg_attr(not(any(unix, windows)), path = "generic.rs")]
mod platform;

use std::{fs::File, path::Path};

use crate::options::AccessHints;

pub use platform::access_mode;

/// How to treat an existing (or missing) file at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create the file, truncating it if it already exists.
    Create,
    /// Open the file if it exists, otherwise create it empty.
    OpenOrCreate,
    /// Open an existing file; fail with `NotFound` if it is missing.
    Open,
}

/// Read/write capabilities of an open file handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessMode {
    pub readable: bool,
    pub writable: bool,
}

impl AccessMode {
    pub fn is_read_write(&self) -> bool {
        self.readable && self.writable
    }
}

/// Opens `path` for reading and writing according to `mode`, applying `hints`.
pub fn open(path: &Path, mode: OpenMode, hints: &AccessHints) -> std::io::Result<File> {
    let mut options = File::options();
    options.read(true).write(true);
    match mode {
        OpenMode::Create => {
            options.create(true).truncate(true);
        }
        OpenMode::OpenOrCreate => {
            options.create(true);
        }
        OpenMode::Open => (),
    }
    platform::apply_open_options(&mut options, hints);
    let file = options.open(path)?;
    platform::advise(&file, hints);
    Ok(file)
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_open_modes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modes.bin");
        let hints = AccessHints::default();

        let err = open(&path, OpenMode::Open, &hints).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);

        let mut file = open(&path, OpenMode::OpenOrCreate, &hints).unwrap();
        file.write_all(b"abc").unwrap();
        drop(file);

        let mut file = open(&path, OpenMode::OpenOrCreate, &hints).unwrap();
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"abc");
        drop(file);

        let file = open(&path, OpenMode::Create, &AccessHints::NONE).unwrap();
        assert_eq!(file.metadata().unwrap().len(), 0);
        drop(file);

        let file = open(&path, OpenMode::Open, &hints).unwrap();
        assert_eq!(file.metadata().unwrap().len(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_access_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("access.bin");
        let file = open(&path, OpenMode::Create, &AccessHints::default()).unwrap();
        let mode = access_mode(&file).unwrap().unwrap();
        assert!(mode.is_read_write());
        drop(file);

        let file = File::open(&path).unwrap();
        let mode = access_mode(&file).unwrap().unwrap();
        assert_eq!(
            mode,
            AccessMode {
                readable: true,
                writable: false
            }
        );

        let file = File::options().append(true).open(&path).unwrap();
        let mode = access_mode(&file).unwrap().unwrap();
        assert!(!mode.readable);
        assert!(mode.writable);
    }
}
