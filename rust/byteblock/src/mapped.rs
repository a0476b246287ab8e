//! Byte block backed by a memory-mapped file.
//!
//! A [`MappedFileBlock`] owns an open file handle and a read-write view of the
//! file mapped into memory. Construction runs strictly in order: open the file,
//! size it, then map the view (acquiring its base address once). Disposal runs
//! the reverse: flush, release the view and its mapping object, then close the
//! file handle unless the caller asked for it to stay open.
//!
//! Any failure during construction releases whatever was already acquired
//! before the error is returned.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use byteblock_common::{Error, Result, verify_arg};
use byteblock_mmap::MappedView;

use crate::{
    block::{ByteBlock, MAX_REGION_LEN},
    fs::{self, OpenMode},
    options::{FlushMode, MapOptions},
};

enum MappedState {
    Live { view: MappedView, file: File },
    Disposed { file: Option<File> },
}

/// A byte block whose region is a memory-mapped view of a file.
///
/// The view covers the whole file, up to [`MAX_REGION_LEN`] bytes. Larger
/// files are refused with `FileTooLarge` unless
/// [`MapOptions::allow_truncated_view`] is set, in which case only the first
/// [`MAX_REGION_LEN`] bytes are reachable.
///
/// The file must not be truncated by anyone else while the block is live.
pub struct MappedFileBlock {
    state: MappedState,
    path: Option<PathBuf>,
    flush_mode: FlushMode,
    leave_open: bool,
}

impl MappedFileBlock {
    /// Creates (or truncates) the file at `path`, sets its length to `size` and
    /// maps it.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `size` is zero or exceeds [`MAX_REGION_LEN`].
    /// - `Io` if the file cannot be created, sized or mapped.
    pub fn create(
        path: impl AsRef<Path>,
        size: usize,
        options: &MapOptions,
    ) -> Result<MappedFileBlock> {
        verify_arg!(size, size > 0);
        verify_arg!(size, size <= MAX_REGION_LEN);
        let path = path.as_ref();
        let file = fs::open(path, OpenMode::Create, &options.hints)
            .map_err(|e| Error::io(format!("create {}", path.display()), e))?;
        file.set_len(size as u64)
            .map_err(|e| Error::io(format!("set_len {}", path.display()), e))?;
        Self::map_file(file, Some(path.to_path_buf()), options)
    }

    /// Opens the file at `path`, keeping its current length, or creates it with
    /// a length of `size_if_creating`.
    ///
    /// An existing empty file is sized to `size_if_creating` as well, since an
    /// empty region cannot be mapped.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `size_if_creating` is zero or exceeds
    ///   [`MAX_REGION_LEN`].
    /// - `FileTooLarge` if an existing file is larger than [`MAX_REGION_LEN`]
    ///   and truncated views are not allowed.
    /// - `Io` if the file cannot be opened, sized or mapped.
    pub fn open_or_create(
        path: impl AsRef<Path>,
        size_if_creating: usize,
        options: &MapOptions,
    ) -> Result<MappedFileBlock> {
        verify_arg!(size_if_creating, size_if_creating > 0);
        verify_arg!(size_if_creating, size_if_creating <= MAX_REGION_LEN);
        let path = path.as_ref();
        let file = fs::open(path, OpenMode::OpenOrCreate, &options.hints)
            .map_err(|e| Error::io(format!("open {}", path.display()), e))?;
        let len = file
            .metadata()
            .map_err(|e| Error::io(format!("metadata {}", path.display()), e))?
            .len();
        if len == 0 {
            file.set_len(size_if_creating as u64)
                .map_err(|e| Error::io(format!("set_len {}", path.display()), e))?;
        }
        Self::map_file(file, Some(path.to_path_buf()), options)
    }

    /// Opens an existing file at `path` for reading and writing and maps it.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the file is empty.
    /// - `FileTooLarge` if the file is larger than [`MAX_REGION_LEN`] and
    ///   truncated views are not allowed.
    /// - `Io` if the file does not exist or cannot be opened or mapped.
    pub fn open(path: impl AsRef<Path>, options: &MapOptions) -> Result<MappedFileBlock> {
        let path = path.as_ref();
        let file = fs::open(path, OpenMode::Open, &options.hints)
            .map_err(|e| Error::io(format!("open {}", path.display()), e))?;
        Self::map_file(file, Some(path.to_path_buf()), options)
    }

    /// Maps an already open file.
    ///
    /// The handle must have been opened for both reading and writing. Access
    /// hints in `options` are not applied, since the file is already open.
    ///
    /// # Errors
    ///
    /// - `NotReadableOrWritable` if the handle lacks read or write access.
    /// - `InvalidArgument` if the file is empty.
    /// - `FileTooLarge` if the file is larger than [`MAX_REGION_LEN`] and
    ///   truncated views are not allowed.
    /// - `Io` if the file cannot be mapped.
    pub fn from_file(file: File, options: &MapOptions) -> Result<MappedFileBlock> {
        Self::map_file(file, None, options)
    }

    fn map_file(file: File, path: Option<PathBuf>, options: &MapOptions) -> Result<MappedFileBlock> {
        let display = display_path(path.as_deref());

        let access = fs::access_mode(&file)
            .map_err(|e| Error::io(format!("access mode {display}"), e))?;
        if let Some(access) = access {
            if !access.is_read_write() {
                return Err(Error::not_readable_or_writable(
                    access.readable,
                    access.writable,
                ));
            }
        }

        let file_len = file
            .metadata()
            .map_err(|e| Error::io(format!("metadata {display}"), e))?
            .len();
        if file_len == 0 {
            return Err(Error::invalid_arg("file", "file length > 0"));
        }
        let len = if file_len > MAX_REGION_LEN as u64 {
            if !options.allow_truncated_view {
                return Err(Error::file_too_large(file_len, MAX_REGION_LEN as u64));
            }
            log::debug!(
                "{display}: mapping the first {MAX_REGION_LEN} of {file_len} bytes (truncated view)"
            );
            MAX_REGION_LEN
        } else {
            file_len as usize
        };

        let view = MappedView::map(&file, len).map_err(|e| {
            if access.is_none() && e.kind() == std::io::ErrorKind::PermissionDenied {
                Error::not_readable_or_writable(false, false)
            } else {
                Error::io(format!("map {display}"), e)
            }
        })?;
        if options.hints.sequential_scan {
            if let Err(e) = view.advise_sequential() {
                log::trace!("{display}: sequential advice failed: {e}");
            }
        }
        log::debug!("{display}: mapped {len} bytes");

        Ok(MappedFileBlock {
            state: MappedState::Live { view, file },
            path,
            flush_mode: options.flush_mode,
            leave_open: options.leave_open,
        })
    }

    /// Path the block was opened from; `None` for [`from_file`](Self::from_file).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn flush_mode(&self) -> FlushMode {
        self.flush_mode
    }

    /// The file handle: the mapped file while live, and after disposal the
    /// handle kept open by [`MapOptions::leave_open`] (until taken).
    pub fn file(&self) -> Option<&File> {
        match &self.state {
            MappedState::Live { file, .. } => Some(file),
            MappedState::Disposed { file } => file.as_ref(),
        }
    }

    /// Takes the file handle left open by disposal.
    ///
    /// Returns `None` while the block is live, when the handle was closed at
    /// disposal, or when it has already been taken.
    pub fn take_file(&mut self) -> Option<File> {
        match &mut self.state {
            MappedState::Live { .. } => None,
            MappedState::Disposed { file } => file.take(),
        }
    }

    fn flush_impl(view: &MappedView, file: &File, mode: FlushMode) -> std::io::Result<()> {
        view.flush()?;
        if mode == FlushMode::ViewAndFile {
            file.sync_all()?;
        }
        Ok(())
    }

    fn display_path(&self) -> String {
        display_path(self.path.as_deref())
    }
}

fn display_path(path: Option<&Path>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "<file handle>".to_string(),
    }
}

impl ByteBlock for MappedFileBlock {
    #[inline]
    fn len(&self) -> usize {
        match &self.state {
            MappedState::Live { view, .. } => view.len(),
            MappedState::Disposed { .. } => 0,
        }
    }

    fn is_disposed(&self) -> bool {
        matches!(self.state, MappedState::Disposed { .. })
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        match &self.state {
            MappedState::Live { view, .. } => view.as_bytes(),
            MappedState::Disposed { .. } => &[],
        }
    }

    #[inline]
    fn as_region(&mut self) -> &mut [u8] {
        match &mut self.state {
            MappedState::Live { view, .. } => view.as_bytes_mut(),
            MappedState::Disposed { .. } => &mut [],
        }
    }

    /// Writes dirty pages back to the file and, with
    /// [`FlushMode::ViewAndFile`], forces the file to stable storage.
    fn flush(&mut self) -> Result<()> {
        match &self.state {
            MappedState::Live { view, file } => Self::flush_impl(view, file, self.flush_mode)
                .map_err(|e| Error::io(format!("flush {}", self.display_path()), e)),
            MappedState::Disposed { .. } => Ok(()),
        }
    }

    fn dispose(&mut self) {
        // a handle kept by `leave_open` must survive repeated disposal
        if !matches!(self.state, MappedState::Live { .. }) {
            return;
        }
        let MappedState::Live { mut view, file } =
            std::mem::replace(&mut self.state, MappedState::Disposed { file: None })
        else {
            return;
        };
        let display = self.display_path();

        if let Err(e) = Self::flush_impl(&view, &file, self.flush_mode) {
            log::warn!("{display}: flush on dispose failed: {e}");
        }
        if let Err(e) = view.release() {
            log::warn!("{display}: releasing the mapped view failed: {e}");
        }
        drop(view);

        if self.leave_open {
            self.state = MappedState::Disposed { file: Some(file) };
        } else {
            drop(file);
        }
        log::debug!("{display}: disposed");
    }
}

impl Drop for MappedFileBlock {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl AsRef<[u8]> for MappedFileBlock {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsMut<[u8]> for MappedFileBlock {
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_region()
    }
}

impl std::fmt::Debug for MappedFileBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedFileBlock")
            .field("path", &self.path)
            .field("len", &self.len())
            .field("flush_mode", &self.flush_mode)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
