//! Owned read-write view of a file mapping.
//!
//! [`MappedView`] ties together the platform mapping object and the base
//! address of the view mapped from it. The base address is acquired exactly
//! once, in [`MappedView::map`], and released exactly once, by whichever of
//! [`MappedView::release`] or `Drop` runs first. Both paths go through the same
//! state transition, so a second release can never reach the platform.
//!
//! # Safety
//!
//! The file the view was mapped from must remain at least [`MappedView::len`]
//! bytes long while the view is live. Shrinking the file underneath a live
//! view makes accesses past the new end fault.

use std::{fs::File, ptr::NonNull};

use crate::mmap;

enum ViewState {
    Live {
        mapping: mmap::MappingHandle,
        ptr: NonNull<u8>,
        len: usize,
    },
    Released,
}

/// A live (or released) read-write view of the first `len` bytes of a file.
pub struct MappedView {
    state: ViewState,
}

impl MappedView {
    /// Returns the size of a memory page on the current system. View base
    /// addresses are aligned to it.
    pub fn page_size() -> usize {
        mmap::get_page_size()
    }

    /// Maps the first `len` bytes of `file` for shared read-write access.
    ///
    /// The file must be open for both reading and writing, and must be at least
    /// `len` bytes long.
    ///
    /// # Errors
    ///
    /// Returns an error if `len` is zero, or if the platform refuses to create
    /// the mapping object or the view. Nothing stays acquired on failure.
    pub fn map(file: &File, len: usize) -> std::io::Result<MappedView> {
        let mapping = mmap::create_mapping(file, len)?;
        let ptr = match unsafe { mmap::map_view(&mapping, len) } {
            Ok(ptr) => ptr,
            Err(e) => {
                let _ = unsafe { mmap::close_mapping(mapping) };
                return Err(e);
            }
        };
        // map_view never returns null on success
        let ptr = unsafe { NonNull::new_unchecked(ptr as *mut u8) };
        Ok(MappedView {
            state: ViewState::Live { mapping, ptr, len },
        })
    }

    /// Returns the length of the view in bytes, or `0` once released.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.state {
            ViewState::Live { len, .. } => *len,
            ViewState::Released => 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        matches!(self.state, ViewState::Released)
    }

    /// Returns the base address of the view, or `None` once released.
    ///
    /// This is the address acquired when the view was mapped; it is never
    /// re-acquired.
    #[inline]
    pub fn ptr(&self) -> Option<NonNull<u8>> {
        match &self.state {
            ViewState::Live { ptr, .. } => Some(*ptr),
            ViewState::Released => None,
        }
    }

    /// Returns the view contents, or an empty slice once released.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.state {
            ViewState::Live { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts(ptr.as_ptr(), *len)
            },
            ViewState::Released => &[],
        }
    }

    /// Returns the view contents mutably, or an empty slice once released.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.state {
            ViewState::Live { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts_mut(ptr.as_ptr(), *len)
            },
            ViewState::Released => &mut [],
        }
    }

    /// Writes dirty pages of the view back to the file. No-op once released.
    pub fn flush(&self) -> std::io::Result<()> {
        match &self.state {
            ViewState::Live { mapping, ptr, len } => unsafe {
                mmap::flush_view(mapping, ptr.as_ptr() as _, *len)
            },
            ViewState::Released => Ok(()),
        }
    }

    /// Hints that the view will be read front to back. No-op once released.
    pub fn advise_sequential(&self) -> std::io::Result<()> {
        match &self.state {
            ViewState::Live { ptr, len, .. } => unsafe {
                mmap::advise_sequential(ptr.as_ptr() as _, *len)
            },
            ViewState::Released => Ok(()),
        }
    }

    /// Unmaps the view, then closes the mapping object.
    ///
    /// Only the first call does any work; later calls (and the eventual drop)
    /// return `Ok(())` without touching the platform. If unmapping fails the
    /// view is still considered released, and the mapping object is still
    /// closed.
    pub fn release(&mut self) -> std::io::Result<()> {
        let ViewState::Live { mapping, ptr, len } =
            std::mem::replace(&mut self.state, ViewState::Released)
        else {
            return Ok(());
        };
        let unmapped = unsafe { mmap::unmap_view(&mapping, ptr.as_ptr() as _, len) };
        let closed = unsafe { mmap::close_mapping(mapping) };
        unmapped.and(closed)
    }
}

impl Drop for MappedView {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

// SAFETY: MappedView exclusively owns its view and mapping object; moving it
// to another thread moves that ownership.
unsafe impl Send for MappedView {}

// SAFETY: shared references only expose the view as `&[u8]`.
unsafe impl Sync for MappedView {}

impl std::fmt::Debug for MappedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedView")
            .field("ptr", &self.ptr())
            .field("len", &self.len())
            .finish()
    }
}
