//! Byte block backed by a raw allocation from the process heap.

use std::{
    alloc::{Layout, alloc, alloc_zeroed, dealloc},
    ptr::NonNull,
};

use byteblock_common::{Error, Result, verify_arg};
use byteblock_pressure::{MemoryPressure, PressureGuard};

use crate::block::{ByteBlock, MAX_REGION_LEN};

/// Alignment of heap block allocations.
pub const HEAP_BLOCK_ALIGNMENT: usize = 64;

enum HeapState {
    Live {
        ptr: NonNull<u8>,
        len: usize,
        _pressure: PressureGuard,
    },
    Disposed,
}

/// A fixed-size, 64-byte aligned allocation from the process heap.
///
/// The allocation is reported to a [`MemoryPressure`] tracker for as long as
/// it is alive. It is freed exactly once: by the first [`dispose`] call, or by
/// `Drop` if the block was never disposed explicitly.
///
/// [`dispose`]: ByteBlock::dispose
pub struct HeapBlock {
    state: HeapState,
}

impl HeapBlock {
    /// Allocates a `size`-byte block, reported to [`MemoryPressure::global`].
    ///
    /// The region always starts out zeroed. With `zero_initialize` every byte
    /// is explicitly written at creation, committing all pages up front;
    /// without it the zeroes come from the allocator, which may defer
    /// committing fresh pages until first touch.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `size` is zero or exceeds [`MAX_REGION_LEN`];
    /// an `Io` error of kind `OutOfMemory` if the allocation fails.
    pub fn create(size: usize, zero_initialize: bool) -> Result<HeapBlock> {
        Self::create_tracked(size, zero_initialize, MemoryPressure::global())
    }

    /// Same as [`create`](Self::create), reporting to the given tracker.
    pub fn create_tracked(
        size: usize,
        zero_initialize: bool,
        pressure: &MemoryPressure,
    ) -> Result<HeapBlock> {
        verify_arg!(size, size > 0);
        verify_arg!(size, size <= MAX_REGION_LEN);

        let layout = Self::layout(size)?;
        let ptr = unsafe {
            if zero_initialize {
                alloc(layout)
            } else {
                alloc_zeroed(layout)
            }
        };
        let Some(ptr) = NonNull::new(ptr) else {
            return Err(Error::io(
                format!("heap allocation of {size} bytes"),
                std::io::Error::new(std::io::ErrorKind::OutOfMemory, "Failed to allocate memory"),
            ));
        };
        if zero_initialize {
            unsafe { std::ptr::write_bytes(ptr.as_ptr(), 0, size) };
        }
        log::trace!("heap block allocated: {size} bytes at {ptr:p}");

        Ok(HeapBlock {
            state: HeapState::Live {
                ptr,
                len: size,
                _pressure: pressure.register(size as u64),
            },
        })
    }

    fn layout(size: usize) -> Result<Layout> {
        Layout::from_size_align(size, HEAP_BLOCK_ALIGNMENT)
            .map_err(|e| Error::invalid_arg("size", e.to_string()))
    }

    /// Returns the base address of the allocation, or `None` once disposed.
    pub fn as_ptr(&self) -> Option<NonNull<u8>> {
        match &self.state {
            HeapState::Live { ptr, .. } => Some(*ptr),
            HeapState::Disposed => None,
        }
    }
}

impl ByteBlock for HeapBlock {
    #[inline]
    fn len(&self) -> usize {
        match &self.state {
            HeapState::Live { len, .. } => *len,
            HeapState::Disposed => 0,
        }
    }

    fn is_disposed(&self) -> bool {
        matches!(self.state, HeapState::Disposed)
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        match &self.state {
            HeapState::Live { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts(ptr.as_ptr(), *len)
            },
            HeapState::Disposed => &[],
        }
    }

    #[inline]
    fn as_region(&mut self) -> &mut [u8] {
        match &mut self.state {
            HeapState::Live { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts_mut(ptr.as_ptr(), *len)
            },
            HeapState::Disposed => &mut [],
        }
    }

    fn dispose(&mut self) {
        let HeapState::Live { ptr, len, _pressure } =
            std::mem::replace(&mut self.state, HeapState::Disposed)
        else {
            return;
        };
        // The layout was validated at creation.
        if let Ok(layout) = Self::layout(len) {
            unsafe { dealloc(ptr.as_ptr(), layout) };
        }
        log::trace!("heap block freed: {len} bytes at {ptr:p}");
    }
}

impl Drop for HeapBlock {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl AsRef<[u8]> for HeapBlock {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsMut<[u8]> for HeapBlock {
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_region()
    }
}

// SAFETY: HeapBlock exclusively owns its allocation.
unsafe impl Send for HeapBlock {}

// SAFETY: shared references only expose the allocation as `&[u8]`.
unsafe impl Sync for HeapBlock {}

impl std::fmt::Debug for HeapBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapBlock")
            .field("ptr", &self.as_ptr())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use byteblock_common::ErrorKind;
    use byteblock_pressure::MemoryPressure;

    use super::{HEAP_BLOCK_ALIGNMENT, HeapBlock};
    use crate::block::{ByteBlock, MAX_REGION_LEN};

    #[test]
    fn test_create_zeroed() {
        for zero_initialize in [true, false] {
            let block = HeapBlock::create(4096, zero_initialize).unwrap();
            assert_eq!(block.len(), 4096);
            assert!(block.as_bytes().iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_alignment() {
        let block = HeapBlock::create(3, true).unwrap();
        let ptr = block.as_ptr().unwrap();
        assert!((ptr.as_ptr() as usize).is_multiple_of(HEAP_BLOCK_ALIGNMENT));
    }

    #[test]
    fn test_invalid_sizes() {
        for size in [0, MAX_REGION_LEN + 1] {
            let err = HeapBlock::create(size, true).unwrap_err();
            assert!(
                matches!(err.kind(), ErrorKind::InvalidArgument { name, .. } if name == "size")
            );
        }
    }

    #[test]
    fn test_region_is_stable() {
        let mut block = HeapBlock::create(128, true).unwrap();
        let first = block.as_region().as_mut_ptr();
        let second = block.as_region().as_mut_ptr();
        assert_eq!(first, second);
        assert_eq!(block.as_bytes().as_ptr(), first as *const u8);
    }

    #[test]
    fn test_pressure_tracking() {
        let pressure = MemoryPressure::new();
        let mut a = HeapBlock::create_tracked(1000, true, &pressure).unwrap();
        let b = HeapBlock::create_tracked(24, false, &pressure).unwrap();
        assert_eq!(pressure.current(), 1024);

        a.dispose();
        assert_eq!(pressure.current(), 24);
        a.dispose();
        assert_eq!(pressure.current(), 24);

        drop(b);
        assert_eq!(pressure.current(), 0);
    }

    #[test]
    fn test_dispose_twice() {
        let mut block = HeapBlock::create(64, true).unwrap();
        block.as_region().fill(7);
        block.dispose();
        assert!(block.is_disposed());
        assert_eq!(block.len(), 0);
        assert!(block.as_ptr().is_none());
        assert!(block.as_region().is_empty());
        block.dispose();
        assert_eq!(block.len(), 0);
    }
}
