use std::io::Cursor;

use byteblock_common::Result;

/// Largest region a heap or mapped file block exposes: the 32-bit signed
/// length boundary (`i32::MAX`).
pub const MAX_REGION_LEN: usize = i32::MAX as usize;

/// Largest buffer an [`ArrayBlock`](crate::ArrayBlock) accepts.
pub const MAX_ARRAY_LEN: usize = 0x7FFF_FFC7;

/// Default length of files created by [`MappedFileBlock`](crate::MappedFileBlock)
/// when the caller has no better size in mind.
pub const DEFAULT_FILE_LEN: usize = MAX_REGION_LEN;

/// A seekable read/write stream over a block's region.
///
/// The stream shares the block's memory; writes past the end of the region are
/// short (never grow the block).
pub type RegionStream<'a> = Cursor<&'a mut [u8]>;

/// A fixed-length block of bytes, addressable as one flat region.
///
/// A block is either live or disposed. While live, [`len`](Self::len) is fixed
/// and [`as_region`](Self::as_region) exposes exactly that many bytes, without
/// copying. [`dispose`](Self::dispose) releases the backing storage; it may be
/// called any number of times, and dropping a block disposes it as well.
/// After disposal the block reports a length of zero and exposes an empty
/// region.
///
/// Each implementation has its own constructors, since the required parameters
/// differ (a size for memory-backed blocks, a path and size for file-backed
/// ones).
pub trait ByteBlock: Send {
    /// Returns the length of the region in bytes, or `0` once disposed.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_disposed(&self) -> bool;

    /// Returns the region as an immutable byte slice.
    fn as_bytes(&self) -> &[u8];

    /// Returns the region as a mutable byte slice of [`len`](Self::len) bytes.
    ///
    /// Repeated calls return the same memory.
    fn as_region(&mut self) -> &mut [u8];

    /// Returns a seekable stream view over the region, positioned at its start.
    fn as_stream(&mut self) -> RegionStream<'_> {
        Cursor::new(self.as_region())
    }

    /// Persists the region to its secondary storage, if the block has any.
    ///
    /// Memory-only blocks have nothing to persist and return `Ok(())`.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Releases the block's storage. Idempotent, never fails.
    fn dispose(&mut self);
}
