//! Byte block backed by an owned `Vec<u8>`.

use byteblock_common::{Result, verify_arg};

use crate::block::{ByteBlock, MAX_ARRAY_LEN};

/// A byte block over an owned, zero-initialized buffer.
///
/// The region is the buffer's own storage. Disposing the block drops the
/// buffer; there is no other resource to release.
#[derive(Debug)]
pub struct ArrayBlock {
    buf: Vec<u8>,
    disposed: bool,
}

impl ArrayBlock {
    /// Allocates a zeroed `size`-byte block.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `size` is zero or exceeds [`MAX_ARRAY_LEN`].
    pub fn create(size: usize) -> Result<ArrayBlock> {
        verify_arg!(size, size > 0);
        verify_arg!(size, size <= MAX_ARRAY_LEN);
        Ok(ArrayBlock {
            buf: vec![0u8; size],
            disposed: false,
        })
    }

    /// Allocates a block of the maximum supported length, [`MAX_ARRAY_LEN`].
    pub fn with_max_len() -> Result<ArrayBlock> {
        Self::create(MAX_ARRAY_LEN)
    }

    /// Adopts an existing buffer as the block's region, without copying.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the buffer is empty or longer than [`MAX_ARRAY_LEN`].
    pub fn from_vec(buf: Vec<u8>) -> Result<ArrayBlock> {
        verify_arg!(buf, !buf.is_empty());
        verify_arg!(buf, buf.len() <= MAX_ARRAY_LEN);
        Ok(ArrayBlock {
            buf,
            disposed: false,
        })
    }

    /// Consumes the block, returning its buffer (empty if it was disposed).
    pub fn into_vec(mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

impl ByteBlock for ArrayBlock {
    #[inline]
    fn len(&self) -> usize {
        self.buf.len()
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    fn as_region(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.buf = Vec::new();
        }
    }
}

impl AsRef<[u8]> for ArrayBlock {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl AsMut<[u8]> for ArrayBlock {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::ArrayBlock;
    use crate::block::{ByteBlock, MAX_ARRAY_LEN};

    #[test]
    fn test_create() {
        let block = ArrayBlock::create(100).unwrap();
        assert_eq!(block.len(), 100);
        assert!(block.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_size_bounds() {
        assert!(ArrayBlock::create(0).unwrap_err().is_invalid_arg());
        assert!(
            ArrayBlock::create(MAX_ARRAY_LEN + 1)
                .unwrap_err()
                .is_invalid_arg()
        );
    }

    #[test]
    fn test_max_len() {
        let mut block = ArrayBlock::with_max_len().unwrap();
        assert_eq!(block.len(), MAX_ARRAY_LEN);
        block.as_region()[MAX_ARRAY_LEN - 1] = 1;
        block.dispose();
        assert_eq!(block.len(), 0);
    }

    #[test]
    fn test_from_vec_into_vec() {
        let buf = b"abcdef".to_vec();
        let ptr = buf.as_ptr();
        let mut block = ArrayBlock::from_vec(buf).unwrap();
        assert_eq!(block.as_region().as_ptr(), ptr);
        block.as_region()[0] = b'x';
        assert_eq!(block.into_vec(), b"xbcdef");

        assert!(ArrayBlock::from_vec(Vec::new()).unwrap_err().is_invalid_arg());
    }

    #[test]
    fn test_stream() {
        use std::io::{Read, Seek, SeekFrom, Write};

        let mut block = ArrayBlock::create(8).unwrap();
        let mut stream = block.as_stream();
        stream.write_all(b"12345").unwrap();
        // writes never grow the region
        assert_eq!(stream.write(b"6789").unwrap(), 3);
        stream.seek(SeekFrom::Start(2)).unwrap();
        let mut buf = [0u8; 3];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"345");
        assert_eq!(block.as_bytes(), b"12345678");
    }

    #[test]
    fn test_dispose_twice() {
        let mut block = ArrayBlock::create(16).unwrap();
        block.dispose();
        block.dispose();
        assert!(block.is_disposed());
        assert_eq!(block.len(), 0);
        assert!(block.into_vec().is_empty());
    }
}
