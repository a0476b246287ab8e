//! Uniform byte blocks over three backing stores:
//! - [`HeapBlock`]: a raw allocation from the process heap.
//! - [`ArrayBlock`]: an owned `Vec<u8>`.
//! - [`MappedFileBlock`]: a memory-mapped view of a file.
//!
//! All three implement [`ByteBlock`]: a fixed-length flat region that can be
//! read and written in place, optionally persisted with `flush()`, and released
//! with an idempotent `dispose()` (also run on drop).

pub mod array;
pub mod block;
pub mod fs;
pub mod heap;
pub mod mapped;
pub mod options;

pub use array::ArrayBlock;
pub use block::{ByteBlock, DEFAULT_FILE_LEN, MAX_ARRAY_LEN, MAX_REGION_LEN, RegionStream};
pub use byteblock_common::{Error, ErrorKind, Result};
pub use byteblock_pressure::MemoryPressure;
pub use heap::HeapBlock;
pub use mapped::MappedFileBlock;
pub use options::{AccessHints, FlushMode, MapOptions};
