//! Error taxonomy and argument checks shared by all byteblock-* crates.

pub mod error;
pub mod result;

pub use error::{Error, ErrorKind};
pub use result::Result;
