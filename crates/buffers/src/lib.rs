//! fleece-buffers - byte buffer primitives for the Fleece decoder.
//!
//! Every read is bounds-checked and reports a [`BufferError`] instead of
//! panicking, so callers can decode untrusted input safely.

mod reader;

pub use reader::Reader;

use thiserror::Error;

/// Error returned when a read cannot be satisfied by the underlying buffer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A cursor was positioned outside `[0, len)`.
    #[error("offset {offset} is outside buffer of length {len}")]
    OutOfBounds { offset: isize, len: usize },
    /// A read starting inside the buffer would run past its end.
    #[error("read of {size} bytes at offset {offset} overruns buffer of length {len}")]
    Overrun { offset: usize, size: usize, len: usize },
    /// A base-128 varint did not terminate within 64 bits.
    #[error("varint at offset {offset} does not fit in 64 bits")]
    VarintOverflow { offset: usize },
}
