//! Fleece decoder error types.

use fleece_buffers::BufferError;
use thiserror::Error;

/// Error type for Fleece decoding operations.
///
/// Every variant carries the buffer offset at which decoding failed. Errors
/// are permanent: the same input always produces the same error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("read at offset {offset} falls outside buffer of length {len}")]
    OutOfBounds { offset: isize, len: usize },
    #[error("unsupported encoding at offset {offset}: {kind}")]
    UnsupportedEncoding { offset: usize, kind: Unsupported },
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("cannot resolve dictionary key at offset {offset}: {reason}")]
    KeyResolution { offset: usize, reason: KeyError },
    #[error("pointer at offset {offset} does not point backward")]
    MalformedPointer { offset: usize },
    #[error("value at offset {offset} is nested deeper than {limit} levels")]
    DepthLimitExceeded { offset: isize, limit: usize },
    #[error("value at offset {offset} exceeds the budget of {limit} decoded values")]
    NodeLimitExceeded { offset: usize, limit: usize },
}

impl DecodeError {
    /// Offset at which the error was detected.
    pub fn offset(&self) -> isize {
        match self {
            DecodeError::OutOfBounds { offset, .. }
            | DecodeError::DepthLimitExceeded { offset, .. } => *offset,
            DecodeError::UnsupportedEncoding { offset, .. }
            | DecodeError::InvalidUtf8 { offset }
            | DecodeError::KeyResolution { offset, .. }
            | DecodeError::MalformedPointer { offset }
            | DecodeError::NodeLimitExceeded { offset, .. } => *offset as isize,
        }
    }
}

/// Encodings that are recognized but deliberately not decoded.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    #[error("binary data")]
    BinaryData,
    #[error("collection with varint-encoded count")]
    VarintCount,
    #[error("signed extended integer with sign bit set")]
    NegativeInt,
    #[error("unsigned integer exceeds i64 range")]
    UnsignedOverflow,
    #[error("varint length does not fit in 64 bits")]
    VarintOverflow,
}

/// Reasons a dictionary key could not be turned into a string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("shared key index {0} used but no shared key table was supplied")]
    NoSharedKeys(i64),
    #[error("shared key index {index} is outside table of {len} keys")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("key slot holds a {0}, not a string or shared key index")]
    NotAKey(&'static str),
    #[error("shared key table is malformed: {0}")]
    MalformedTable(&'static str),
}

impl From<BufferError> for DecodeError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::OutOfBounds { offset, len } => DecodeError::OutOfBounds { offset, len },
            BufferError::Overrun { offset, len, .. } => DecodeError::OutOfBounds {
                offset: offset as isize,
                len,
            },
            BufferError::VarintOverflow { offset } => DecodeError::UnsupportedEncoding {
                offset,
                kind: Unsupported::VarintOverflow,
            },
        }
    }
}
