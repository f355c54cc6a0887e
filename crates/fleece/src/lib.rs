//! Decoder for Fleece, the compact tagged-value binary format used by
//! embedded document stores to persist JSON-like documents.
//!
//! A Fleece buffer is self-describing: every value starts with a tag byte
//! whose top nibble selects the kind. Collections store their children in
//! fixed-width slots that either hold small values inline or point backward
//! to where the child was written earlier. Dictionary keys may be integers
//! that index a [`SharedKeys`] table kept alongside the documents.
//!
//! Decoding is one-directional and produces an owned [`Value`] tree:
//!
//! ```
//! use fleece::{decode, Value};
//!
//! // A narrow array [1, -1] followed by a root pointer to it.
//! let buf = [0x60, 0x02, 0x00, 0x01, 0x0f, 0xff, 0x80, 0x03];
//! assert_eq!(
//!     decode(&buf, None).unwrap(),
//!     Value::Array(vec![Value::Int(1), Value::Int(-1)])
//! );
//! ```

mod decoder;
mod error;
mod shared_keys;
mod tag;
mod value;

pub use decoder::{DecodeOptions, FleeceDecoder, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES};
pub use error::{DecodeError, KeyError, Unsupported};
pub use shared_keys::{SharedKeys, SHARED_KEYS_INFO_KEY};
pub use tag::{Singleton, Tag};
pub use value::Value;

/// Decodes the root value of `buffer`.
pub fn decode(buffer: &[u8], shared_keys: Option<&[String]>) -> Result<Value, DecodeError> {
    FleeceDecoder::new(buffer, shared_keys).decode()
}

/// Decodes the value whose tag is at `offset`, or the root when `offset` is
/// `None`. `wide` selects 4-byte pointers at that position.
pub fn decode_at(
    buffer: &[u8],
    shared_keys: Option<&[String]>,
    offset: Option<isize>,
    wide: bool,
) -> Result<Value, DecodeError> {
    FleeceDecoder::new(buffer, shared_keys).decode_at(offset, wide)
}

/// Decodes the root value of `buffer` under explicit limits.
pub fn decode_with_options(
    buffer: &[u8],
    shared_keys: Option<&[String]>,
    options: DecodeOptions,
) -> Result<Value, DecodeError> {
    FleeceDecoder::new(buffer, shared_keys)
        .with_options(options)
        .decode()
}

/// Decodes one stored document body using its store's shared keys.
pub fn decode_record(body: &[u8], shared_keys: &SharedKeys) -> Result<Value, DecodeError> {
    decode(body, Some(shared_keys.as_slice()))
}
