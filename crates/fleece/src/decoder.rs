//! `FleeceDecoder` — random-access decoder for Fleece buffers.
//!
//! Fleece values are written bottom-up, so containers refer to their
//! out-of-line children with pointers that always point backward. The root
//! value (or a pointer to it) occupies the last two bytes of the buffer.
//!
//! Pointers come in two widths. A 2-byte (narrow) pointer is used in narrow
//! collection slots and for the root; anything reached by following a pointer
//! is read as wide, which lets the root reach a 4-byte pointer placed just
//! before it when the root value is too far away for 15 bits.

use fleece_buffers::Reader;
use tracing::{debug, trace};

use crate::error::{DecodeError, KeyError, Unsupported};
use crate::tag::{Singleton, Tag, VARINT_COUNT, VARINT_LEN};
use crate::Value;

/// Default bound on container and pointer nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Default bound on the number of values produced by one decode pass.
pub const DEFAULT_MAX_NODES: usize = 1 << 20;

/// Knobs controlling a decode pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum number of nested containers and pointers followed from the
    /// starting value before decoding fails.
    pub max_depth: usize,
    /// Maximum number of values (including dictionary keys) a single decode
    /// may produce. Slots can share children through pointers, so the output
    /// tree is not bounded by the buffer length.
    pub max_nodes: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

/// Decoder over one immutable buffer and an optional shared-key table.
///
/// The decoder holds no mutable state, so a single instance may be shared
/// across threads and used for any number of decode calls.
#[derive(Debug, Clone, Copy)]
pub struct FleeceDecoder<'a> {
    data: &'a [u8],
    shared_keys: Option<&'a [String]>,
    options: DecodeOptions,
}

impl<'a> FleeceDecoder<'a> {
    /// Creates a decoder over `data` with default options.
    pub fn new(data: &'a [u8], shared_keys: Option<&'a [String]>) -> Self {
        Self {
            data,
            shared_keys,
            options: DecodeOptions::default(),
        }
    }

    /// Replaces the decode limits.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Offset of the root value: the second-to-last byte pair.
    pub fn root_offset(&self) -> isize {
        self.data.len() as isize - 2
    }

    /// Decodes the root value.
    pub fn decode(&self) -> Result<Value, DecodeError> {
        self.decode_at(None, false)
    }

    /// Decodes the value whose tag sits at `offset` (the root when `None`).
    ///
    /// `wide` selects 4-byte pointers for a pointer found at `offset`.
    pub fn decode_at(&self, offset: Option<isize>, wide: bool) -> Result<Value, DecodeError> {
        let offset = offset.unwrap_or_else(|| self.root_offset());
        trace!(len = self.data.len(), offset, wide, "decoding fleece value");
        let mut nodes = 0;
        self.read_value(offset, wide, 0, &mut nodes)
    }

    fn read_value(
        &self,
        offset: isize,
        wide: bool,
        depth: usize,
        nodes: &mut usize,
    ) -> Result<Value, DecodeError> {
        if depth > self.options.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                offset,
                limit: self.options.max_depth,
            });
        }
        let mut r = Reader::at(self.data, offset)?;
        let pos = r.x;
        let byte = r.u8()?;
        let tag = Tag::classify(byte);
        if tag != Tag::Pointer {
            *nodes += 1;
            if *nodes > self.options.max_nodes {
                debug!(offset = pos, limit = self.options.max_nodes, "node budget exhausted");
                return Err(DecodeError::NodeLimitExceeded {
                    offset: pos,
                    limit: self.options.max_nodes,
                });
            }
        }
        match tag {
            Tag::ShortInt => {
                let lo = r.u8()?;
                Ok(Value::Int(short_int(byte, lo)))
            }
            Tag::Int { unsigned, size } => read_int(&mut r, pos, unsigned, size).map(Value::Int),
            Tag::Float { double } => {
                r.skip(1)?;
                let f = if double {
                    r.f64_le()?
                } else {
                    r.f32_le()? as f64
                };
                Ok(Value::Float(f))
            }
            Tag::Special(s) => Ok(match s {
                Singleton::Null | Singleton::Undefined => Value::Null,
                Singleton::False => Value::Bool(false),
                Singleton::True => Value::Bool(true),
            }),
            Tag::String { inline_len } => read_string(&mut r, pos, inline_len).map(Value::Str),
            Tag::Binary => Err(unsupported(pos, Unsupported::BinaryData)),
            // Collection slots take their width from the collection header.
            Tag::Array { wide: slots_wide } => {
                self.read_array(&mut r, pos, byte, slots_wide, depth, nodes)
            }
            Tag::Dict { wide: slots_wide } => {
                self.read_dict(&mut r, pos, byte, slots_wide, depth, nodes)
            }
            Tag::Pointer => {
                let target = self.pointer_target(pos, wide)?;
                self.read_value(target, true, depth + 1, nodes)
            }
        }
    }

    /// Reads the collection count and returns `(count, slot_width)`, after
    /// checking that every slot lies inside the buffer.
    fn collection_header(
        &self,
        r: &mut Reader<'a>,
        pos: usize,
        byte: u8,
        wide: bool,
        slots_per_item: usize,
    ) -> Result<(usize, usize), DecodeError> {
        let count = (((byte & 0x07) as usize) << 8) | r.u8()? as usize;
        if count == VARINT_COUNT {
            return Err(unsupported(pos, Unsupported::VarintCount));
        }
        let width = if wide { 4 } else { 2 };
        r.skip(count * slots_per_item * width)?;
        Ok((count, width))
    }

    fn read_array(
        &self,
        r: &mut Reader<'a>,
        pos: usize,
        byte: u8,
        wide: bool,
        depth: usize,
        nodes: &mut usize,
    ) -> Result<Value, DecodeError> {
        let (count, width) = self.collection_header(r, pos, byte, wide, 1)?;
        let base = pos + 2;
        let mut arr = Vec::with_capacity(count);
        for i in 0..count {
            let slot = (base + i * width) as isize;
            arr.push(self.read_value(slot, wide, depth + 1, nodes)?);
        }
        Ok(Value::Array(arr))
    }

    fn read_dict(
        &self,
        r: &mut Reader<'a>,
        pos: usize,
        byte: u8,
        wide: bool,
        depth: usize,
        nodes: &mut usize,
    ) -> Result<Value, DecodeError> {
        let (count, width) = self.collection_header(r, pos, byte, wide, 2)?;
        let base = pos + 2;
        let mut obj = Vec::with_capacity(count);
        for i in 0..count {
            let key_slot = base + i * 2 * width;
            let key = self.read_value(key_slot as isize, wide, depth + 1, nodes)?;
            let key = self.resolve_key(key, key_slot)?;
            let val = self.read_value((key_slot + width) as isize, wide, depth + 1, nodes)?;
            obj.push((key, val));
        }
        Ok(Value::Dict(obj))
    }

    /// Turns a decoded key slot into a key string. Integer keys index the
    /// shared-key table; string keys are used as they are.
    fn resolve_key(&self, key: Value, offset: usize) -> Result<String, DecodeError> {
        let index = match key {
            Value::Str(s) => return Ok(s),
            Value::Int(index) => index,
            other => return Err(key_error(offset, KeyError::NotAKey(other.type_name()))),
        };
        let keys = self
            .shared_keys
            .ok_or_else(|| key_error(offset, KeyError::NoSharedKeys(index)))?;
        usize::try_from(index)
            .ok()
            .and_then(|i| keys.get(i))
            .cloned()
            .ok_or_else(|| {
                key_error(
                    offset,
                    KeyError::IndexOutOfRange {
                        index,
                        len: keys.len(),
                    },
                )
            })
    }

    /// Resolves the pointer at `pos` to the absolute offset of its target.
    fn pointer_target(&self, pos: usize, wide: bool) -> Result<isize, DecodeError> {
        let mut r = Reader::at(self.data, pos as isize)?;
        let magnitude = if wide {
            r.u32_be()? & 0x7fff_ffff
        } else {
            (r.u16_be()? & 0x7fff) as u32
        };
        if magnitude == 0 {
            return Err(DecodeError::MalformedPointer { offset: pos });
        }
        let target = pos as isize - 2 * magnitude as isize;
        if target < 0 {
            return Err(DecodeError::OutOfBounds {
                offset: target,
                len: self.data.len(),
            });
        }
        Ok(target)
    }
}

/// Sign-extends the 12-bit integer split across a tag byte and the next byte.
fn short_int(tag: u8, lo: u8) -> i64 {
    let raw = (((tag & 0x0f) as i64) << 8) | lo as i64;
    if tag & 0x08 != 0 {
        raw - 0x1000
    } else {
        raw
    }
}

fn read_int(
    r: &mut Reader<'_>,
    pos: usize,
    unsigned: bool,
    size: usize,
) -> Result<i64, DecodeError> {
    let raw = r.uint_le(size)?;
    let top_bit = 1u64 << (size * 8 - 1);
    if unsigned {
        i64::try_from(raw).map_err(|_| unsupported(pos, Unsupported::UnsignedOverflow))
    } else if raw & top_bit != 0 {
        Err(unsupported(pos, Unsupported::NegativeInt))
    } else {
        Ok(raw as i64)
    }
}

fn read_string(r: &mut Reader<'_>, pos: usize, inline_len: u8) -> Result<String, DecodeError> {
    let len = if inline_len == VARINT_LEN {
        usize::try_from(r.vuint()?).unwrap_or(usize::MAX)
    } else {
        inline_len as usize
    };
    let bytes = r.buf(len)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| DecodeError::InvalidUtf8 { offset: pos })
}

fn unsupported(offset: usize, kind: Unsupported) -> DecodeError {
    debug!(offset, %kind, "rejecting unsupported fleece encoding");
    DecodeError::UnsupportedEncoding { offset, kind }
}

fn key_error(offset: usize, reason: KeyError) -> DecodeError {
    debug!(offset, %reason, "unresolvable dictionary key");
    DecodeError::KeyResolution { offset, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_int_sign_extension() {
        assert_eq!(short_int(0x00, 0x00), 0);
        assert_eq!(short_int(0x07, 0xff), 2047);
        assert_eq!(short_int(0x08, 0x00), -2048);
        assert_eq!(short_int(0x0f, 0xff), -1);
    }

    #[test]
    fn root_offset_of_tiny_buffers() {
        assert_eq!(FleeceDecoder::new(&[], None).root_offset(), -2);
        assert_eq!(
            FleeceDecoder::new(&[0x30], None).decode(),
            Err(DecodeError::OutOfBounds { offset: -1, len: 1 })
        );
    }

    #[test]
    fn decoder_is_reusable() {
        let data = [0x00, 0x05, 0x38, 0x00];
        let decoder = FleeceDecoder::new(&data, None);
        assert_eq!(decoder.decode_at(Some(0), false), Ok(Value::Int(5)));
        assert_eq!(decoder.decode(), Ok(Value::Bool(true)));
        assert_eq!(decoder.decode_at(Some(0), true), Ok(Value::Int(5)));
    }

    #[test]
    fn node_budget_resets_per_call() {
        // [5, 5] through two pointers to the same int.
        let data = [0x00, 0x05, 0x60, 0x02, 0x80, 0x02, 0x80, 0x03, 0x80, 0x03];
        let decoder = FleeceDecoder::new(&data, None).with_options(DecodeOptions {
            max_nodes: 3,
            ..DecodeOptions::default()
        });
        for _ in 0..3 {
            assert_eq!(
                decoder.decode(),
                Ok(Value::Array(vec![Value::Int(5), Value::Int(5)]))
            );
        }
        let tight = decoder.with_options(DecodeOptions {
            max_nodes: 2,
            ..DecodeOptions::default()
        });
        assert_eq!(
            tight.decode(),
            Err(DecodeError::NodeLimitExceeded {
                offset: 0,
                limit: 2
            })
        );
    }
}
