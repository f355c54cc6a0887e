//! Classification of Fleece tag bytes.
//!
//! The top nibble of the first byte of every value selects its kind; the low
//! nibble carries kind-specific flags or a short length.

/// Selector carried by a `0011ss--` singleton tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Singleton {
    Null,
    False,
    True,
    /// Decoded as null.
    Undefined,
}

/// Decoded form of a tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// `0000iiii`: 12-bit signed integer spread over two bytes.
    ShortInt,
    /// `0001uccc`: `size` little-endian bytes follow the tag.
    Int { unsigned: bool, size: usize },
    /// `0010s---`: f32 or f64 starting two bytes after the tag.
    Float { double: bool },
    /// `0011ss--`
    Special(Singleton),
    /// `0100cccc`: the low nibble is the length, or 15 for a varint length.
    String { inline_len: u8 },
    /// `0101cccc`
    Binary,
    /// `0110wccc`: 11-bit count; `wide` selects 4-byte slots.
    Array { wide: bool },
    /// `0111wccc`: same header as arrays, two slots per entry.
    Dict { wide: bool },
    /// `1ooooooo`: backward offset in units of two bytes.
    Pointer,
}

/// String length nibble meaning "a varint length follows".
pub const VARINT_LEN: u8 = 0x0f;

/// Collection count meaning "a varint count follows".
pub const VARINT_COUNT: usize = 0x7ff;

impl Tag {
    /// Classifies a tag byte by its top nibble.
    pub fn classify(byte: u8) -> Tag {
        match byte >> 4 {
            0x0 => Tag::ShortInt,
            0x1 => Tag::Int {
                unsigned: byte & 0x08 != 0,
                size: (byte & 0x07) as usize + 1,
            },
            0x2 => Tag::Float {
                double: byte & 0x08 != 0,
            },
            0x3 => Tag::Special(match (byte >> 2) & 0x03 {
                0 => Singleton::Null,
                1 => Singleton::False,
                2 => Singleton::True,
                _ => Singleton::Undefined,
            }),
            0x4 => Tag::String {
                inline_len: byte & 0x0f,
            },
            0x5 => Tag::Binary,
            0x6 => Tag::Array {
                wide: byte & 0x08 != 0,
            },
            0x7 => Tag::Dict {
                wide: byte & 0x08 != 0,
            },
            _ => Tag::Pointer,
        }
    }
}
