//! Random-access binary reader with cursor tracking.

use crate::BufferError;

/// A bounds-checked reader over an immutable byte slice.
///
/// The cursor is an absolute offset from the start of the slice. Readers are
/// cheap to copy, so decoders typically create one per value with
/// [`Reader::at`] rather than sharing a single mutable cursor.
///
/// # Example
///
/// ```
/// use fleece_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::at(&data, 1).unwrap();
///
/// assert_eq!(reader.u8().unwrap(), 0x02);
/// assert_eq!(reader.u16_be().unwrap(), 0x0304);
/// assert!(reader.u8().is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader positioned at the start of `uint8`.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Creates a reader positioned at `offset`, which must lie in `[0, len)`.
    pub fn at(uint8: &'a [u8], offset: isize) -> Result<Self, BufferError> {
        let mut reader = Self::new(uint8);
        reader.seek(offset)?;
        Ok(reader)
    }

    /// Length of the underlying slice.
    pub fn len(&self) -> usize {
        self.uint8.len()
    }

    /// Returns `true` if the underlying slice is empty.
    pub fn is_empty(&self) -> bool {
        self.uint8.is_empty()
    }

    /// Returns the number of bytes between the cursor and the end.
    pub fn size(&self) -> usize {
        self.uint8.len().saturating_sub(self.x)
    }

    /// Moves the cursor to an absolute offset, rejecting anything outside
    /// `[0, len)`.
    pub fn seek(&mut self, offset: isize) -> Result<(), BufferError> {
        if offset < 0 || offset as usize >= self.uint8.len() {
            return Err(BufferError::OutOfBounds {
                offset,
                len: self.uint8.len(),
            });
        }
        self.x = offset as usize;
        Ok(())
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        match self.x.checked_add(n) {
            Some(end) if end <= self.uint8.len() => Ok(()),
            _ => Err(BufferError::Overrun {
                offset: self.x,
                size: n,
                len: self.uint8.len(),
            }),
        }
    }

    /// Advances the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), BufferError> {
        self.check(n)?;
        self.x += n;
        Ok(())
    }

    /// Returns a subslice of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let start = self.x;
        self.x += size;
        Ok(&self.uint8[start..self.x])
    }

    #[inline]
    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.buf(N)?);
        Ok(out)
    }

    /// Reads one byte.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16_be(&mut self) -> Result<u16, BufferError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    /// Reads an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32_be(&mut self) -> Result<u32, BufferError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    /// Reads a 32-bit floating point number (little-endian).
    #[inline]
    pub fn f32_le(&mut self) -> Result<f32, BufferError> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    /// Reads a 64-bit floating point number (little-endian).
    #[inline]
    pub fn f64_le(&mut self) -> Result<f64, BufferError> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    /// Reads an unsigned little-endian integer of `size` bytes (1 to 8).
    pub fn uint_le(&mut self, size: usize) -> Result<u64, BufferError> {
        debug_assert!((1..=8).contains(&size));
        let bytes = self.buf(size.min(8))?;
        let mut out = [0u8; 8];
        out[..bytes.len()].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(out))
    }

    /// Reads a little-endian base-128 varint: seven payload bits per byte,
    /// high bit set on every byte except the last.
    pub fn vuint(&mut self) -> Result<u64, BufferError> {
        let start = self.x;
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.u8()?;
            let bits = (byte & 0x7f) as u64;
            if shift == 63 && bits > 1 {
                return Err(BufferError::VarintOverflow { offset: start });
            }
            value |= bits << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                return Err(BufferError::VarintOverflow { offset: start });
            }
        }
    }
}
