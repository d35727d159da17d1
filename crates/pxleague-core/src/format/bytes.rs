//! Byte buffer utilities for parsing table files.
//!
//! `ByteBuffer` is a bounds-checked reader over a table file's bytes. Header
//! scalars are little-endian and sit at fixed offsets; field payloads are
//! big-endian and are sliced out raw for the field decoder.

use crate::error::{Error, Result};

/// A bounds-checked byte reader for parsing binary table files.
///
/// # Example
///
/// ```
/// use pxleague_core::format::ByteBuffer;
///
/// let data = [0x14, 0x00, 0x00, 0x08, 0x01];
/// let buf = ByteBuffer::new(&data);
///
/// assert_eq!(buf.read_u16_le_at(0).unwrap(), 20);
/// assert_eq!(buf.read_u16_le_at(2).unwrap(), 0x0800);
/// assert!(buf.read_u16_le_at(4).is_err());
/// ```
pub struct ByteBuffer<'a> {
    data: &'a [u8],
}

impl<'a> ByteBuffer<'a> {
    /// Creates a new `ByteBuffer` wrapping the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Returns the total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferOverrun`] if the range is out of bounds.
    pub fn slice_at(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let overrun = || Error::BufferOverrun {
            offset,
            len,
            buffer_len: self.data.len(),
        };
        let end = offset.checked_add(len).ok_or_else(overrun)?;
        if end > self.data.len() {
            return Err(overrun());
        }
        Ok(&self.data[offset..end])
    }

    /// Like [`slice_at`](Self::slice_at) but clamps the range to the buffer.
    pub fn slice_clamped(&self, offset: usize, len: usize) -> &'a [u8] {
        let start = offset.min(self.data.len());
        let end = offset.saturating_add(len).min(self.data.len());
        &self.data[start..end]
    }

    /// Reads the byte at `offset`.
    pub fn read_u8_at(&self, offset: usize) -> Result<u8> {
        Ok(self.slice_at(offset, 1)?[0])
    }

    /// Reads an unsigned 16-bit integer (little-endian) at `offset`.
    pub fn read_u16_le_at(&self, offset: usize) -> Result<u16> {
        let bytes = self.slice_at(offset, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Reads an unsigned 32-bit integer (little-endian) at `offset`.
    pub fn read_u32_le_at(&self, offset: usize) -> Result<u32> {
        let bytes = self.slice_at(offset, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// Printable 7-bit ASCII (0x20..=0x7E).
pub fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

/// True when every byte is zero, the encoding of a null field.
pub fn is_all_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == 0)
}

/// Decodes bytes up to the first null as ASCII, replacing anything else with `?`.
pub fn decode_ascii(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes[..len]
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}

/// True when every non-space character is an ASCII digit.
pub fn is_numeric_text(text: &str) -> bool {
    let mut saw_digit = false;
    for c in text.chars() {
        if c.is_ascii_digit() {
            saw_digit = true;
        } else if c != ' ' {
            return false;
        }
    }
    saw_digit
}
