// src/encode/bit_writer.rs

//! LSB-first bit packing for the DEFLATE stream.
//!
//! DEFLATE fills each output byte starting from its least significant bit.
//! Huffman codes are defined most-significant-bit first, so they are
//! reversed with [`BitString::reverse`] before they reach the writer, while
//! extra-bits fields and header fields are appended as plain integers.

use bitvec::prelude::*;

/// A right-aligned group of bits, e.g. one Huffman code or extra-bits field.
///
/// `value` never has bits set at or above position `len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitString {
    pub len: u8,
    pub value: u32,
}

impl BitString {
    /// Creates a bit string, masking `value` down to `len` bits.
    #[inline]
    pub fn new(len: u8, value: u32) -> Self {
        debug_assert!(len <= 32);
        let mask = if len >= 32 { u32::MAX } else { (1u32 << len) - 1 };
        Self { len, value: value & mask }
    }

    /// Reverses the order of the `len` low bits in place.
    #[inline]
    pub fn reverse(&mut self) {
        self.value = if self.len == 0 {
            0
        } else {
            self.value.reverse_bits() >> (32 - self.len as u32)
        };
    }

    /// Returns a copy with the bit order reversed.
    #[inline]
    pub fn reversed(mut self) -> Self {
        self.reverse();
        self
    }

    /// Concatenates `high` above `self`: `self` is emitted first.
    #[inline]
    pub fn then(self, high: BitString) -> Self {
        debug_assert!(self.len + high.len <= 32);
        Self {
            len: self.len + high.len,
            value: self.value | (high.value << self.len),
        }
    }
}

/// A growable buffer that bits are appended to, least significant bit first.
///
/// Bytes at and beyond the cursor are always zero, so writes are plain ORs.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    buffer: Vec<u8>,
    byte_offset: usize,
    bit_offset: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with room for `bytes` bytes before it has to grow.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(bytes),
            ..Self::default()
        }
    }

    /// Appends the low `bit_count` bits of `value`.
    ///
    /// When the current byte cannot hold all of them, the fitting part is
    /// placed in it and the rest continues in the following byte(s).
    pub fn append(&mut self, bit_count: u8, value: u32) {
        debug_assert!(bit_count <= 32);
        let mut remaining = bit_count as u32;
        let mut value = value;

        while remaining > 0 {
            self.ensure_current_byte();
            let available = 8 - self.bit_offset as u32;
            let take = remaining.min(available);
            let mask = (1u32 << take) - 1;
            self.buffer[self.byte_offset] |= ((value & mask) << self.bit_offset) as u8;

            if take == available {
                self.byte_offset += 1;
                self.bit_offset = 0;
            } else {
                self.bit_offset += take as u8;
            }
            value >>= take;
            remaining -= take;
        }
    }

    #[inline]
    pub fn append_bits(&mut self, bits: BitString) {
        self.append(bits.len, bits.value);
    }

    /// Skips to the start of the next byte, leaving the padding bits zero.
    pub fn fill_to_byte_boundary(&mut self) {
        if self.bit_offset != 0 {
            self.byte_offset += 1;
            self.bit_offset = 0;
        }
    }

    /// Total number of bits appended so far, padding included.
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.byte_offset * 8 + self.bit_offset as usize
    }

    /// Number of bytes touched by the bits written so far.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.byte_offset + usize::from(self.bit_offset > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len() == 0
    }

    /// The written bytes; a partially filled last byte is included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.byte_len()]
    }

    /// The written bits in stream order.
    pub fn as_bits(&self) -> &BitSlice<u8, Lsb0> {
        &self.buffer.view_bits::<Lsb0>()[..self.bit_len()]
    }

    /// Consumes the writer and returns the written bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buffer.truncate(self.byte_len());
        self.buffer
    }

    fn ensure_current_byte(&mut self) {
        if self.buffer.len() <= self.byte_offset {
            self.buffer.resize(self.byte_offset + 1, 0);
        }
    }
}
