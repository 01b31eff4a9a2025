// src/encode/zlib.rs

//! A zlib stream holding exactly one fixed-Huffman DEFLATE block.
//!
//! Every byte the block decodes to is fed to the Adler-32 at the moment its
//! symbols are written, whether it is spelled out as a literal or produced
//! by a back-reference.

use super::bit_writer::BitWriter;
use super::checksum::Adler32;
use super::huffman::{
    encode_distance, encode_length, encode_literal, encode_literal_or_length, DeflateError,
    END_OF_BLOCK, MAX_MATCH, MIN_MATCH,
};
#[cfg(feature = "debug-logging")]
use log::trace;

/// CMF = deflate with a 32 KiB window, FLG = fastest level, no dictionary.
pub const ZLIB_HEADER: [u8; 2] = [0x78, 0x01];

/// BTYPE value selecting the fixed Huffman tables.
const BTYPE_FIXED: u32 = 0b01;

/// Writer for a zlib stream made of a single final fixed-Huffman block.
#[derive(Debug)]
pub struct ZlibBlockWriter {
    bits: BitWriter,
    adler: Adler32,
    uncompressed_len: usize,
}

impl Default for ZlibBlockWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ZlibBlockWriter {
    /// Starts the stream: zlib header followed by the block header.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(bytes: usize) -> Self {
        let mut bits = BitWriter::with_capacity(bytes);
        for byte in ZLIB_HEADER {
            bits.append(8, byte as u32);
        }
        bits.append(1, 1); // BFINAL
        bits.append(2, BTYPE_FIXED);

        Self {
            bits,
            adler: Adler32::new(),
            uncompressed_len: 0,
        }
    }

    /// Emits `byte` as a literal.
    pub fn push_literal(&mut self, byte: u8) {
        #[cfg(feature = "debug-logging")]
        trace!("literal {} at bit {}", byte, self.bits.bit_len());
        self.bits.append_bits(encode_literal(byte));
        self.adler.push(byte);
        self.uncompressed_len += 1;
    }

    /// Emits `count` copies of `byte`, each as its own literal.
    pub fn push_literal_run(&mut self, byte: u8, count: usize) {
        for _ in 0..count {
            self.push_literal(byte);
        }
    }

    /// Emits `count` copies of `byte` as one literal followed by
    /// back-references to the byte just before them.
    ///
    /// Runs too long for one back-reference are split so that every piece
    /// stays within 3..=258; a tail shorter than 3 is written as literals.
    pub fn push_run(&mut self, byte: u8, count: usize) -> Result<(), DeflateError> {
        if count == 0 {
            return Ok(());
        }
        self.push_literal(byte);

        let min = MIN_MATCH as usize;
        let max = MAX_MATCH as usize;
        let mut remaining = count - 1;
        while remaining >= min {
            let length = if remaining > max {
                // leave at least MIN_MATCH for the next piece
                (remaining - min).min(max)
            } else {
                remaining
            };
            self.push_back_reference(length as u16, 1)?;
            self.adler.push_repeatedly(byte, length);
            self.uncompressed_len += length;
            remaining -= length;
        }
        self.push_literal_run(byte, remaining);
        Ok(())
    }

    /// Writes a length/distance pair without touching the checksum.
    fn push_back_reference(&mut self, length: u16, distance: u32) -> Result<(), DeflateError> {
        #[cfg(feature = "debug-logging")]
        trace!("match length {} distance {} at bit {}", length, distance, self.bits.bit_len());
        self.bits.append_bits(encode_length(length)?);
        self.bits.append_bits(encode_distance(distance)?);
        Ok(())
    }

    /// Number of bytes the block decodes to so far.
    #[inline]
    pub fn uncompressed_len(&self) -> usize {
        self.uncompressed_len
    }

    /// Size of the compressed stream so far, in bits.
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bits.bit_len()
    }

    #[inline]
    pub fn adler(&self) -> Adler32 {
        self.adler
    }

    /// Closes the block, pads to a byte boundary and appends the Adler-32.
    pub fn finish(mut self) -> Result<Vec<u8>, DeflateError> {
        self.bits.append_bits(encode_literal_or_length(END_OF_BLOCK)?);
        self.bits.fill_to_byte_boundary();
        for byte in self.adler.to_be_bytes() {
            self.bits.append(8, byte as u32);
        }
        Ok(self.bits.into_bytes())
    }
}
