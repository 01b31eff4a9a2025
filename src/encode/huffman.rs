// src/encode/huffman.rs

//! DEFLATE fixed Huffman codes (RFC 1951, section 3.2.6).
//!
//! The fixed literal/length table is expressed as its four code ranges
//! instead of a generated tree. Lengths and distances are mapped to their
//! base symbol plus extra bits by walking the extra-bits tables below.

use super::bit_writer::BitString;
use thiserror::Error;

/// Shortest back-reference DEFLATE can express.
pub const MIN_MATCH: u16 = 3;
/// Longest back-reference DEFLATE can express.
pub const MAX_MATCH: u16 = 258;
/// Largest back-reference distance (the 32 KiB window).
pub const MAX_DISTANCE: u16 = 32768;
/// Literal/length symbol terminating a block.
pub const END_OF_BLOCK: u16 = 256;
/// Highest literal/length symbol with a defined meaning.
pub const MAX_LITLEN_SYMBOL: u16 = 285;

/// Extra bits carried by length symbols 257..=285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, //
    1, 1, 2, 2, 2, 2, 3, 3, 3, 3, //
    4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Extra bits carried by distance symbols 0..=29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, //
    4, 4, 5, 5, 6, 6, 7, 7, 8, 8, //
    9, 9, 10, 10, 11, 11, 12, 12, 13, 13,
];

/// Distance codes are a flat 5-bit code in the fixed table.
const DISTANCE_CODE_BITS: u8 = 5;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeflateError {
    #[error("literal/length symbol {0} exceeds 285")]
    SymbolOutOfRange(u16),
    #[error("match length {0} outside 3..=258")]
    LengthOutOfRange(u16),
    #[error("match distance {0} outside 1..=32768")]
    DistanceOutOfRange(u32),
}

/// Encodes a literal byte, end-of-block marker or length symbol.
///
/// The returned bits are already reversed for LSB-first packing.
pub fn encode_literal_or_length(symbol: u16) -> Result<BitString, DeflateError> {
    let code = match symbol {
        0..=255 => return Ok(encode_literal(symbol as u8)),
        256..=279 => BitString::new(7, (symbol - 256) as u32),
        280..=MAX_LITLEN_SYMBOL => BitString::new(8, 0b1100_0000 + (symbol - 280) as u32),
        _ => return Err(DeflateError::SymbolOutOfRange(symbol)),
    };
    Ok(code.reversed())
}

/// Encodes a literal byte.
#[inline]
pub fn encode_literal(byte: u8) -> BitString {
    let code = match byte {
        0..=143 => BitString::new(8, 0b0011_0000 + byte as u32),
        _ => BitString::new(9, 0b1_1001_0000 + (byte - 144) as u32),
    };
    code.reversed()
}

/// Encodes a match length as its length symbol followed by extra bits.
pub fn encode_length(run_length: u16) -> Result<BitString, DeflateError> {
    if !(MIN_MATCH..=MAX_MATCH).contains(&run_length) {
        return Err(DeflateError::LengthOutOfRange(run_length));
    }

    // 258 has its own symbol; symbol 284 only reaches 257
    if run_length == MAX_MATCH {
        return encode_literal_or_length(MAX_LITLEN_SYMBOL);
    }

    let (code, extra) = split_by_extra_bits(&LENGTH_EXTRA_BITS, (run_length - MIN_MATCH) as u32);
    let huffman = encode_literal_or_length(257 + code as u16)?;
    Ok(huffman.then(extra))
}

/// Encodes a match distance as its 5-bit distance code followed by extra bits.
pub fn encode_distance(distance: u32) -> Result<BitString, DeflateError> {
    if !(1..=MAX_DISTANCE as u32).contains(&distance) {
        return Err(DeflateError::DistanceOutOfRange(distance));
    }

    let (code, extra) = split_by_extra_bits(&DISTANCE_EXTRA_BITS, distance - 1);
    let huffman = BitString::new(DISTANCE_CODE_BITS, code as u32).reversed();
    Ok(huffman.then(extra))
}

/// Finds the code whose range holds `offset` and the extra bits selecting
/// the value inside that range.
///
/// Callers guarantee `offset` lies inside the table's total range.
fn split_by_extra_bits(table: &[u8], mut offset: u32) -> (usize, BitString) {
    let mut code = 0;
    while code + 1 < table.len() && offset >= 1 << table[code] {
        offset -= 1 << table[code];
        code += 1;
    }
    (code, BitString::new(table[code], offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Base lengths for symbols 257..=285 (RFC 1951).
    const LENGTH_BASE: [u16; 29] = [
        3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99,
        115, 131, 163, 195, 227, 258,
    ];

    /// Base distances for distance codes 0..=29 (RFC 1951).
    const DISTANCE_BASE: [u32; 30] = [
        1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025,
        1537, 2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
    ];

    fn msb_first(bits: BitString) -> u32 {
        bits.reversed().value
    }

    /// Decodes a fixed literal/length code from the low bits of `value`.
    fn decode_litlen(value: u32) -> (u16, u8) {
        let take = |len: u8| BitString::new(len, value).reversed().value;
        let seven = take(7);
        if seven <= 0b001_0111 {
            return (256 + seven as u16, 7);
        }
        let eight = take(8);
        if (0b0011_0000..=0b1011_1111).contains(&eight) {
            return ((eight - 0b0011_0000) as u16, 8);
        }
        if (0b1100_0000..=0b1100_0111).contains(&eight) {
            return ((eight - 0b1100_0000 + 280) as u16, 8);
        }
        let nine = take(9);
        ((nine - 0b1_1001_0000 + 144) as u16, 9)
    }

    #[test]
    fn test_literal_code_ranges() {
        assert_eq!(msb_first(encode_literal_or_length(0).unwrap()), 0b0011_0000);
        assert_eq!(encode_literal_or_length(0).unwrap().len, 8);
        assert_eq!(msb_first(encode_literal_or_length(143).unwrap()), 0b1011_1111);
        assert_eq!(msb_first(encode_literal_or_length(144).unwrap()), 0b1_1001_0000);
        assert_eq!(encode_literal_or_length(255).unwrap().len, 9);
        assert_eq!(msb_first(encode_literal_or_length(255).unwrap()), 0b1_1111_1111);
        assert_eq!(encode_literal_or_length(END_OF_BLOCK).unwrap(), BitString::new(7, 0));
        assert_eq!(msb_first(encode_literal_or_length(279).unwrap()), 0b001_0111);
        assert_eq!(msb_first(encode_literal_or_length(280).unwrap()), 0b1100_0000);
        assert_eq!(msb_first(encode_literal_or_length(285).unwrap()), 0b1100_0101);
    }

    #[test]
    fn test_literal_symbols_decode() {
        for symbol in 0..=MAX_LITLEN_SYMBOL {
            let code = encode_literal_or_length(symbol).unwrap();
            assert_eq!(decode_litlen(code.value), (symbol, code.len), "symbol {}", symbol);
        }
    }

    #[test]
    fn test_symbol_out_of_range() {
        assert_eq!(
            encode_literal_or_length(286),
            Err(DeflateError::SymbolOutOfRange(286))
        );
        assert!(encode_literal_or_length(u16::MAX).is_err());
    }

    #[test]
    fn test_every_length_decodes() {
        for length in MIN_MATCH..=MAX_MATCH {
            let bits = encode_length(length).unwrap();
            let (symbol, code_len) = decode_litlen(bits.value);
            assert!((257..=285).contains(&symbol), "length {}", length);

            let index = (symbol - 257) as usize;
            let extra_len = LENGTH_EXTRA_BITS[index];
            assert_eq!(bits.len, code_len + extra_len);
            let extra = (bits.value >> code_len) as u16;
            assert!(extra < 1 << extra_len);
            assert_eq!(LENGTH_BASE[index] + extra, length, "length {}", length);
        }
    }

    #[test]
    fn test_max_length_uses_symbol_285() {
        let bits = encode_length(MAX_MATCH).unwrap();
        assert_eq!(bits, encode_literal_or_length(285).unwrap());
        // 227 + 31 is also 258, but the 284 form must not be chosen
        assert_eq!(bits.len, 8);
    }

    #[test]
    fn test_length_out_of_range() {
        assert_eq!(encode_length(2), Err(DeflateError::LengthOutOfRange(2)));
        assert_eq!(encode_length(0), Err(DeflateError::LengthOutOfRange(0)));
        assert_eq!(encode_length(259), Err(DeflateError::LengthOutOfRange(259)));
    }

    #[test]
    fn test_every_distance_decodes() {
        for distance in 1..=MAX_DISTANCE as u32 {
            let bits = encode_distance(distance).unwrap();
            let code = BitString::new(5, bits.value).reversed().value as usize;
            assert!(code < 30, "distance {}", distance);

            let extra_len = DISTANCE_EXTRA_BITS[code];
            assert_eq!(bits.len, 5 + extra_len);
            let extra = bits.value >> 5;
            assert!(extra < 1 << extra_len);
            assert_eq!(DISTANCE_BASE[code] + extra, distance, "distance {}", distance);
        }
    }

    #[test]
    fn test_distance_one() {
        assert_eq!(encode_distance(1).unwrap(), BitString::new(5, 0));
    }

    #[test]
    fn test_distance_out_of_range() {
        assert_eq!(encode_distance(0), Err(DeflateError::DistanceOutOfRange(0)));
        assert_eq!(
            encode_distance(32769),
            Err(DeflateError::DistanceOutOfRange(32769))
        );
    }
}
