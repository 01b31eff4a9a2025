// src/encode/checksum.rs

//! Streaming Adler-32 (zlib trailer, RFC 1950) and CRC-32 (PNG chunks).

/// Largest prime below 2^16.
pub const ADLER32_MODULUS: u32 = 65521;

/// Reflected form of the CRC-32 polynomial used by PNG and zlib.
pub const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;

/// Running Adler-32 state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adler32 {
    s1: u32,
    s2: u32,
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Adler32 {
    pub const fn new() -> Self {
        Self { s1: 1, s2: 0 }
    }

    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.s1 = (self.s1 + byte as u32) % ADLER32_MODULUS;
        self.s2 = (self.s2 + self.s1) % ADLER32_MODULUS;
    }

    /// Same result as calling `push(0)` `count` times.
    ///
    /// A zero byte leaves `s1` untouched, so only `s2` moves, by `s1` each time.
    pub fn push_zero_repeatedly(&mut self, count: usize) {
        let modulus = ADLER32_MODULUS as u64;
        let steps = count as u64 % modulus;
        self.s2 = ((self.s2 as u64 + self.s1 as u64 * steps) % modulus) as u32;
    }

    /// Same result as calling `push(byte)` `count` times.
    pub fn push_repeatedly(&mut self, byte: u8, count: usize) {
        if byte == 0 {
            self.push_zero_repeatedly(count);
        } else {
            for _ in 0..count {
                self.push(byte);
            }
        }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    #[inline]
    pub fn s1(&self) -> u32 {
        self.s1
    }

    #[inline]
    pub fn s2(&self) -> u32 {
        self.s2
    }

    /// The checksum as a single word, `s2` in the high half.
    #[inline]
    pub fn value(&self) -> u32 {
        (self.s2 << 16) | self.s1
    }

    /// Trailer bytes in zlib order: `s2` high, `s2` low, `s1` high, `s1` low.
    #[inline]
    pub fn to_be_bytes(&self) -> [u8; 4] {
        self.value().to_be_bytes()
    }
}

/// Running CRC-32 state, computed bit by bit without a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32 {
    crc: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub const fn new() -> Self {
        Self { crc: 0xFFFF_FFFF }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.crc ^= byte as u32;
            for _ in 0..8 {
                let mask = if self.crc & 1 != 0 { CRC32_POLYNOMIAL } else { 0 };
                self.crc = (self.crc >> 1) ^ mask;
            }
        }
    }

    #[inline]
    pub fn finalize(&self) -> u32 {
        self.crc ^ 0xFFFF_FFFF
    }
}

/// CRC-32 of a complete byte sequence.
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(bytes);
    crc.finalize()
}
