//! # Palette Thumbnailer Library
//!
//! Turns an indexed colour palette into a small PNG showing every entry as
//! a solid swatch. The zlib/DEFLATE stream inside the PNG is produced by
//! hand, using DEFLATE's fixed Huffman codes, instead of by a compression
//! library.
//!
//! This library is organized into several modules:
//! - `utils`: Error handling
//! - `encode`: Bit packing, fixed Huffman codes, checksums and the zlib block writer
//! - `png`: PNG chunk framing
//! - `palette`: Palettes and the JASC-PAL text format
//! - `thumbnail`: Swatch grid layout and the PNG encoder tying it all together

// Re-export commonly used types at the crate root
pub use utils::error::{Result, ThumbnailError};

pub mod utils {
    pub mod error;
}

pub mod encode {
    pub mod bit_writer;
    pub mod checksum;
    pub mod huffman;
    pub mod zlib;

    pub use bit_writer::{BitString, BitWriter};
    pub use checksum::{Adler32, Crc32};
    pub use huffman::DeflateError;
}

pub mod png {
    pub mod chunk;

    pub use chunk::{Ihdr, PngChunk, PngReader, PngWriter};
}

pub mod palette;

pub mod thumbnail {
    pub mod encoder;
    pub mod layout;

    pub use encoder::{SwatchImageEncoder, ThumbnailParams, encode_thumbnail};
    pub use layout::SwatchLayout;
}

// Public API exports
pub use palette::{Palette, Rgb};
pub use thumbnail::{SwatchImageEncoder, SwatchLayout, ThumbnailParams, encode_thumbnail};

// Constants
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PNG_MAGIC: [u8; 8] = png::chunk::PNG_SIGNATURE;
