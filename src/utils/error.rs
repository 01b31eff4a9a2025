use std::error::Error;
use std::fmt;
use std::io;

use crate::encode::huffman::DeflateError;

/// Main error type for the thumbnailer library.
#[derive(Debug)]
pub enum ThumbnailError {
    /// An I/O error occurred
    Io(io::Error),
    /// The palette has no colours, so no grid can be laid out
    EmptyPalette,
    /// The palette has more colours than an 8-bit indexed PNG can address
    PaletteTooLarge(usize),
    /// The requested dimension leaves a swatch without any pixels
    DimensionTooSmall { dimension: u32, swatches_x: u32, swatches_y: u32 },
    /// A chunk payload does not fit the 32-bit PNG length field
    ChunkTooLarge(usize),
    /// A PNG stream failed a structural check
    Validation(String),
    /// The palette text could not be parsed
    Parse { line: usize, message: String },
    /// An encoding error occurred
    EncodingError(DeflateError),
}

impl fmt::Display for ThumbnailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThumbnailError::Io(err) => write!(f, "I/O error: {}", err),
            ThumbnailError::EmptyPalette => write!(f, "Invalid palette: no colors"),
            ThumbnailError::PaletteTooLarge(count) => {
                write!(f, "Invalid palette: {} colors (at most 256 allowed)", count)
            }
            ThumbnailError::DimensionTooSmall { dimension, swatches_x, swatches_y } => write!(
                f,
                "Dimension {} is too small for a {}x{} swatch grid",
                dimension, swatches_x, swatches_y
            ),
            ThumbnailError::ChunkTooLarge(len) => {
                write!(f, "Chunk payload of {} bytes exceeds the PNG length limit", len)
            }
            ThumbnailError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ThumbnailError::Parse { line, message } => {
                write!(f, "Parse error on line {}: {}", line, message)
            }
            ThumbnailError::EncodingError(err) => write!(f, "Encoding error: {}", err),
        }
    }
}

impl Error for ThumbnailError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ThumbnailError::Io(err) => Some(err),
            ThumbnailError::EncodingError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ThumbnailError {
    fn from(err: io::Error) -> Self {
        ThumbnailError::Io(err)
    }
}

impl From<DeflateError> for ThumbnailError {
    fn from(err: DeflateError) -> Self {
        ThumbnailError::EncodingError(err)
    }
}

/// A specialized `Result` type for thumbnail encoding operations.
pub type Result<T> = std::result::Result<T, ThumbnailError>;
