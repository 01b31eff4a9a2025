// src/png/chunk.rs

//! Reading and writing PNG chunk streams.
//!
//! Two structs mirror each other:
//! - `PngWriter`: writes the signature and CRC-framed chunks to any `Write`.
//! - `PngReader`: walks the chunks of a PNG held in memory, checking every CRC.

use crate::encode::checksum::Crc32;
use crate::utils::error::{Result, ThumbnailError};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use log::trace;
use std::io::{Cursor, Read, Write};

/// The 8-byte signature every PNG file starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// A 4-character chunk type such as `IHDR`.
pub type ChunkType = [u8; 4];

pub const IHDR: ChunkType = *b"IHDR";
pub const PLTE: ChunkType = *b"PLTE";
pub const IDAT: ChunkType = *b"IDAT";
pub const IEND: ChunkType = *b"IEND";

/// Colour type 3: every pixel is an index into `PLTE`.
pub const COLOR_TYPE_INDEXED: u8 = 3;

/// A chunk with its payload, as it appears between length and CRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngChunk {
    pub chunk_type: ChunkType,
    pub data: Vec<u8>,
}

impl PngChunk {
    #[inline]
    pub fn new(chunk_type: ChunkType, data: Vec<u8>) -> Self {
        Self { chunk_type, data }
    }

    /// Returns the chunk type as a string, e.g. "IDAT".
    #[inline]
    pub fn type_str(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }

    /// CRC-32 over the type and the payload.
    pub fn crc(&self) -> u32 {
        chunk_crc(&self.chunk_type, &self.data)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_chunk(writer, &self.chunk_type, &self.data)
    }
}

fn chunk_crc(chunk_type: &ChunkType, payload: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(chunk_type);
    crc.update(payload);
    crc.finalize()
}

/// Writes `length | type | payload | crc` for one chunk.
///
/// The length field is 32 bits wide; larger payloads are refused rather
/// than split over several chunks.
pub fn write_chunk<W: Write>(writer: &mut W, chunk_type: &ChunkType, payload: &[u8]) -> Result<()> {
    let length =
        u32::try_from(payload.len()).map_err(|_| ThumbnailError::ChunkTooLarge(payload.len()))?;

    writer.write_u32::<BigEndian>(length)?;
    writer.write_all(chunk_type)?;
    writer.write_all(payload)?;
    writer.write_u32::<BigEndian>(chunk_crc(chunk_type, payload))?;
    Ok(())
}

/// The fields of an `IHDR` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ihdr {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub compression_method: u8,
    pub filter_method: u8,
    pub interlace_method: u8,
}

impl Ihdr {
    /// Header for an 8-bit indexed, non-interlaced image.
    pub fn indexed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bit_depth: 8,
            color_type: COLOR_TYPE_INDEXED,
            compression_method: 0,
            filter_method: 0,
            interlace_method: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; 13] {
        let mut bytes = [0u8; 13];
        BigEndian::write_u32(&mut bytes[0..4], self.width);
        BigEndian::write_u32(&mut bytes[4..8], self.height);
        bytes[8] = self.bit_depth;
        bytes[9] = self.color_type;
        bytes[10] = self.compression_method;
        bytes[11] = self.filter_method;
        bytes[12] = self.interlace_method;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 13 {
            return Err(ThumbnailError::Validation(format!(
                "IHDR payload must be 13 bytes, got {}",
                bytes.len()
            )));
        }
        let mut cursor = Cursor::new(bytes);
        Ok(Self {
            width: cursor.read_u32::<BigEndian>()?,
            height: cursor.read_u32::<BigEndian>()?,
            bit_depth: cursor.read_u8()?,
            color_type: cursor.read_u8()?,
            compression_method: cursor.read_u8()?,
            filter_method: cursor.read_u8()?,
            interlace_method: cursor.read_u8()?,
        })
    }
}

/// A writer for PNG chunk streams on any byte sink.
pub struct PngWriter<W: Write> {
    writer: W,
    chunks_written: usize,
}

impl<W: Write> PngWriter<W> {
    #[inline]
    pub fn new(writer: W) -> Self {
        PngWriter {
            writer,
            chunks_written: 0,
        }
    }

    /// Writes the PNG signature. Call once, before any chunk.
    #[inline]
    pub fn write_signature(&mut self) -> Result<()> {
        self.writer.write_all(&PNG_SIGNATURE)?;
        Ok(())
    }

    /// Writes one complete chunk.
    pub fn put_chunk(&mut self, chunk_type: &ChunkType, payload: &[u8]) -> Result<()> {
        trace!(
            "writing {} chunk, {} bytes",
            String::from_utf8_lossy(chunk_type),
            payload.len()
        );
        write_chunk(&mut self.writer, chunk_type, payload)?;
        self.chunks_written += 1;
        Ok(())
    }

    #[inline]
    pub fn chunks_written(&self) -> usize {
        self.chunks_written
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// A reader over the chunks of an in-memory PNG.
pub struct PngReader<'a> {
    cursor: Cursor<&'a [u8]>,
    finished: bool,
}

impl<'a> PngReader<'a> {
    /// Checks the signature and positions the reader at the first chunk.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < PNG_SIGNATURE.len() || bytes[..8] != PNG_SIGNATURE {
            return Err(ThumbnailError::Validation("missing PNG signature".to_string()));
        }
        let mut cursor = Cursor::new(bytes);
        cursor.set_position(PNG_SIGNATURE.len() as u64);
        Ok(Self {
            cursor,
            finished: false,
        })
    }

    /// Reads the next chunk and verifies its CRC.
    ///
    /// Returns `Ok(None)` once `IEND` has been read or the input is exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<PngChunk>> {
        let remaining = self.cursor.get_ref().len() as u64 - self.cursor.position();
        if self.finished || remaining == 0 {
            return Ok(None);
        }

        let length = self.cursor.read_u32::<BigEndian>()? as usize;
        // type + payload + crc must still be there
        if length as u64 + 8 > remaining - 4 {
            return Err(ThumbnailError::Validation(format!(
                "chunk of {} bytes runs past the end of the stream",
                length
            )));
        }
        let mut chunk_type = [0u8; 4];
        self.cursor.read_exact(&mut chunk_type)?;
        let mut data = vec![0u8; length];
        self.cursor.read_exact(&mut data)?;
        let declared_crc = self.cursor.read_u32::<BigEndian>()?;

        let chunk = PngChunk::new(chunk_type, data);
        if chunk.crc() != declared_crc {
            return Err(ThumbnailError::Validation(format!(
                "CRC mismatch in {} chunk",
                chunk.type_str()
            )));
        }
        self.finished = chunk_type == IEND;
        Ok(Some(chunk))
    }

    /// Reads every remaining chunk.
    pub fn read_all(mut self) -> Result<Vec<PngChunk>> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.next_chunk()? {
            chunks.push(chunk);
        }
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_iend_chunk() {
        let mut out = Vec::new();
        write_chunk(&mut out, &IEND, &[]).unwrap();
        assert_eq!(
            out,
            vec![0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]
        );
    }

    #[test]
    fn test_chunk_framing() {
        let mut out = Vec::new();
        write_chunk(&mut out, &PLTE, &[1, 2, 3]).unwrap();
        assert_eq!(&out[0..4], &[0, 0, 0, 3]);
        assert_eq!(&out[4..8], b"PLTE");
        assert_eq!(&out[8..11], &[1, 2, 3]);
        let crc = crate::encode::checksum::crc32(b"PLTE\x01\x02\x03");
        assert_eq!(&out[11..], &crc.to_be_bytes());
    }

    #[test]
    fn test_ihdr_bytes() {
        let ihdr = Ihdr::indexed(4, 258);
        let bytes = ihdr.to_bytes();
        assert_eq!(bytes, [0, 0, 0, 4, 0, 0, 1, 2, 8, 3, 0, 0, 0]);
        assert_eq!(Ihdr::from_bytes(&bytes).unwrap(), ihdr);
        assert!(Ihdr::from_bytes(&bytes[..12]).is_err());
    }

    #[test]
    fn test_writer_reader_agree() {
        let mut writer = PngWriter::new(Vec::new());
        writer.write_signature().unwrap();
        writer.put_chunk(&IHDR, &Ihdr::indexed(1, 1).to_bytes()).unwrap();
        writer.put_chunk(&IDAT, b"payload").unwrap();
        writer.put_chunk(&IEND, &[]).unwrap();
        assert_eq!(writer.chunks_written(), 3);
        let bytes = writer.into_inner();

        let chunks = PngReader::new(&bytes).unwrap().read_all().unwrap();
        let types: Vec<String> = chunks.iter().map(PngChunk::type_str).collect();
        assert_eq!(types, ["IHDR", "IDAT", "IEND"]);
        assert_eq!(chunks[1].data, b"payload");
    }

    #[test]
    fn test_reader_rejects_bad_crc() {
        let mut bytes = PNG_SIGNATURE.to_vec();
        PngChunk::new(IDAT, vec![1, 2, 3]).write_to(&mut bytes).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let mut reader = PngReader::new(&bytes).unwrap();
        assert!(matches!(
            reader.next_chunk(),
            Err(ThumbnailError::Validation(_))
        ));
    }

    #[test]
    fn test_reader_rejects_missing_signature() {
        assert!(PngReader::new(b"GIF89a").is_err());
    }
}
