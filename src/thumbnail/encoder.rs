//! Swatch thumbnail encoding: palette in, PNG file out.

use crate::encode::zlib::ZlibBlockWriter;
use crate::palette::{MAX_PALETTE_LEN, Palette};
use crate::png::chunk::{IDAT, IEND, IHDR, Ihdr, PLTE, PngWriter};
use crate::thumbnail::layout::SwatchLayout;
use crate::utils::error::{Result, ThumbnailError};
use log::{debug, info};
use std::io::Write;

/// PNG filter type written at the start of every scanline.
const FILTER_NONE: u8 = 0;

/// Index written into grid cells that hold no palette entry.
const EMPTY_CELL_INDEX: u8 = 0;

/// Configuration for thumbnail encoding
#[derive(Debug, Clone)]
pub struct ThumbnailParams {
    /// Requested width and height in pixels (default: 64)
    pub dimension: u32,
    /// Swatch width from which runs are written as back-references instead of literals
    pub back_reference_threshold: u32,
}

impl Default for ThumbnailParams {
    fn default() -> Self {
        Self {
            dimension: 64,
            back_reference_threshold: 4,
        }
    }
}

/// Renders a palette as a grid of solid swatches in an indexed PNG.
///
/// The image data is a single fixed-Huffman DEFLATE block written by hand:
/// each swatch row segment is one literal followed by back-references to
/// it, or plain literals when swatches are narrow.
#[derive(Debug, Clone)]
pub struct SwatchImageEncoder<'a> {
    palette: &'a Palette,
    params: ThumbnailParams,
}

impl<'a> SwatchImageEncoder<'a> {
    /// Creates an encoder with default parameters.
    pub fn new(palette: &'a Palette) -> Self {
        Self {
            palette,
            params: ThumbnailParams::default(),
        }
    }

    pub fn with_params(mut self, params: ThumbnailParams) -> Self {
        self.params = params;
        self
    }

    /// Sets the requested width and height.
    pub fn with_dimension(mut self, dimension: u32) -> Self {
        self.params.dimension = dimension;
        self
    }

    pub fn with_back_reference_threshold(mut self, threshold: u32) -> Self {
        self.params.back_reference_threshold = threshold;
        self
    }

    /// Writes every pixel as a literal.
    pub fn without_back_references(self) -> Self {
        self.with_back_reference_threshold(u32::MAX)
    }

    pub fn params(&self) -> &ThumbnailParams {
        &self.params
    }

    /// Validates the palette and computes the grid.
    pub fn layout(&self) -> Result<SwatchLayout> {
        if self.palette.len() > MAX_PALETTE_LEN {
            return Err(ThumbnailError::PaletteTooLarge(self.palette.len()));
        }
        SwatchLayout::new(self.palette.len(), self.params.dimension)
    }

    /// Encodes the complete PNG file.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let layout = self.layout()?;
        info!(
            "encoding {} colors as {}x{} swatches of {}x{} ({}x{} pixels)",
            layout.count,
            layout.swatches_x,
            layout.swatches_y,
            layout.swatch_width,
            layout.swatch_height,
            layout.width(),
            layout.height()
        );

        let image_data = self.encode_image_data(&layout)?;

        let mut writer = PngWriter::new(Vec::with_capacity(image_data.len() + 64));
        writer.write_signature()?;
        writer.put_chunk(&IHDR, &Ihdr::indexed(layout.width(), layout.height()).to_bytes())?;
        writer.put_chunk(&PLTE, self.palette.as_bytes())?;
        writer.put_chunk(&IDAT, &image_data)?;
        writer.put_chunk(&IEND, &[])?;
        Ok(writer.into_inner())
    }

    /// Encodes the PNG and writes it out in one piece.
    ///
    /// Nothing reaches `writer` unless encoding succeeded.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let png = self.encode()?;
        writer.write_all(&png)?;
        writer.flush()?;
        Ok(())
    }

    /// Builds the zlib stream holding the filtered scanlines.
    pub fn encode_image_data(&self, layout: &SwatchLayout) -> Result<Vec<u8>> {
        let swatch_width = layout.swatch_width as usize;
        let use_back_references = layout.swatch_width >= self.params.back_reference_threshold;

        // about one byte per literal plus four per back-reference
        let symbols_per_swatch = if use_back_references { 5 } else { swatch_width };
        let row_symbols = 1 + layout.swatches_x as usize * symbols_per_swatch;
        let estimate = row_symbols * layout.height() as usize + 16;
        let mut zlib = ZlibBlockWriter::with_capacity(estimate);

        for row in 0..layout.swatches_y {
            for _ in 0..layout.swatch_height {
                zlib.push_literal(FILTER_NONE);
                for column in 0..layout.swatches_x {
                    let index = match layout.index_at(column, row) {
                        Some(index) => index as u8,
                        None => EMPTY_CELL_INDEX,
                    };
                    if use_back_references {
                        zlib.push_run(index, swatch_width)?;
                    } else {
                        zlib.push_literal_run(index, swatch_width);
                    }
                }
            }
        }

        debug!(
            "image data: {} bytes raw, {} bits compressed, adler32 {:08x}",
            zlib.uncompressed_len(),
            zlib.bit_len(),
            zlib.adler().value()
        );
        Ok(zlib.finish()?)
    }
}

/// Encodes `palette` as a thumbnail of the given dimension with default settings.
pub fn encode_thumbnail(palette: &Palette, dimension: u32) -> Result<Vec<u8>> {
    SwatchImageEncoder::new(palette).with_dimension(dimension).encode()
}
