// src/thumbnail/layout.rs

//! Placement of palette entries on the swatch grid.

use crate::utils::error::{Result, ThumbnailError};

/// How a palette is spread over a square thumbnail.
///
/// The grid is `floor(sqrt(count))` swatches wide and just tall enough to
/// hold every entry. Swatch sizes are rounded down, so the image can come
/// out smaller than the requested dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwatchLayout {
    pub count: usize,
    pub swatches_x: u32,
    pub swatches_y: u32,
    pub swatch_width: u32,
    pub swatch_height: u32,
}

impl SwatchLayout {
    pub fn new(count: usize, dimension: u32) -> Result<Self> {
        if count == 0 {
            return Err(ThumbnailError::EmptyPalette);
        }

        let columns = count.isqrt();
        let rows = count.div_ceil(columns);
        // Both are at most `count`, and a grid wider than u32::MAX has no pixels anyway.
        let swatches_x = u32::try_from(columns).unwrap_or(u32::MAX);
        let swatches_y = u32::try_from(rows).unwrap_or(u32::MAX);

        let swatch_width = dimension / swatches_x;
        let swatch_height = dimension / swatches_y;
        if swatch_width == 0 || swatch_height == 0 {
            return Err(ThumbnailError::DimensionTooSmall {
                dimension,
                swatches_x,
                swatches_y,
            });
        }

        Ok(Self {
            count,
            swatches_x,
            swatches_y,
            swatch_width,
            swatch_height,
        })
    }

    /// Realized image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.swatches_x * self.swatch_width
    }

    /// Realized image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.swatches_y * self.swatch_height
    }

    /// Grid cell `(column, row)` of palette entry `index`.
    #[inline]
    pub fn cell_of(&self, index: usize) -> (u32, u32) {
        let columns = self.swatches_x as usize;
        ((index % columns) as u32, (index / columns) as u32)
    }

    /// Palette entry shown in cell `(column, row)`, if any.
    ///
    /// Only the trailing cells of the last row can be empty.
    #[inline]
    pub fn index_at(&self, column: u32, row: u32) -> Option<usize> {
        if column >= self.swatches_x {
            return None;
        }
        let index = row as usize * self.swatches_x as usize + column as usize;
        (index < self.count).then_some(index)
    }

    /// Palette entry covering pixel `(x, y)`, if any.
    pub fn index_at_pixel(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.index_at(x / self.swatch_width, y / self.swatch_height)
    }
}
