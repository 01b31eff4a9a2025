// src/palette.rs

//! Palettes and the JASC-PAL text format.
//!
//! A JASC-PAL file looks like this, with CRLF line endings:
//!
//! ```text
//! JASC-PAL
//! 0100
//! 2
//! 255 0 0
//! 0 0 255
//! ```

use crate::utils::error::{Result, ThumbnailError};
use bytemuck::{Pod, Zeroable};
use log::debug;
use std::fmt::Write as _;
use std::io::{BufRead, Read};
use std::str::FromStr;

/// First line of every JASC-PAL file.
pub const JASC_MAGIC: &str = "JASC-PAL";
/// The only JASC-PAL version in use.
pub const JASC_VERSION: &str = "0100";
/// An 8-bit indexed PNG cannot address more entries than this.
pub const MAX_PALETTE_LEN: usize = 256;

/// One palette entry. Laid out as three bytes so a palette slice is
/// exactly a `PLTE` payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self { red, green, blue }
    }
}

/// An ordered list of colours; the position of a colour is its index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    /// Consecutive RGB triples, ready to be used as a `PLTE` payload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Reads a JASC-PAL palette from `reader`.
    pub fn from_jasc_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse_jasc(&text)
    }

    /// Parses JASC-PAL text. Both CRLF and LF line endings are accepted, and
    /// anything after the last declared colour is ignored.
    pub fn parse_jasc(text: &str) -> Result<Self> {
        let eof_line = text.lines().count() + 1;
        let mut lines = text.lines().map(str::trim).enumerate();

        let (line, magic) = next_line(&mut lines, eof_line, "header")?;
        if magic != JASC_MAGIC {
            return Err(parse_error(line, format!("expected '{}', found '{}'", JASC_MAGIC, magic)));
        }

        let (line, version) = next_line(&mut lines, eof_line, "version")?;
        if version != JASC_VERSION {
            return Err(parse_error(line, format!("unsupported version '{}'", version)));
        }

        let (line, count) = next_line(&mut lines, eof_line, "color count")?;
        let count: usize = count
            .parse()
            .map_err(|_| parse_error(line, format!("invalid color count '{}'", count)))?;

        let mut colors = Vec::with_capacity(count.min(MAX_PALETTE_LEN));
        for _ in 0..count {
            let (line, entry) = next_line(&mut lines, eof_line, "color entry")?;
            colors.push(parse_color(line, entry)?);
        }

        debug!("parsed JASC-PAL palette with {} colors", colors.len());
        Ok(Self { colors })
    }

    /// Formats the palette as JASC-PAL text with CRLF line endings.
    pub fn to_jasc(&self) -> String {
        let mut text = format!("{}\r\n{}\r\n{}\r\n", JASC_MAGIC, JASC_VERSION, self.len());
        for color in &self.colors {
            // Writing into a String cannot fail.
            let _ = write!(text, "{} {} {}\r\n", color.red, color.green, color.blue);
        }
        text
    }
}

impl FromStr for Palette {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_jasc(s)
    }
}

impl From<Vec<Rgb>> for Palette {
    fn from(colors: Vec<Rgb>) -> Self {
        Self::new(colors)
    }
}

fn next_line<'a, I>(lines: &mut I, eof_line: usize, what: &str) -> Result<(usize, &'a str)>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    match lines.next() {
        Some((index, line)) => Ok((index + 1, line)),
        None => Err(ThumbnailError::Parse {
            line: eof_line,
            message: format!("unexpected end of input, expected {}", what),
        }),
    }
}

fn parse_error(line: usize, message: String) -> ThumbnailError {
    ThumbnailError::Parse { line, message }
}

fn parse_color(line: usize, entry: &str) -> Result<Rgb> {
    let mut components = [0u8; 3];
    let mut fields = entry.split_whitespace();
    for component in &mut components {
        let field = fields
            .next()
            .ok_or_else(|| parse_error(line, format!("expected three values, found '{}'", entry)))?;
        *component = field
            .parse()
            .map_err(|_| parse_error(line, format!("'{}' is not a value in 0..=255", field)))?;
    }
    if fields.next().is_some() {
        return Err(parse_error(line, format!("expected three values, found '{}'", entry)));
    }
    Ok(Rgb::from(components))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "JASC-PAL\r\n0100\r\n3\r\n255 0 0\r\n0 255 0\r\n0 0 255\r\n";

    #[test]
    fn test_parse_crlf() {
        let palette = Palette::parse_jasc(SAMPLE).unwrap();
        assert_eq!(
            palette.colors(),
            &[Rgb::new(255, 0, 0), Rgb::new(0, 255, 0), Rgb::new(0, 0, 255)]
        );
    }

    #[test]
    fn test_parse_lf_and_trailing_content() {
        let text = "JASC-PAL\n0100\n1\n1 2 3\nextra line\n";
        let palette: Palette = text.parse().unwrap();
        assert_eq!(palette.colors(), &[Rgb::new(1, 2, 3)]);
    }

    #[test]
    fn test_as_bytes_is_plte_payload() {
        let palette = Palette::parse_jasc(SAMPLE).unwrap();
        assert_eq!(palette.as_bytes(), &[255, 0, 0, 0, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn test_to_jasc_round_trip() {
        let palette = Palette::parse_jasc(SAMPLE).unwrap();
        assert_eq!(palette.to_jasc(), SAMPLE);
    }

    #[test]
    fn test_reader() {
        let palette = Palette::from_jasc_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(palette.get(2), Some(Rgb::new(0, 0, 255)));
        assert_eq!(palette.get(3), None);
    }

    #[test]
    fn test_bad_magic() {
        let err = Palette::parse_jasc("RIFF\r\n0100\r\n0\r\n").unwrap_err();
        assert!(matches!(err, ThumbnailError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_bad_version() {
        let err = Palette::parse_jasc("JASC-PAL\r\n0200\r\n0\r\n").unwrap_err();
        assert!(matches!(err, ThumbnailError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_bad_count() {
        let err = Palette::parse_jasc("JASC-PAL\r\n0100\r\nmany\r\n").unwrap_err();
        assert!(matches!(err, ThumbnailError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_missing_entries() {
        let err = Palette::parse_jasc("JASC-PAL\r\n0100\r\n2\r\n1 2 3\r\n").unwrap_err();
        assert!(matches!(err, ThumbnailError::Parse { line: 5, .. }));
    }

    #[test]
    fn test_bad_entries() {
        for entry in ["1 2", "1 2 3 4", "256 0 0", "-1 0 0", "a b c"] {
            let text = format!("JASC-PAL\r\n0100\r\n1\r\n{}\r\n", entry);
            let err = Palette::parse_jasc(&text).unwrap_err();
            assert!(matches!(err, ThumbnailError::Parse { line: 4, .. }), "{}", entry);
        }
    }

    #[test]
    fn test_empty_palette_parses() {
        let palette = Palette::parse_jasc("JASC-PAL\r\n0100\r\n0\r\n").unwrap();
        assert!(palette.is_empty());
    }
}
