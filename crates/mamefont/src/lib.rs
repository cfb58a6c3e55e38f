//! Compiler for the MameFont glyph bytecode format.
//!
//! MameFont is a compact representation of pixel-art fonts designed to be decoded by
//!     a tiny virtual machine on 8-bit microcontrollers.
//! A glyph is cut into horizontal bands of 8 pixel rows,
//!     and each column of a band is stored as one byte called a *segment*.
//! Rather than storing segments verbatim,
//!     each glyph is stored as a short program in a one-byte-per-instruction bytecode
//!     (see the [`bytecode`] module) that reconstructs its segments.
//!
//! Compiling a font happens in three passes:
//!
//! 1. Each glyph is compressed independently into a list of instructions ([`bytecode::compiler`]).
//! 1. The literal segment values referenced by load instructions across the whole font
//!     are deduplicated and ranked by usage into a shared segment table ([`segtable`]).
//! 1. The instruction streams are encoded and laid out together with a character table
//!     mapping character codes to program offsets ([`format`]).
//!
//! The [`algorithms::compile`] function runs all three passes.

use std::collections::BTreeMap;

pub mod algorithms;
pub mod bytecode;
mod error;
pub mod format;
pub mod report;
pub mod segtable;

pub use error::Error;
pub use error::ErrorKind;

/// Number of pixel rows in a segment.
pub const SEGMENT_HEIGHT: u8 = 8;

/// A character code.
///
/// The embedded decoder addresses glyphs with 1-byte character codes.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Char(pub u8);

impl From<u8> for Char {
    fn from(value: u8) -> Self {
        Char(value)
    }
}

impl TryFrom<char> for Char {
    type Error = std::char::TryFromCharError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let u: u8 = value.try_into()?;
        Ok(Char(u))
    }
}

impl std::fmt::Display for Char {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if (0x20..=0x7E).contains(&self.0) {
            write!(f, "'{}' (0x{:x})", self.0 as char, self.0)
        } else {
            write!(f, "\\x{:02x}", self.0)
        }
    }
}

/// A single glyph: its pixel width and its segments.
///
/// Segments are laid out band-major:
///     all segments of the topmost band from left to right,
///     then all segments of the next band,
///     and so on.
/// Bit 7 of a segment is the topmost pixel of its band.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glyph {
    pub width: u8,
    pub segments: Vec<u8>,
}

impl Glyph {
    pub fn new(width: u8, segments: Vec<u8>) -> Glyph {
        Glyph { width, segments }
    }
}

/// A bitmap font ready to be compiled.
///
/// Glyphs are validated when they are inserted,
///     so every glyph in a font has exactly `rows() * width` segments
///     and every character code appears at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "serde_impl::FontData", into = "serde_impl::FontData")
)]
pub struct Font {
    height: u8,
    glyphs: BTreeMap<Char, Glyph>,
}

impl Font {
    /// Creates an empty font with the given pixel height.
    pub fn new(height: u8) -> Result<Font, Error> {
        if height == 0 {
            return Err(Error::InvalidHeight(height));
        }
        Ok(Font {
            height,
            glyphs: Default::default(),
        })
    }

    /// Height of the font in pixels.
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of 8-pixel bands in each glyph.
    pub fn rows(&self) -> usize {
        (self.height as usize).div_ceil(SEGMENT_HEIGHT as usize)
    }

    /// Adds a glyph to the font.
    pub fn insert(&mut self, code: Char, glyph: Glyph) -> Result<(), Error> {
        if glyph.width == 0 {
            return Err(Error::ZeroWidth { code });
        }
        let expected = self.rows() * glyph.width as usize;
        if glyph.segments.len() != expected {
            return Err(Error::SegmentCountMismatch {
                code,
                expected,
                got: glyph.segments.len(),
            });
        }
        use std::collections::btree_map::Entry;
        match self.glyphs.entry(code) {
            Entry::Occupied(_) => Err(Error::DuplicateCode(code)),
            Entry::Vacant(v) => {
                v.insert(glyph);
                Ok(())
            }
        }
    }

    pub fn get(&self, code: Char) -> Option<&Glyph> {
        self.glyphs.get(&code)
    }

    /// Iterates over the glyphs in ascending character code order.
    pub fn glyphs(&self) -> impl Iterator<Item = (Char, &Glyph)> {
        self.glyphs.iter().map(|(c, g)| (*c, g))
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// The smallest and largest character codes in the font, or [None] if the font is empty.
    pub fn code_range(&self) -> Option<(Char, Char)> {
        let first = self.glyphs.keys().next()?;
        let last = self.glyphs.keys().next_back()?;
        Some((*first, *last))
    }

    /// Tallies how many times each segment value appears across all glyphs.
    ///
    /// Values are returned in order of first appearance.
    pub fn segment_usage(&self) -> Vec<(u8, usize)> {
        let mut usage: Vec<(u8, usize)> = vec![];
        let mut slot: [Option<usize>; 256] = [None; 256];
        for (_, glyph) in self.glyphs() {
            for &segment in &glyph.segments {
                match slot[segment as usize] {
                    Some(i) => usage[i].1 += 1,
                    None => {
                        slot[segment as usize] = Some(usage.len());
                        usage.push((segment, 1));
                    }
                }
            }
        }
        usage
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;

    #[derive(serde::Serialize, serde::Deserialize)]
    pub struct FontData {
        height: u8,
        glyphs: Vec<GlyphData>,
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct GlyphData {
        code: Char,
        width: u8,
        segments: Vec<u8>,
    }

    impl TryFrom<FontData> for Font {
        type Error = Error;

        fn try_from(value: FontData) -> Result<Self, Self::Error> {
            let mut font = Font::new(value.height)?;
            for glyph in value.glyphs {
                font.insert(glyph.code, Glyph::new(glyph.width, glyph.segments))?;
            }
            Ok(font)
        }
    }

    impl From<Font> for FontData {
        fn from(value: Font) -> Self {
            FontData {
                height: value.height,
                glyphs: value
                    .glyphs
                    .into_iter()
                    .map(|(code, glyph)| GlyphData {
                        code,
                        width: glyph.width,
                        segments: glyph.segments,
                    })
                    .collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows() {
        for (height, want) in [(1, 1), (7, 1), (8, 1), (9, 2), (16, 2), (17, 3)] {
            let font = Font::new(height).unwrap();
            assert_eq!(font.rows(), want, "height={height}");
        }
    }

    #[test]
    fn zero_height() {
        assert_eq!(Font::new(0), Err(Error::InvalidHeight(0)));
    }

    #[test]
    fn insert_wrong_segment_count() {
        let mut font = Font::new(12).unwrap();
        let got = font.insert(Char::from(b'A'), Glyph::new(3, vec![0; 3]));
        assert_eq!(
            got,
            Err(Error::SegmentCountMismatch {
                code: Char(b'A'),
                expected: 6,
                got: 3
            })
        );
        assert!(font.is_empty());
    }

    #[test]
    fn insert_zero_width() {
        let mut font = Font::new(8).unwrap();
        let got = font.insert(Char(b'A'), Glyph::new(0, vec![]));
        assert_eq!(got, Err(Error::ZeroWidth { code: Char(b'A') }));
    }

    #[test]
    fn insert_duplicate() {
        let mut font = Font::new(8).unwrap();
        font.insert(Char(b'A'), Glyph::new(1, vec![1])).unwrap();
        let got = font.insert(Char(b'A'), Glyph::new(1, vec![2]));
        assert_eq!(got, Err(Error::DuplicateCode(Char(b'A'))));
        assert_eq!(font.get(Char(b'A')), Some(&Glyph::new(1, vec![1])));
    }

    #[test]
    fn code_range() {
        let mut font = Font::new(8).unwrap();
        assert_eq!(font.code_range(), None);
        font.insert(Char(b'z'), Glyph::new(1, vec![1])).unwrap();
        font.insert(Char(b'!'), Glyph::new(1, vec![1])).unwrap();
        font.insert(Char(b'M'), Glyph::new(1, vec![1])).unwrap();
        assert_eq!(font.code_range(), Some((Char(b'!'), Char(b'z'))));
        let codes: Vec<Char> = font.glyphs().map(|(c, _)| c).collect();
        assert_eq!(codes, vec![Char(b'!'), Char(b'M'), Char(b'z')]);
    }

    #[test]
    fn segment_usage() {
        let mut font = Font::new(8).unwrap();
        font.insert(Char(1), Glyph::new(3, vec![5, 7, 5])).unwrap();
        font.insert(Char(0), Glyph::new(2, vec![7, 9])).unwrap();
        assert_eq!(font.segment_usage(), vec![(7, 2), (9, 1), (5, 2)]);
    }

    #[test]
    fn char_display() {
        assert_eq!(format!["{}", Char(b'A')], "'A' (0x41)");
        assert_eq!(format!["{}", Char(0x1f)], "\\x1f");
        assert_eq!(format!["{}", Char(0x7f)], "\\x7f");
    }
}
