//! Algorithms that run the whole compiler: compilation and verification.

use crate::bytecode::{compiler, GlyphProgram};
use crate::format::{self, DecodeError, File};
use crate::segtable::SegmentTable;
use crate::{Char, Error, Font};

/// Output of [`compile`].
///
/// Besides the compiled font this keeps the intermediate results,
///     which are used for diagnostics.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub file: File,
    /// Glyph programs straight out of the compressor, with literal load values.
    pub programs: Vec<GlyphProgram>,
    pub segment_table: SegmentTable,
}

/// Compiles a font.
///
/// Either the whole font compiles or an error is returned; there is no partial output.
pub fn compile(font: &Font) -> Result<Compilation, Error> {
    if font.is_empty() {
        return Err(Error::EmptyFont);
    }

    log::info!("Compressing...");
    let programs: Vec<GlyphProgram> = font
        .glyphs()
        .map(|(code, glyph)| compiler::compile(code, glyph))
        .collect();

    log::info!("Generating segment table...");
    let segment_table = SegmentTable::build(&programs)?;
    log::info!("    {} distinct segments", segment_table.len());

    log::info!("Generating glyph data...");
    let resolved = programs
        .iter()
        .map(|program| segment_table.resolve(program))
        .collect::<Result<Vec<GlyphProgram>, Error>>()?;
    let file = format::assemble(font.height(), &resolved, &segment_table)?;
    log::info!(
        "    {} glyphs, {} bytes of glyph data, {} bytes total",
        font.len(),
        file.glyph_data.len(),
        file.size()
    );

    Ok(Compilation {
        file,
        programs,
        segment_table,
    })
}

/// A glyph that didn't survive the round trip through the compiled font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// The glyph could not be decoded.
    Decode(DecodeError),
    /// The glyph was decoded but its width differs from the source.
    WidthMismatch { code: Char, want: u8, got: u8 },
    /// The glyph was decoded but some segments differ from the source.
    SegmentMismatch {
        code: Char,
        /// Index of the first differing segment.
        index: usize,
        want: u8,
        got: u8,
    },
    /// The compiled font has a glyph that the source font doesn't.
    UnexpectedGlyph(Char),
}

impl std::fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use VerificationFailure::*;
        match self {
            Decode(err) => write!(f, "{err}"),
            WidthMismatch { code, want, got } => {
                write!(f, "the glyph for {code} has width {got} but {want} was expected")
            }
            SegmentMismatch {
                code,
                index,
                want,
                got,
            } => write!(
                f,
                "segment {index} of the glyph for {code} is 0x{got:02x} but 0x{want:02x} was expected"
            ),
            UnexpectedGlyph(code) => {
                write!(f, "the compiled font has a glyph for {code} but the source font doesn't")
            }
        }
    }
}

/// Decodes every glyph in a compiled font and compares it against the source font.
///
/// An empty result means the compiled font reproduces the source exactly.
pub fn verify(font: &Font, file: &File) -> Vec<VerificationFailure> {
    let mut failures = vec![];
    for code in (0..=u8::MAX).map(Char) {
        let source = font.get(code);
        let decoded = file
            .glyph_width(code)
            .and_then(|width| Ok((width, file.decode_glyph(code)?)));
        match (source, decoded) {
            (None, Err(DecodeError::GlyphNotDefined(_) | DecodeError::CharCodeOutOfRange(_))) => {}
            (None, Err(err)) => failures.push(VerificationFailure::Decode(err)),
            (None, Ok(_)) => failures.push(VerificationFailure::UnexpectedGlyph(code)),
            (Some(_), Err(err)) => failures.push(VerificationFailure::Decode(err)),
            (Some(glyph), Ok((width, segments))) => {
                if width != glyph.width {
                    failures.push(VerificationFailure::WidthMismatch {
                        code,
                        want: glyph.width,
                        got: width,
                    });
                    continue;
                }
                if let Some(index) = glyph
                    .segments
                    .iter()
                    .zip(&segments)
                    .position(|(want, got)| want != got)
                {
                    failures.push(VerificationFailure::SegmentMismatch {
                        code,
                        index,
                        want: glyph.segments[index],
                        got: segments[index],
                    });
                }
            }
        }
    }
    failures
}
