use crate::bytecode::lang::EncodeError;
use crate::Char;

/// Error returned when a font cannot be compiled.
///
/// Every error is a deterministic consequence of the input font,
///     so none of them is worth retrying.
/// When an error is returned no output is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The font height is zero.
    #[error("invalid font height {0}: the height must be at least 1 pixel")]
    InvalidHeight(u8),

    /// A glyph has a width of zero pixels.
    #[error("the glyph for {code} has zero width")]
    ZeroWidth { code: Char },

    /// A glyph's segment count is not `rows * width`.
    #[error("the glyph for {code} has {got} segments but {expected} were expected")]
    SegmentCountMismatch {
        code: Char,
        expected: usize,
        got: usize,
    },

    /// Two glyphs were defined for the same character code.
    #[error("duplicate character code: {0}")]
    DuplicateCode(Char),

    /// The font contains no glyphs, so there is no character range to lay out.
    #[error("the font contains no glyphs")]
    EmptyFont,

    /// More distinct literal segments survived compression than the load instruction can address.
    #[error("the segment table needs {distinct} entries but at most {max} can be addressed", max = crate::segtable::MAX_LEN)]
    SegmentTableOverflow { distinct: usize },

    /// A load instruction references a segment value that is not in the segment table.
    #[error("the glyph for {code} loads segment 0x{value:02x} which is not in the segment table")]
    SegmentNotInTable { code: Char, value: u8 },

    /// An instruction could not be encoded into its family's opcode range.
    #[error("instruction {position} of the glyph for {code} cannot be encoded: {error}")]
    EncodingRangeViolation {
        code: Char,
        position: usize,
        error: EncodeError,
    },

    /// The glyph programs are too large to be addressed by 16-bit char table entries.
    #[error("the glyph data is {size} bytes long; offsets beyond 0x{max:04x} cannot be addressed", max = crate::format::GLYPH_OFFSET_ABSENT - 1)]
    ProgramTooLarge { size: usize },
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The font handed to the compiler breaks its own structural rules.
    IngestionContractViolation,
    /// The font needs more distinct literal segments than the segment table can hold.
    SegmentTableOverflow,
    /// An instruction's operand does not fit its opcode range.
    EncodingRangeViolation,
    /// The compiled output does not fit the decoder's address space.
    LayoutOverflow,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            InvalidHeight(_)
            | ZeroWidth { .. }
            | SegmentCountMismatch { .. }
            | DuplicateCode(_)
            | EmptyFont => ErrorKind::IngestionContractViolation,
            SegmentTableOverflow { .. } => ErrorKind::SegmentTableOverflow,
            SegmentNotInTable { .. } | EncodingRangeViolation { .. } => {
                ErrorKind::EncodingRangeViolation
            }
            ProgramTooLarge { .. } => ErrorKind::LayoutOverflow,
        }
    }
}
