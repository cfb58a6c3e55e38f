//! The compiled MameFont format.
//!
//! A compiled font consists of a 4-byte descriptor and three arrays:
//!
//! - The *char table* has one 16-bit entry per character code in `[min_code, max_code]`.
//!     Each entry is the offset of that character's glyph program in the glyph data,
//!     or [`GLYPH_OFFSET_ABSENT`] if the font has no glyph for the code.
//! - The *segment table* holds the segment values referenced by load instructions
//!     (see [`crate::segtable`]).
//! - The *glyph data* is the concatenation of all glyph programs in character code order.
//!     Each program is a width byte followed by instructions (see [`crate::bytecode`]).
//!
//! The descriptor holds the font height, the number of char table entries,
//!     the smallest character code, and a flags byte that is currently always zero.

mod assemble;
pub mod cpp;

pub use assemble::assemble;

use crate::bytecode::{lang::Instruction, Machine, MachineError};
use crate::{Char, SEGMENT_HEIGHT};

/// Char table entry for character codes that have no glyph.
pub const GLYPH_OFFSET_ABSENT: u16 = 0xFFFF;

/// Size in bytes of the font descriptor.
pub const FONT_HEADER_SIZE: usize = 4;

/// Size in bytes of a char table entry.
pub const CHAR_TABLE_ENTRY_SIZE: usize = 2;

/// Byte order used when serializing char table entries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// A compiled font.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct File {
    /// Height of the font in pixels.
    pub height: u8,
    /// Character code of the first char table entry.
    pub min_code: Char,
    /// Reserved. Always zero.
    pub flags: u8,
    pub char_table: Vec<u16>,
    pub segment_table: Vec<u8>,
    pub glyph_data: Vec<u8>,
}

/// Error returned when a glyph can't be decoded from a compiled font.
///
/// These mirror the status codes of the embedded decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("character code {0} is outside the font's range")]
    CharCodeOutOfRange(Char),
    #[error("the font has no glyph for {0}")]
    GlyphNotDefined(Char),
    #[error("the char table entry for {code} points to offset {offset} beyond the glyph data")]
    InvalidGlyphOffset { code: Char, offset: usize },
    #[error("unknown opcode 0x{byte:02x} at glyph data offset {offset}")]
    UnknownOpcode { offset: usize, byte: u8 },
    #[error("the program for {0} ends before its glyph is complete")]
    TruncatedProgram(Char),
    #[error("the program for {code} outputs {got} segments but the glyph has {expected}")]
    Overrun {
        code: Char,
        expected: usize,
        got: usize,
    },
    #[error("error running the program for {code}: {error}")]
    Machine { code: Char, error: MachineError },
}

impl File {
    /// Number of 8-pixel bands in each glyph.
    pub fn rows(&self) -> usize {
        (self.height as usize).div_ceil(SEGMENT_HEIGHT as usize)
    }

    /// Number of entries in the char table.
    pub fn num_chars(&self) -> usize {
        self.char_table.len()
    }

    /// Largest character code covered by the char table.
    pub fn max_code(&self) -> Char {
        Char((self.min_code.0 as usize + self.char_table.len().saturating_sub(1)) as u8)
    }

    /// Total size of the compiled font in bytes.
    pub fn size(&self) -> usize {
        FONT_HEADER_SIZE
            + self.char_table.len() * CHAR_TABLE_ENTRY_SIZE
            + self.segment_table.len()
            + self.glyph_data.len()
    }

    /// Returns the 4-byte font descriptor.
    ///
    /// The embedded decoder stores the number of characters in a single byte,
    ///     so a font covering all 256 codes reports 0 here.
    pub fn descriptor(&self) -> [u8; FONT_HEADER_SIZE] {
        [
            self.height,
            self.char_table.len() as u8,
            self.min_code.0,
            self.flags,
        ]
    }

    /// Serializes the char table.
    pub fn char_table_bytes(&self, endianness: Endianness) -> Vec<u8> {
        let mut b = Vec::with_capacity(self.char_table.len() * CHAR_TABLE_ENTRY_SIZE);
        for entry in &self.char_table {
            match endianness {
                Endianness::Little => b.extend(entry.to_le_bytes()),
                Endianness::Big => b.extend(entry.to_be_bytes()),
            }
        }
        b
    }

    /// Returns the offset of a glyph's program in the glyph data.
    pub fn glyph_offset(&self, code: Char) -> Result<usize, DecodeError> {
        let entry = code
            .0
            .checked_sub(self.min_code.0)
            .and_then(|i| self.char_table.get(i as usize))
            .ok_or(DecodeError::CharCodeOutOfRange(code))?;
        if *entry == GLYPH_OFFSET_ABSENT {
            return Err(DecodeError::GlyphNotDefined(code));
        }
        let offset = *entry as usize;
        if offset >= self.glyph_data.len() {
            return Err(DecodeError::InvalidGlyphOffset { code, offset });
        }
        Ok(offset)
    }

    /// Returns the width of a glyph in pixels.
    pub fn glyph_width(&self, code: Char) -> Result<u8, DecodeError> {
        let offset = self.glyph_offset(code)?;
        Ok(self.glyph_data[offset])
    }

    /// Width of the widest glyph in the font.
    pub fn max_width(&self) -> u8 {
        self.char_table
            .iter()
            .filter(|entry| **entry != GLYPH_OFFSET_ABSENT)
            .filter_map(|entry| self.glyph_data.get(*entry as usize))
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Decodes the program for a glyph and returns its instructions.
    ///
    /// Load instructions in the result carry segment table indices.
    pub fn glyph_instructions(&self, code: Char) -> Result<Vec<Instruction>, DecodeError> {
        let mut instructions = vec![];
        self.run(code, |instruction| instructions.push(instruction))?;
        Ok(instructions)
    }

    /// Decodes a glyph and returns its segments.
    pub fn decode_glyph(&self, code: Char) -> Result<Vec<u8>, DecodeError> {
        self.run(code, |_| {})
    }

    fn run<F: FnMut(Instruction)>(&self, code: Char, mut visit: F) -> Result<Vec<u8>, DecodeError> {
        let offset = self.glyph_offset(code)?;
        let width = self.glyph_data[offset];
        let expected = width as usize * self.rows();
        let mut machine = Machine::new();
        let mut read = offset + 1;
        while machine.segments().len() < expected {
            let byte = *self
                .glyph_data
                .get(read)
                .ok_or(DecodeError::TruncatedProgram(code))?;
            let instruction = Instruction::decode(byte)
                .map_err(|_| DecodeError::UnknownOpcode { offset: read, byte })?;
            visit(instruction);
            machine
                .step(instruction, |index| self.segment_table.get(index as usize).copied())
                .map_err(|error| DecodeError::Machine { code, error })?;
            read += 1;
        }
        if machine.segments().len() != expected {
            return Err(DecodeError::Overrun {
                code,
                expected,
                got: machine.segments().len(),
            });
        }
        Ok(machine.into_segments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> File {
        File {
            height: 8,
            min_code: Char(b'A'),
            flags: 0,
            char_table: vec![0, GLYPH_OFFSET_ABSENT, 3],
            segment_table: vec![0x42, 0x18],
            // 'A': width 2, LD 0, RPT 1
            // 'C': width 3, LD 1, CPY ofst=0 len=1, XOR width=1 pos=0
            glyph_data: vec![2, 0x00, 0xE0, 3, 0x01, 0x80, 0xF0],
        }
    }

    #[test]
    fn decode() {
        let file = file();
        assert_eq!(file.decode_glyph(Char(b'A')), Ok(vec![0x42, 0x42]));
        assert_eq!(file.decode_glyph(Char(b'C')), Ok(vec![0x18, 0x18, 0x19]));
        assert_eq!(
            file.glyph_instructions(Char(b'A')),
            Ok(vec![Instruction::Load(0), Instruction::Repeat(1)])
        );
    }

    #[test]
    fn decode_missing() {
        let file = file();
        assert_eq!(
            file.decode_glyph(Char(b'B')),
            Err(DecodeError::GlyphNotDefined(Char(b'B')))
        );
        assert_eq!(
            file.decode_glyph(Char(b'@')),
            Err(DecodeError::CharCodeOutOfRange(Char(b'@')))
        );
        assert_eq!(
            file.decode_glyph(Char(b'D')),
            Err(DecodeError::CharCodeOutOfRange(Char(b'D')))
        );
    }

    #[test]
    fn decode_reserved_opcode() {
        let mut file = file();
        file.glyph_data[2] = 0xC5;
        assert_eq!(
            file.decode_glyph(Char(b'A')),
            Err(DecodeError::UnknownOpcode {
                offset: 2,
                byte: 0xC5
            })
        );
    }

    #[test]
    fn decode_truncated() {
        let mut file = file();
        file.glyph_data.pop();
        assert_eq!(
            file.decode_glyph(Char(b'C')),
            Err(DecodeError::TruncatedProgram(Char(b'C')))
        );
    }

    #[test]
    fn decode_overrun() {
        let mut file = file();
        file.glyph_data[2] = 0xE1;
        assert_eq!(
            file.decode_glyph(Char(b'A')),
            Err(DecodeError::Overrun {
                code: Char(b'A'),
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn metadata() {
        let file = file();
        assert_eq!(file.max_code(), Char(b'C'));
        assert_eq!(file.num_chars(), 3);
        assert_eq!(file.max_width(), 3);
        assert_eq!(file.glyph_width(Char(b'C')), Ok(3));
        assert_eq!(file.descriptor(), [8, 3, b'A', 0]);
        assert_eq!(file.size(), 4 + 6 + 2 + 7);
    }

    #[test]
    fn char_table_endianness() {
        let file = file();
        assert_eq!(
            file.char_table_bytes(Endianness::Little),
            vec![0, 0, 0xFF, 0xFF, 3, 0]
        );
        assert_eq!(
            file.char_table_bytes(Endianness::Big),
            vec![0, 0, 0xFF, 0xFF, 0, 3]
        );
    }
}
