//! The glyph bytecode.
//!
//! A glyph program reconstructs a glyph's segments one instruction at a time.
//! The decoder keeps a single byte of state, the *last segment*,
//!     which starts at zero and always holds the most recently output segment.
//! Shift, repeat and XOR instructions derive new segments from it,
//!     copy instructions replay a short window of already output segments,
//!     and load instructions fetch a segment from the font-wide segment table.
//!
//! Every glyph program starts with a raw header byte holding the glyph's width in pixels.
//! The header is not an instruction and is not subject to the opcode partition.

use crate::Char;

pub mod compiler;
pub mod lang;

use lang::Instruction;

/// The program for a single glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphProgram {
    pub code: Char,
    /// Width of the glyph in pixels. This is output as the header byte.
    pub width: u8,
    pub instructions: Vec<Instruction>,
}

impl GlyphProgram {
    /// Number of bytes in the encoded program, including the header.
    pub fn encoded_len(&self) -> usize {
        1 + self.instructions.len()
    }

    /// Number of segments the program outputs.
    pub fn num_segments(&self) -> usize {
        self.instructions.iter().map(Instruction::size).sum()
    }

    /// Appends the header byte and the encoded instructions to the buffer.
    ///
    /// Load instructions must already carry segment table indices.
    /// On error the buffer is left untouched.
    pub fn encode(&self, b: &mut Vec<u8>) -> Result<(), crate::Error> {
        let mut encoded = Vec::with_capacity(self.encoded_len());
        encoded.push(self.width);
        for (position, instruction) in self.instructions.iter().enumerate() {
            let byte = instruction
                .encode()
                .map_err(|error| crate::Error::EncodingRangeViolation {
                    code: self.code,
                    position,
                    error,
                })?;
            encoded.push(byte);
        }
        b.extend(encoded);
        Ok(())
    }

    /// Returns the mnemonics of the program's instructions separated by spaces.
    pub fn mnemonics(&self) -> String {
        let mut s = String::new();
        for instruction in &self.instructions {
            if !s.is_empty() {
                s.push(' ');
            }
            s.push_str(instruction.family().mnemonic());
        }
        s
    }
}

/// Error returned when the virtual machine can't run an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    /// A load instruction's operand could not be resolved to a segment.
    #[error("segment table index {0} is out of range")]
    SegmentIndexOutOfRange(u8),
    /// A copy instruction reaches before the start of the glyph.
    #[error("copy with offset {offset} and length {length} reaches before the start of the glyph ({available} segments output so far)")]
    CopyUnderflow {
        offset: u8,
        length: u8,
        available: usize,
    },
}

/// Reference implementation of the decoder's virtual machine.
///
/// Used to check that compiled programs reproduce their glyphs.
#[derive(Debug, Default, Clone)]
pub struct Machine {
    segments: Vec<u8>,
    last: u8,
}

impl Machine {
    pub fn new() -> Machine {
        Default::default()
    }

    /// The segments output so far.
    pub fn segments(&self) -> &[u8] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<u8> {
        self.segments
    }

    pub fn last(&self) -> u8 {
        self.last
    }

    /// Runs a single instruction.
    ///
    /// The `load` closure maps the operand of a load instruction to a segment value.
    pub fn step<F>(&mut self, instruction: Instruction, load: F) -> Result<(), MachineError>
    where
        F: FnOnce(u8) -> Option<u8>,
    {
        match instruction {
            Instruction::Load(operand) => {
                let segment = load(operand).ok_or(MachineError::SegmentIndexOutOfRange(operand))?;
                self.push(segment);
            }
            Instruction::Shift {
                direction,
                fill,
                step,
                length,
            } => {
                for _ in 0..length {
                    self.push(lang::shift_segment(self.last, direction, fill, step));
                }
            }
            Instruction::Copy { offset, length } => {
                let n = self.segments.len();
                let start = n
                    .checked_sub(offset as usize + length as usize)
                    .ok_or(MachineError::CopyUnderflow {
                        offset,
                        length,
                        available: n,
                    })?;
                for i in start..start + length as usize {
                    self.push(self.segments[i]);
                }
            }
            Instruction::Repeat(length) => {
                for _ in 0..length {
                    self.push(self.last);
                }
            }
            Instruction::Xor { width, position } => {
                self.push(self.last ^ lang::xor_mask(width, position));
            }
        }
        Ok(())
    }

    fn push(&mut self, segment: u8) {
        self.segments.push(segment);
        self.last = segment;
    }
}

/// Runs a whole instruction list from a fresh machine and returns the output segments.
pub fn execute<F>(instructions: &[Instruction], load: F) -> Result<Vec<u8>, MachineError>
where
    F: Fn(u8) -> Option<u8>,
{
    let mut machine = Machine::new();
    for instruction in instructions {
        machine.step(*instruction, &load)?;
    }
    Ok(machine.into_segments())
}
