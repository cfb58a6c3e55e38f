//! Types corresponding to the glyph bytecode instruction set.
//!
//! Every instruction is exactly one byte.
//! The 256 possible byte values are partitioned into contiguous ranges, one per [`Family`],
//!     and an instruction's byte is the base opcode of its family plus an offset
//!     computed from the instruction's parameters.
//! The partition is a contract with the embedded decoder and can't be changed independently of it.
//!
//! | Family                | Base   | Slots | Offset                            |
//! |-----------------------|--------|-------|-----------------------------------|
//! | [`Family::Load`]      | `0x00` | 64    | `index`                           |
//! | [`Family::ShiftLeftClear`] .. [`Family::ShiftRightSet`] | `0x40` .. `0x70` | 16 each | `(step - 1) * 8 + (length - 1)` |
//! | [`Family::Copy`]      | `0x80` | 64    | `offset * 16 + (length - 1)`      |
//! | [`Family::Reverse`]   | `0xC0` | 32    | reserved                          |
//! | [`Family::Repeat`]    | `0xE0` | 16    | `length - 1`                      |
//! | [`Family::Xor`]       | `0xF0` | 16    | `(width - 1) * 8 + position`      |

/// A range of opcodes sharing the same instruction semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// `LD`: load a segment from the segment table.
    Load,
    /// `SLC`: shift the last segment left, filling with zeros.
    ShiftLeftClear,
    /// `SLS`: shift the last segment left, filling with ones.
    ShiftLeftSet,
    /// `SRC`: shift the last segment right, filling with zeros.
    ShiftRightClear,
    /// `SRS`: shift the last segment right, filling with ones.
    ShiftRightSet,
    /// `CPY`: copy a run of previously output segments.
    Copy,
    /// `REV`: reserved opcode space.
    ///
    /// The compiler never emits these and the decoder rejects them.
    Reverse,
    /// `RPT`: repeat the last segment.
    Repeat,
    /// `XOR`: toggle one or two adjacent bits of the last segment.
    Xor,
}

impl Family {
    /// All families in opcode order.
    pub const ALL: [Family; 9] = [
        Family::Load,
        Family::ShiftLeftClear,
        Family::ShiftLeftSet,
        Family::ShiftRightClear,
        Family::ShiftRightSet,
        Family::Copy,
        Family::Reverse,
        Family::Repeat,
        Family::Xor,
    ];

    /// First opcode of the family.
    pub fn base(self) -> u8 {
        use Family::*;
        match self {
            Load => 0x00,
            ShiftLeftClear => 0x40,
            ShiftLeftSet => 0x50,
            ShiftRightClear => 0x60,
            ShiftRightSet => 0x70,
            Copy => 0x80,
            Reverse => 0xC0,
            Repeat => 0xE0,
            Xor => 0xF0,
        }
    }

    /// Number of opcodes owned by the family.
    pub fn slots(self) -> u8 {
        use Family::*;
        match self {
            Load | Copy => 64,
            Reverse => 32,
            ShiftLeftClear | ShiftLeftSet | ShiftRightClear | ShiftRightSet | Repeat | Xor => 16,
        }
    }

    /// Returns the family that owns an opcode.
    pub fn of_opcode(byte: u8) -> Family {
        use Family::*;
        match byte {
            0x00..=0x3F => Load,
            0x40..=0x4F => ShiftLeftClear,
            0x50..=0x5F => ShiftLeftSet,
            0x60..=0x6F => ShiftRightClear,
            0x70..=0x7F => ShiftRightSet,
            0x80..=0xBF => Copy,
            0xC0..=0xDF => Reverse,
            0xE0..=0xEF => Repeat,
            0xF0..=0xFF => Xor,
        }
    }

    /// Tie-break priority between candidates that consume the same number of segments.
    ///
    /// Higher wins.
    /// Shift instructions with a step of 2 get one more than this value.
    pub fn priority(self) -> u8 {
        use Family::*;
        match self {
            Reverse => 1,
            Copy => 2,
            Load => 3,
            ShiftLeftClear | ShiftLeftSet | ShiftRightClear | ShiftRightSet => 4,
            Xor => 6,
            Repeat => 8,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        use Family::*;
        match self {
            Load => "LD",
            ShiftLeftClear => "SLC",
            ShiftLeftSet => "SLS",
            ShiftRightClear => "SRC",
            ShiftRightSet => "SRS",
            Copy => "CPY",
            Reverse => "REV",
            Repeat => "RPT",
            Xor => "XOR",
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Direction of a shift instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftDirection {
    Left,
    Right,
}

impl ShiftDirection {
    pub const ALL: [ShiftDirection; 2] = [ShiftDirection::Left, ShiftDirection::Right];
}

/// Largest run length of a shift instruction.
pub const MAX_SHIFT_LENGTH: u8 = 8;

/// Largest run length of a copy or repeat instruction.
pub const MAX_BLOCK_LENGTH: u8 = 16;

/// Largest back offset of a copy instruction.
pub const MAX_COPY_OFFSET: u8 = 3;

/// A single instruction in a glyph program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Output a segment and make it the last segment.
    ///
    /// Straight out of the compiler the payload is the literal segment value.
    /// After the segment table is built it is rewritten to the segment's index in the table
    ///     (see [`crate::segtable::SegmentTable::resolve`]).
    Load(u8),
    /// Shift the last segment `step` bits per output segment, `length` times,
    ///     outputting each intermediate result.
    Shift {
        direction: ShiftDirection,
        /// Value of the bits shifted in.
        fill: bool,
        /// Number of bits shifted per output segment: 1 or 2.
        step: u8,
        /// Number of segments output: 1 to 8.
        length: u8,
    },
    /// Copy `length` previously output segments.
    ///
    /// The source window ends `offset` segments before the current position,
    ///     so with an offset of 0 the window immediately precedes the current position.
    Copy {
        /// 0 to 3.
        offset: u8,
        /// 1 to 16.
        length: u8,
    },
    /// Output the last segment `length` times (1 to 16).
    Repeat(u8),
    /// Toggle `width` adjacent bits of the last segment starting at bit `position`, and output the result.
    Xor {
        /// 1 or 2.
        width: u8,
        /// 0 to `8 - width`.
        position: u8,
    },
}

/// Error returned when an instruction's parameters don't fit in its family's opcode range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{instruction} has opcode offset {offset} but the {family} family has {slots} slots")]
pub struct EncodeError {
    pub instruction: Instruction,
    pub family: Family,
    pub offset: i32,
    pub slots: u8,
}

impl Instruction {
    pub fn family(&self) -> Family {
        match *self {
            Instruction::Load(_) => Family::Load,
            Instruction::Shift {
                direction, fill, ..
            } => match (direction, fill) {
                (ShiftDirection::Left, false) => Family::ShiftLeftClear,
                (ShiftDirection::Left, true) => Family::ShiftLeftSet,
                (ShiftDirection::Right, false) => Family::ShiftRightClear,
                (ShiftDirection::Right, true) => Family::ShiftRightSet,
            },
            Instruction::Copy { .. } => Family::Copy,
            Instruction::Repeat(_) => Family::Repeat,
            Instruction::Xor { .. } => Family::Xor,
        }
    }

    /// Number of segments output by this instruction.
    pub fn size(&self) -> usize {
        match *self {
            Instruction::Load(_) | Instruction::Xor { .. } => 1,
            Instruction::Shift { length, .. }
            | Instruction::Copy { length, .. }
            | Instruction::Repeat(length) => length as usize,
        }
    }

    pub fn priority(&self) -> u8 {
        match *self {
            Instruction::Shift { step, .. } => self.family().priority() + step.saturating_sub(1),
            _ => self.family().priority(),
        }
    }

    /// Score used by the compiler to choose between candidates.
    ///
    /// Larger is better.
    /// The size dominates; the priority only breaks ties between candidates of the same size.
    pub fn score(&self) -> (usize, u8) {
        (self.size(), self.priority())
    }

    fn offset(&self) -> i32 {
        match *self {
            Instruction::Load(index) => index as i32,
            Instruction::Shift { step, length, .. } => (step as i32 - 1) * 8 + (length as i32 - 1),
            Instruction::Copy { offset, length } => offset as i32 * 16 + (length as i32 - 1),
            Instruction::Repeat(length) => length as i32 - 1,
            Instruction::Xor { width, position } => (width as i32 - 1) * 8 + position as i32,
        }
    }

    /// Encodes the instruction into its opcode.
    ///
    /// Load instructions must already carry a segment table index.
    /// An error is returned if the computed offset falls outside the family's range,
    ///     or if a parameter is outside its domain in a way that aliases another instruction.
    pub fn encode(&self) -> Result<u8, EncodeError> {
        let family = self.family();
        let offset = self.offset();
        let error = EncodeError {
            instruction: *self,
            family,
            offset,
            slots: family.slots(),
        };
        if !(0..family.slots() as i32).contains(&offset) {
            return Err(error);
        }
        let byte = family.base() + offset as u8;
        if Instruction::decode(byte) != Ok(*self) {
            return Err(error);
        }
        Ok(byte)
    }

    /// Decodes an opcode.
    ///
    /// Opcodes in the reserved range, and the unused `0xFF`, return their family as an error.
    pub fn decode(byte: u8) -> Result<Instruction, Family> {
        let family = Family::of_opcode(byte);
        let offset = byte - family.base();
        let shift = |direction, fill| Instruction::Shift {
            direction,
            fill,
            step: (offset >> 3) + 1,
            length: (offset & 0x07) + 1,
        };
        Ok(match family {
            Family::Load => Instruction::Load(offset),
            Family::ShiftLeftClear => shift(ShiftDirection::Left, false),
            Family::ShiftLeftSet => shift(ShiftDirection::Left, true),
            Family::ShiftRightClear => shift(ShiftDirection::Right, false),
            Family::ShiftRightSet => shift(ShiftDirection::Right, true),
            Family::Copy => Instruction::Copy {
                offset: offset >> 4,
                length: (offset & 0x0F) + 1,
            },
            Family::Reverse => return Err(family),
            Family::Repeat => Instruction::Repeat(offset + 1),
            Family::Xor => {
                let width = (offset >> 3) + 1;
                let position = offset & 0x07;
                if position + width > 8 {
                    return Err(family);
                }
                Instruction::Xor { width, position }
            }
        })
    }
}

/// Applies a single shift step to a segment.
pub fn shift_segment(segment: u8, direction: ShiftDirection, fill: bool, step: u8) -> u8 {
    let mut s = segment;
    for _ in 0..step {
        s = match direction {
            ShiftDirection::Left => (s << 1) | fill as u8,
            ShiftDirection::Right => (s >> 1) | ((fill as u8) << 7),
        };
    }
    s
}

/// Returns the mask of `width` ones starting at bit `position`.
pub fn xor_mask(width: u8, position: u8) -> u8 {
    (((1_u16 << width) - 1) << position) as u8
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mnemonic = self.family().mnemonic();
        match *self {
            Instruction::Load(v) => write!(f, "{mnemonic} 0x{v:02x}"),
            Instruction::Shift { step, length, .. } => {
                write!(f, "{mnemonic} step={step} len={length}")
            }
            Instruction::Copy { offset, length } => {
                write!(f, "{mnemonic} ofst={offset} len={length}")
            }
            Instruction::Repeat(length) => write!(f, "{mnemonic} len={length}"),
            Instruction::Xor { width, position } => {
                write!(f, "{mnemonic} width={width} pos={position}")
            }
        }
    }
}
