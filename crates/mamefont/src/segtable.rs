//! The font-wide segment table.
//!
//! Load instructions don't carry segment values directly;
//!     they carry a 6-bit index into a table of segments shared by every glyph in the font.
//! The table contains only the values that are still loaded after compression,
//!     ordered by how many load instructions reference them (most used first).
//! Ties are broken by the order in which values are first encountered
//!     when scanning the glyph programs in character code order.

use crate::bytecode::lang::Instruction;
use crate::bytecode::GlyphProgram;
use crate::Error;

/// Maximum number of entries in a segment table.
///
/// This is the number of opcodes in the load family.
pub const MAX_LEN: usize = 64;

/// A ranked, deduplicated table of segment values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTable {
    /// Values and their usage counts, in table order.
    entries: Vec<(u8, usize)>,
    index: [Option<u8>; 256],
}

impl SegmentTable {
    /// Builds the table from unresolved glyph programs.
    ///
    /// The programs must be given in ascending character code order
    ///     and their load instructions must carry literal segment values.
    pub fn build<'a, I>(programs: I) -> Result<SegmentTable, Error>
    where
        I: IntoIterator<Item = &'a GlyphProgram>,
    {
        let mut entries: Vec<(u8, usize)> = vec![];
        let mut slot: [Option<usize>; 256] = [None; 256];
        let literals = programs
            .into_iter()
            .flat_map(|program| program.instructions.iter())
            .filter_map(|instruction| match instruction {
                Instruction::Load(value) => Some(*value),
                _ => None,
            });
        for value in literals {
            match slot[value as usize] {
                Some(i) => entries[i].1 += 1,
                None => {
                    slot[value as usize] = Some(entries.len());
                    entries.push((value, 1));
                }
            }
        }
        if entries.len() > MAX_LEN {
            return Err(Error::SegmentTableOverflow {
                distinct: entries.len(),
            });
        }
        // The sort is stable, so ties stay in first-seen order.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        let mut index = [None; 256];
        for (i, (value, _)) in entries.iter().enumerate() {
            index[*value as usize] = Some(i as u8);
        }
        Ok(SegmentTable { entries, index })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The segment values in table order.
    pub fn values(&self) -> Vec<u8> {
        self.entries.iter().map(|(value, _)| *value).collect()
    }

    /// Returns the segment at an index.
    pub fn get(&self, index: u8) -> Option<u8> {
        self.entries.get(index as usize).map(|(value, _)| *value)
    }

    /// Returns the index of a segment value, if it's in the table.
    pub fn index_of(&self, value: u8) -> Option<u8> {
        self.index[value as usize]
    }

    /// Number of load instructions that reference a segment value.
    pub fn usage(&self, value: u8) -> usize {
        match self.index_of(value) {
            None => 0,
            Some(i) => self.entries[i as usize].1,
        }
    }

    /// Returns a copy of the program with every load literal replaced by its table index.
    pub fn resolve(&self, program: &GlyphProgram) -> Result<GlyphProgram, Error> {
        let instructions = program
            .instructions
            .iter()
            .map(|instruction| match *instruction {
                Instruction::Load(value) => match self.index_of(value) {
                    Some(index) => Ok(Instruction::Load(index)),
                    None => Err(Error::SegmentNotInTable {
                        code: program.code,
                        value,
                    }),
                },
                other => Ok(other),
            })
            .collect::<Result<Vec<Instruction>, Error>>()?;
        Ok(GlyphProgram {
            code: program.code,
            width: program.width,
            instructions,
        })
    }
}
