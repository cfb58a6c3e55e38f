//! Diagnostics about how well a font compressed.

use crate::algorithms::Compilation;
use crate::bytecode::lang::Family;
use crate::format::{CHAR_TABLE_ENTRY_SIZE, FONT_HEADER_SIZE};
use crate::Font;

/// Usage of one segment value before and after compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentUsage {
    /// Index in the segment table, or [`None`] if compression removed every use of the value.
    pub index: Option<u8>,
    pub value: u8,
    /// Number of times the value appears in the source glyphs.
    pub before: usize,
    /// Number of load instructions that reference the value.
    pub after: usize,
}

/// Contribution of one instruction family to the compiled font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyUsage {
    pub family: Family,
    /// Number of segments output by instructions of this family.
    ///
    /// Uncompressed, each of these segments would take one byte.
    pub before: usize,
    /// Number of instructions of this family, which is also their size in bytes.
    pub after: usize,
}

/// Compression report for a compiled font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Segments in the segment table in table order,
    ///     followed by the source segments that are no longer loaded.
    pub segments: Vec<SegmentUsage>,
    /// Families in order of first use.
    pub families: Vec<FamilyUsage>,
    pub char_table_size: usize,
    pub segment_table_size: usize,
    /// Size of the font with one byte per segment.
    pub total_before: usize,
    /// Size of the compiled font.
    pub total_after: usize,
}

impl Report {
    pub fn new(font: &Font, compilation: &Compilation) -> Report {
        let table = &compilation.segment_table;
        let source_usage = font.segment_usage();
        let before = |value: u8| {
            source_usage
                .iter()
                .find(|(v, _)| *v == value)
                .map(|(_, count)| *count)
                .unwrap_or(0)
        };
        let mut segments: Vec<SegmentUsage> = table
            .values()
            .into_iter()
            .enumerate()
            .map(|(i, value)| SegmentUsage {
                index: Some(i as u8),
                value,
                before: before(value),
                after: table.usage(value),
            })
            .collect();
        segments.extend(
            source_usage
                .iter()
                .filter(|(value, _)| table.index_of(*value).is_none())
                .map(|(value, count)| SegmentUsage {
                    index: None,
                    value: *value,
                    before: *count,
                    after: 0,
                }),
        );

        let mut families: Vec<FamilyUsage> = vec![];
        for instruction in compilation
            .programs
            .iter()
            .flat_map(|program| program.instructions.iter())
        {
            let family = instruction.family();
            let i = match families.iter().position(|u| u.family == family) {
                Some(i) => i,
                None => {
                    families.push(FamilyUsage {
                        family,
                        before: 0,
                        after: 0,
                    });
                    families.len() - 1
                }
            };
            families[i].before += instruction.size();
            families[i].after += 1;
        }

        let file = &compilation.file;
        let char_table_size = file.char_table.len() * CHAR_TABLE_ENTRY_SIZE;
        let segment_table_size = file.segment_table.len();
        let total_before =
            FONT_HEADER_SIZE + char_table_size + families.iter().map(|u| u.before).sum::<usize>();
        let total_after =
            FONT_HEADER_SIZE + char_table_size + segment_table_size + file.glyph_data.len();
        Report {
            segments,
            families,
            char_table_size,
            segment_table_size,
            total_before,
            total_after,
        }
    }

    /// Fraction of the uncompressed size saved by compression.
    ///
    /// Negative if the compiled font is larger.
    pub fn compression_ratio(&self) -> f64 {
        if self.total_before == 0 {
            return 0.0;
        }
        1.0 - self.total_after as f64 / self.total_before as f64
    }
}
