use super::*;
use crate::bytecode::GlyphProgram;
use crate::segtable::SegmentTable;
use crate::Error;

/// Lays out resolved glyph programs into a compiled font.
///
/// The load instructions of the programs must carry segment table indices
///     (see [`SegmentTable::resolve`]).
/// Programs are laid out in the order given, which is normally character code order.
/// Every character code between the smallest and largest program code gets a char table entry;
///     codes without a program get [`GLYPH_OFFSET_ABSENT`].
pub fn assemble(
    height: u8,
    programs: &[GlyphProgram],
    segment_table: &SegmentTable,
) -> Result<File, Error> {
    let codes = programs.iter().map(|program| program.code);
    let (Some(min_code), Some(max_code)) = (codes.clone().min(), codes.max()) else {
        return Err(Error::EmptyFont);
    };
    let mut char_table = vec![GLYPH_OFFSET_ABSENT; (max_code.0 - min_code.0) as usize + 1];
    let mut glyph_data: Vec<u8> = vec![];
    for program in programs {
        let offset = glyph_data.len();
        // The absent marker is a valid u16, so the last addressable offset is one below it.
        let entry: u16 = match offset.try_into() {
            Ok(entry) if entry != GLYPH_OFFSET_ABSENT => entry,
            _ => {
                return Err(Error::ProgramTooLarge {
                    size: offset + program.encoded_len(),
                })
            }
        };
        char_table[(program.code.0 - min_code.0) as usize] = entry;
        program.encode(&mut glyph_data)?;
    }
    Ok(File {
        height,
        min_code,
        flags: 0,
        char_table,
        segment_table: segment_table.values(),
        glyph_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::lang::Instruction;

    fn program(code: u8, instructions: Vec<Instruction>) -> GlyphProgram {
        GlyphProgram {
            code: Char(code),
            width: instructions.len() as u8,
            instructions,
        }
    }

    #[test]
    fn layout_with_hole() {
        let programs = vec![
            program(b'a', vec![Instruction::Load(0x11)]),
            program(b'c', vec![Instruction::Load(0x22), Instruction::Load(0x11)]),
        ];
        let table = SegmentTable::build(&programs).unwrap();
        let resolved: Vec<GlyphProgram> = programs
            .iter()
            .map(|p| table.resolve(p).unwrap())
            .collect();
        let got = assemble(8, &resolved, &table).unwrap();
        assert_eq!(
            got,
            File {
                height: 8,
                min_code: Char(b'a'),
                flags: 0,
                char_table: vec![0, GLYPH_OFFSET_ABSENT, 2],
                segment_table: vec![0x11, 0x22],
                glyph_data: vec![1, 0x00, 2, 0x01, 0x00],
            }
        );
    }

    #[test]
    fn layout_in_given_order() {
        let programs = vec![
            program(b'c', vec![Instruction::Load(0), Instruction::Load(1)]),
            program(b'a', vec![Instruction::Load(0)]),
        ];
        let table = SegmentTable::build(std::iter::empty()).unwrap();
        let got = assemble(8, &programs, &table).unwrap();
        assert_eq!(got.min_code, Char(b'a'));
        assert_eq!(got.char_table, vec![3, GLYPH_OFFSET_ABSENT, 0]);
        assert_eq!(got.glyph_data, vec![2, 0x00, 0x01, 1, 0x00]);
    }

    #[test]
    fn empty() {
        let table = SegmentTable::build(std::iter::empty()).unwrap();
        assert_eq!(assemble(8, &[], &table), Err(Error::EmptyFont));
    }

    #[test]
    fn unresolved_load_is_rejected() {
        let programs = vec![program(b'a', vec![Instruction::Load(0x80)])];
        let table = SegmentTable::build(&programs).unwrap();
        let got = assemble(8, &programs, &table);
        assert_eq!(got.map_err(|e| e.kind()), Err(crate::ErrorKind::EncodingRangeViolation));
    }

    #[test]
    fn program_too_large() {
        // Each program is 1 + 255 bytes, so the last of 256 programs starts at 65280.
        // With one more instruction per program the last one would start at 0xFFFF.
        let instructions = vec![Instruction::Repeat(1); 255];
        let mut programs: Vec<GlyphProgram> = (0..=255)
            .map(|code| program(code, instructions.clone()))
            .collect();
        let table = SegmentTable::build(&programs).unwrap();
        assert!(assemble(8, &programs, &table).is_ok());
        for p in programs.iter_mut() {
            p.instructions.push(Instruction::Repeat(1));
            p.width = p.width.wrapping_add(1);
        }
        let got = assemble(8, &programs, &table);
        assert_eq!(got.map_err(|e| e.kind()), Err(crate::ErrorKind::LayoutOverflow));
    }
}
