//! Greedy glyph compressor.
//!
//! At each position the compressor generates every instruction that exactly reproduces
//!     one or more of the upcoming segments, scores them with [`Instruction::score`],
//!     and emits the best one.
//! Load is always a candidate, so every glyph compiles;
//!     in the worst case into one load instruction per segment.
//!
//! Load instructions produced here carry literal segment values.
//! They are rewritten to segment table indices by [`crate::segtable::SegmentTable::resolve`].

use super::lang::{self, Instruction, ShiftDirection};
use super::GlyphProgram;
use crate::{Char, Glyph};

/// Compiles a single glyph.
pub fn compile(code: Char, glyph: &Glyph) -> GlyphProgram {
    let instructions: Vec<Instruction> = Compressor::new(&glyph.segments).collect();
    let program = GlyphProgram {
        code,
        width: glyph.width,
        instructions,
    };
    log::debug!("    {}: {}", code, program.mnemonics());
    program
}

/// Iterator over the instructions chosen for a segment sequence.
#[derive(Debug, Clone)]
pub struct Compressor<'a> {
    segments: &'a [u8],
    position: usize,
    last: u8,
}

impl<'a> Compressor<'a> {
    pub fn new(segments: &'a [u8]) -> Compressor<'a> {
        Compressor {
            segments,
            position: 0,
            last: 0,
        }
    }

    /// Number of segments consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns all valid candidates at the current position.
    ///
    /// Candidates are returned in generation order: load, shifts, copies, repeat, XOR.
    /// When two candidates have the same score the later one is chosen.
    pub fn candidates(&self) -> Vec<Instruction> {
        if self.position >= self.segments.len() {
            return vec![];
        }
        let mut candidates = vec![self.suggest_load()];
        self.suggest_shifts(&mut candidates);
        self.suggest_copies(&mut candidates);
        candidates.extend(self.suggest_repeat());
        candidates.extend(self.suggest_xor());
        candidates
    }

    fn remaining(&self) -> &'a [u8] {
        &self.segments[self.position..]
    }

    fn suggest_load(&self) -> Instruction {
        Instruction::Load(self.segments[self.position])
    }

    fn suggest_shifts(&self, candidates: &mut Vec<Instruction>) {
        let max_length = self.remaining().len().min(lang::MAX_SHIFT_LENGTH as usize);
        for direction in ShiftDirection::ALL {
            for fill in [false, true] {
                for step in 1..=2 {
                    let mut work = self.last;
                    let mut length = 0;
                    for &segment in &self.remaining()[..max_length] {
                        work = lang::shift_segment(work, direction, fill, step);
                        if segment != work {
                            break;
                        }
                        length += 1;
                    }
                    if length > 0 {
                        candidates.push(Instruction::Shift {
                            direction,
                            fill,
                            step,
                            length,
                        });
                    }
                }
            }
        }
    }

    fn suggest_copies(&self, candidates: &mut Vec<Instruction>) {
        let max_length = self.remaining().len().min(lang::MAX_BLOCK_LENGTH as usize);
        for length in (1..=max_length).rev() {
            let mut found = false;
            for offset in 0..=lang::MAX_COPY_OFFSET as usize {
                let Some(start) = self.position.checked_sub(offset + length) else {
                    break;
                };
                let source = &self.segments[start..start + length];
                let destination = &self.segments[self.position..self.position + length];
                if source == destination {
                    candidates.push(Instruction::Copy {
                        offset: offset as u8,
                        length: length as u8,
                    });
                    found = true;
                }
            }
            if found {
                return;
            }
        }
    }

    fn suggest_repeat(&self) -> Option<Instruction> {
        let length = self
            .remaining()
            .iter()
            .take(lang::MAX_BLOCK_LENGTH as usize)
            .take_while(|&&segment| segment == self.last)
            .count();
        if length == 0 {
            None
        } else {
            Some(Instruction::Repeat(length as u8))
        }
    }

    fn suggest_xor(&self) -> Option<Instruction> {
        let next = self.segments[self.position];
        for width in 1..=2 {
            for position in 0..=(crate::SEGMENT_HEIGHT - width) {
                if next == self.last ^ lang::xor_mask(width, position) {
                    return Some(Instruction::Xor { width, position });
                }
            }
        }
        None
    }
}

impl<'a> Iterator for Compressor<'a> {
    type Item = Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        let candidates = self.candidates();
        // max_by_key returns the last maximum, so later candidates win ties.
        let best = candidates.iter().copied().max_by_key(Instruction::score)?;
        log::trace!(
            "position {}: chose {} out of {} candidates",
            self.position,
            best,
            candidates.len()
        );
        self.position += best.size();
        self.last = self.segments[self.position - 1];
        Some(best)
    }
}
