#![no_main]

use libfuzzer_sys::fuzz_target;
use mamefont::{Char, Font, Glyph};

#[derive(Debug, arbitrary::Arbitrary)]
struct Input {
    height: u8,
    glyphs: Vec<(u8, u8, Vec<u8>)>,
}

fuzz_target!(|input: Input| {
    let height = input.height % 32 + 1;
    let Ok(mut font) = Font::new(height) else {
        return;
    };
    let rows = font.rows();
    for (code, width, segments) in input.glyphs {
        let width = width % 16 + 1;
        let segments: Vec<u8> = segments
            .into_iter()
            .cycle()
            .take(width as usize * rows)
            .collect();
        if segments.len() != width as usize * rows {
            continue;
        }
        // Duplicate codes are rejected; the first one wins.
        let _ = font.insert(Char(code), Glyph::new(width, segments));
    }
    let compilation = match mamefont::algorithms::compile(&font) {
        Ok(compilation) => compilation,
        Err(mamefont::Error::EmptyFont | mamefont::Error::SegmentTableOverflow { .. }) => return,
        Err(err) => panic!("unexpected compilation error: {err}"),
    };
    let failures = mamefont::algorithms::verify(&font, &compilation.file);
    let expected: Vec<mamefont::algorithms::VerificationFailure> = vec![];
    similar_asserts::assert_eq!(failures: failures, expected: expected);
});
