//! Emission of compiled fonts as C++ source code.
//!
//! The embedded decoder is a header-only C++ library.
//! A compiled font is linked into firmware as a pair of files:
//!     a header declaring an `mfnt::Font` object,
//!     and a source file defining the three arrays and the object itself.

use super::File;
use std::fmt::{Display, Formatter, Result};

const CHAR_TABLE_SUFFIX: &str = "char_table";
const SEGMENT_TABLE_SUFFIX: &str = "seg_table";
const GLYPH_DATA_SUFFIX: &str = "glyph_data";

/// Naming options for the emitted C++ code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Identifier of the font object. Array identifiers are derived from it.
    pub name: String,
    /// Namespace to put the declarations in, if any.
    pub namespace: Option<String>,
    /// Path used by the source file to include the header.
    pub header_include_path: String,
}

/// The C++ header for a compiled font.
pub struct Header<'a> {
    file: &'a File,
    options: &'a Options,
}

/// The C++ source file for a compiled font.
pub struct Source<'a> {
    file: &'a File,
    options: &'a Options,
}

impl<'a> Header<'a> {
    pub fn new(file: &'a File, options: &'a Options) -> Self {
        Header { file, options }
    }
}

impl<'a> Source<'a> {
    pub fn new(file: &'a File, options: &'a Options) -> Self {
        Source { file, options }
    }
}

impl<'a> Display for Header<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "#pragma once")?;
        writeln!(f)?;
        write_includes(f, None)?;
        write_namespace_start(f, self.options)?;
        write_font(f, self.file, self.options, false)?;
        write_namespace_end(f, self.options)
    }
}

impl<'a> Display for Source<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write_includes(f, Some(&self.options.header_include_path))?;
        write_namespace_start(f, self.options)?;
        let name = &self.options.name;
        write_array(
            f,
            "uint16_t",
            &format!["{name}_{CHAR_TABLE_SUFFIX}"],
            &self.file.char_table,
            8,
        )?;
        write_array(
            f,
            "uint8_t",
            &format!["{name}_{SEGMENT_TABLE_SUFFIX}"],
            &self.file.segment_table,
            16,
        )?;
        write_array(
            f,
            "uint8_t",
            &format!["{name}_{GLYPH_DATA_SUFFIX}"],
            &self.file.glyph_data,
            16,
        )?;
        write_font(f, self.file, self.options, true)?;
        write_namespace_end(f, self.options)
    }
}

fn write_includes(f: &mut Formatter<'_>, header: Option<&str>) -> Result {
    writeln!(f, "#include <stdint.h>")?;
    writeln!(f, "#include \"mamefont/mamefont.hpp\"")?;
    if let Some(header) = header {
        writeln!(f, "#include \"{header}\"")?;
    }
    writeln!(f)
}

fn write_namespace_start(f: &mut Formatter<'_>, options: &Options) -> Result {
    match &options.namespace {
        None => Ok(()),
        Some(namespace) => write!(f, "namespace {namespace} {{\n\n"),
    }
}

fn write_namespace_end(f: &mut Formatter<'_>, options: &Options) -> Result {
    match &options.namespace {
        None => Ok(()),
        Some(_) => writeln!(f, "}}"),
    }
}

trait HexLiteral {
    fn hex(&self) -> String;
}

impl HexLiteral for u8 {
    fn hex(&self) -> String {
        format!["0x{self:02x}"]
    }
}

impl HexLiteral for u16 {
    fn hex(&self) -> String {
        format!["0x{self:04x}"]
    }
}

fn write_array<T: HexLiteral>(
    f: &mut Formatter<'_>,
    type_name: &str,
    id: &str,
    values: &[T],
    columns: usize,
) -> Result {
    if values.is_empty() {
        // Zero-length arrays are ill-formed in C++.
        return write!(f, "const {type_name} {id}[1] = {{ 0 }};\n\n");
    }
    writeln!(f, "const {type_name} {id}[] = {{")?;
    for line in values.chunks(columns) {
        write!(f, " ")?;
        for value in line {
            write!(f, " {},", value.hex())?;
        }
        writeln!(f)?;
    }
    write!(f, "}};\n\n")
}

fn write_font(f: &mut Formatter<'_>, file: &File, options: &Options, definition: bool) -> Result {
    let name = &options.name;
    write!(f, "extern const mfnt::Font {name}")?;
    if definition {
        writeln!(f, "(")?;
        writeln!(f, "  {},", file.height)?;
        writeln!(f, "  {},", file.num_chars())?;
        writeln!(f, "  {},", file.min_code.0)?;
        writeln!(f, "  0x{:02x},", file.flags)?;
        writeln!(f, "  {name}_{CHAR_TABLE_SUFFIX},")?;
        writeln!(f, "  {name}_{SEGMENT_TABLE_SUFFIX},")?;
        writeln!(f, "  {name}_{GLYPH_DATA_SUFFIX}")?;
        write!(f, ")")?;
    }
    write!(f, ";\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Char;

    fn file() -> File {
        File {
            height: 8,
            min_code: Char(0x20),
            flags: 0,
            char_table: vec![0, 0xFFFF, 2],
            segment_table: vec![0x00, 0x7E],
            glyph_data: (0..20).collect(),
        }
    }

    #[test]
    fn header_with_namespace() {
        let file = file();
        let options = Options {
            name: "tiny".into(),
            namespace: Some("fonts".into()),
            header_include_path: "tiny.hpp".into(),
        };
        let got = Header::new(&file, &options).to_string();
        let want = r#"#pragma once

#include <stdint.h>
#include "mamefont/mamefont.hpp"

namespace fonts {

extern const mfnt::Font tiny;

}
"#;
        assert_eq!(got, want);
    }

    #[test]
    fn source_without_namespace() {
        let file = file();
        let options = Options {
            name: "tiny".into(),
            namespace: None,
            header_include_path: "include/tiny.hpp".into(),
        };
        let got = Source::new(&file, &options).to_string();
        let want = r#"#include <stdint.h>
#include "mamefont/mamefont.hpp"
#include "include/tiny.hpp"

const uint16_t tiny_char_table[] = {
  0x0000, 0xffff, 0x0002,
};

const uint8_t tiny_seg_table[] = {
  0x00, 0x7e,
};

const uint8_t tiny_glyph_data[] = {
  0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
  0x10, 0x11, 0x12, 0x13,
};

extern const mfnt::Font tiny(
  8,
  3,
  32,
  0x00,
  tiny_char_table,
  tiny_seg_table,
  tiny_glyph_data
);

"#;
        assert_eq!(got, want);
    }

    #[test]
    fn empty_segment_table() {
        let mut file = file();
        file.segment_table.clear();
        let options = Options {
            name: "blank".into(),
            ..Default::default()
        };
        let got = Source::new(&file, &options).to_string();
        assert!(got.contains("const uint8_t blank_seg_table[1] = { 0 };\n"));
    }
}
