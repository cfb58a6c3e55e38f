//! Rendering of compression reports as text tables.

use mamefont::report::Report;
use prettytable::{format, row, Table};

fn table_format() -> format::TableFormat {
    format::FormatBuilder::new()
        .column_separator('│')
        .borders(' ')
        .separator(
            format::LinePosition::Title,
            format::LineSeparator::new('─', '┼', ' ', ' '),
        )
        .padding(1, 1)
        .build()
}

fn percent(part: usize, total: usize) -> String {
    if total == 0 {
        return "-".into();
    }
    format!["{:.1}%", 100.0 * part as f64 / total as f64]
}

fn diff(before: usize, after: usize) -> String {
    format!["{:+}", after as i64 - before as i64]
}

/// Table of segment values before and after compression.
pub fn segment_table(report: &Report) -> Table {
    let mut table = Table::new();
    table.set_format(table_format());
    table.set_titles(row![r->"Index", "Bits", r->"Before", r->"After"]);
    for usage in &report.segments {
        let index = match usage.index {
            Some(index) => index.to_string(),
            None => String::new(),
        };
        let after = match usage.after {
            0 => "(deleted)".to_string(),
            n => n.to_string(),
        };
        let bits = format!["{:08b}", usage.value];
        table.add_row(row![r->index, bits, r->usage.before, r->after]);
    }
    table
}

/// Table of bytes used by each instruction family before and after compression.
pub fn compression_table(report: &Report) -> Table {
    let (total_before, total_after) = (report.total_before, report.total_after);
    let mut table = Table::new();
    table.set_format(table_format());
    table.set_titles(row![
        "Inst.",
        r->"Before",
        r->"(Util)",
        r->"After",
        r->"(Util)",
        r->"Diff"
    ]);
    for usage in &report.families {
        table.add_row(row![
            usage.family.mnemonic(),
            r->usage.before,
            r->percent(usage.before, total_before),
            r->usage.after,
            r->percent(usage.after, total_after),
            r->diff(usage.before, usage.after)
        ]);
    }
    let c = report.char_table_size;
    table.add_row(row![
        "C-Tbl",
        r->c,
        r->percent(c, total_before),
        r->c,
        r->percent(c, total_after),
        r->diff(c, c)
    ]);
    let s = report.segment_table_size;
    table.add_row(row![
        "S-Tbl",
        r->0,
        r->percent(0, total_before),
        r->s,
        r->percent(s, total_after),
        r->diff(0, s)
    ]);
    let total_diff = format![
        "{} ({:.1}%)",
        diff(total_before, total_after),
        100.0 * report.compression_ratio()
    ];
    table.add_row(row![
        "Total",
        r->total_before,
        r->percent(total_before, total_before),
        r->total_after,
        r->percent(total_after, total_after),
        r->total_diff
    ]);
    table
}

/// Renders the full report.
pub fn render(report: &Report) -> String {
    format![
        "Segment table:\n{}\nCompression performance:\n{}",
        segment_table(report),
        compression_table(report)
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mamefont::{Char, Font, Glyph};

    fn report() -> Report {
        let mut font = Font::new(8).unwrap();
        font.insert(Char(b'A'), Glyph::new(4, vec![0x5A, 0xA5, 0x5A, 0xA5]))
            .unwrap();
        font.insert(Char(b'B'), Glyph::new(3, vec![0x01, 0x02, 0x04]))
            .unwrap();
        let compilation = mamefont::algorithms::compile(&font).unwrap();
        Report::new(&font, &compilation)
    }

    #[test]
    fn segment_rows() {
        let s = segment_table(&report()).to_string();
        assert!(s.contains("01011010"), "{s}");
        assert!(s.contains("(deleted)"), "{s}");
        assert_eq!(s.matches("(deleted)").count(), 3, "{s}");
    }

    #[test]
    fn compression_rows() {
        let s = compression_table(&report()).to_string();
        for label in ["LD", "CPY", "XOR", "SLC", "C-Tbl", "S-Tbl", "Total"] {
            assert!(s.contains(label), "missing {label} in {s}");
        }
    }

    #[test]
    fn percentages() {
        assert_eq!(percent(1, 4), "25.0%");
        assert_eq!(percent(1, 0), "-");
        assert_eq!(diff(10, 7), "-3");
        assert_eq!(diff(0, 2), "+2");
    }
}
