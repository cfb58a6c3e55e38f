use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;

const FONT: &str = r#"{
  "height": 8,
  "glyphs": [
    { "code": 65, "width": 4, "segments": [90, 165, 90, 165] },
    { "code": 67, "width": 3, "segments": [66, 66, 66] }
  ]
}"#;

fn write_font(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn incorrect_extension() {
    let mut cmd = Command::cargo_bin("mamec").unwrap();
    cmd.args(["compile", "font.bmp"]);
    cmd.assert().failure().stderr(predicate::str::contains(
        "the file extension must be .png or .json but it is .bmp",
    ));
}

#[test]
fn compile_cpp() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_font(dir.path(), "Tiny.json", FONT);
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();

    let mut cmd = Command::cargo_bin("mamec").unwrap();
    cmd.args([
        "compile",
        &input,
        "-o",
        out.to_str().unwrap(),
        "--include-dir",
        "fonts",
        "--cpp-namespace",
        "mfnt_fonts",
    ]);
    cmd.assert().success();

    let hpp = std::fs::read_to_string(out.join("Tiny.hpp")).unwrap();
    let want_hpp = r#"#pragma once

#include <stdint.h>
#include "mamefont/mamefont.hpp"

namespace mfnt_fonts {

extern const mfnt::Font Tiny;

}
"#;
    similar_asserts::assert_eq!(got: hpp, want: want_hpp);

    let cpp = std::fs::read_to_string(out.join("Tiny.cpp")).unwrap();
    let want_cpp = r#"#include <stdint.h>
#include "mamefont/mamefont.hpp"
#include "fonts/Tiny.hpp"

namespace mfnt_fonts {

const uint16_t Tiny_char_table[] = {
  0x0000, 0xffff, 0x0004,
};

const uint8_t Tiny_seg_table[] = {
  0x5a, 0xa5, 0x42,
};

const uint8_t Tiny_glyph_data[] = {
  0x04, 0x00, 0x01, 0x81, 0x03, 0x02, 0xe1,
};

extern const mfnt::Font Tiny(
  8,
  3,
  65,
  0x00,
  Tiny_char_table,
  Tiny_seg_table,
  Tiny_glyph_data
);

}
"#;
    similar_asserts::assert_eq!(got: cpp, want: want_cpp);
}

#[test]
fn compile_json() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_font(dir.path(), "Tiny.json", FONT);
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();

    let mut cmd = Command::cargo_bin("mamec").unwrap();
    cmd.args([
        "compile",
        &input,
        "-o",
        out.to_str().unwrap(),
        "-n",
        "small",
        "-f",
        "json",
    ]);
    cmd.assert().success();

    let json = std::fs::read_to_string(out.join("small.json")).unwrap();
    let got: serde_json::Value = serde_json::from_str(&json).unwrap();
    let want = serde_json::json!({
        "format": "MameFont",
        "name": "small",
        "height": 8,
        "min_code": 65,
        "flags": 0,
        "char_table": [0, 65535, 4],
        "segment_table": [0x5a, 0xa5, 0x42],
        "glyph_data": [4, 0x00, 0x01, 0x81, 3, 0x02, 0xe1],
    });
    similar_asserts::assert_eq!(got: got, want: want);
}

#[test]
fn check() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_font(dir.path(), "Tiny.json", FONT);
    let mut cmd = Command::cargo_bin("mamec").unwrap();
    cmd.args(["check", &input]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2 glyphs verified, 20 bytes"));
}

#[test]
fn report() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_font(dir.path(), "Tiny.json", FONT);
    let mut cmd = Command::cargo_bin("mamec").unwrap();
    cmd.args(["report", &input]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Segment table:"))
        .stdout(predicate::str::contains("01011010"))
        .stdout(predicate::str::contains("Compression performance:"))
        .stdout(predicate::str::contains("S-Tbl"));
}

#[test]
fn dump_single_glyph() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_font(dir.path(), "Tiny.json", FONT);
    let mut cmd = Command::cargo_bin("mamec").unwrap();
    cmd.args(["dump", &input, "-c", "0x41"]);
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let got = String::from_utf8(output.stdout).unwrap();
    let want = "'A' (0x41): offset=0 width=4
    0x00  LD 0x00 -> 01011010
    0x01  LD 0x01 -> 10100101
    0x81  CPY ofst=0 len=2
";
    similar_asserts::assert_eq!(got: got, want: want);
}

#[test]
fn dump_missing_glyph() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_font(dir.path(), "Tiny.json", FONT);
    let mut cmd = Command::cargo_bin("mamec").unwrap();
    cmd.args(["dump", &input, "-c", "66"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("The font has no glyph for 'B' (0x42)"));
}

#[test]
fn invalid_font() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_font(
        dir.path(),
        "Bad.json",
        r#"{ "height": 8, "glyphs": [ { "code": 65, "width": 2, "segments": [1] } ] }"#,
    );
    let mut cmd = Command::cargo_bin("mamec").unwrap();
    cmd.args(["check", &input]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn compile_sprite_sheet() {
    let dir = tempfile::TempDir::new().unwrap();
    // Two 2-pixel-wide glyphs of height 2 on baselines at row 2.
    let mut image = image::RgbImage::new(5, 3);
    let white = image::Rgb([255, 255, 255]);
    let red = image::Rgb([255, 0, 0]);
    image.put_pixel(0, 0, white);
    image.put_pixel(1, 1, white);
    image.put_pixel(3, 0, white);
    image.put_pixel(4, 0, white);
    for x in [0, 1, 3, 4] {
        image.put_pixel(x, 2, red);
    }
    let input = dir.path().join("Sheet.png");
    image.save(&input).unwrap();

    let mut cmd = Command::cargo_bin("mamec").unwrap();
    cmd.args(["dump", input.to_str().unwrap(), "--first-code", "0x30"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("'0' (0x30): offset=0 width=2"))
        .stdout(predicate::str::contains("'1' (0x31): offset=3 width=2"));
}
