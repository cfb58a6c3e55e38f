use std::path::{Path, PathBuf};

use clap::Parser;
use mamefont::format::cpp;

mod common;
mod report;
mod sheet;
use common::*;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = cli.run() {
        if !err.is_empty() {
            eprintln!("{err}");
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .init();
}

/// Compiler for MameFont bitmap fonts.
///
/// MameFont stores each glyph as a short bytecode program
///     that is decoded by a tiny virtual machine on the target device.
/// This tool reads fonts from sprite sheets or JSON files,
///     compiles them, and writes the result as C++ source code.
#[derive(Debug, Parser)]
#[command(name = "mamec", version = "0.1", about, long_about, max_term_width(100))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print progress information. Repeat for more detail.
    ///
    /// The `RUST_LOG` environment variable overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

impl Cli {
    fn run(self) -> Result<(), String> {
        match self.command {
            Command::Compile(compile) => compile.run(),
            Command::Check(check) => check.run(),
            Command::Report(report) => report.run(),
            Command::Dump(dump) => dump.run(),
        }
    }
}

#[derive(Clone, Debug, clap::Subcommand)]
enum Command {
    /// Compile a font.
    ///
    /// By default the font is written as a C++ header and source file pair
    ///     named after the input file:
    ///
    ///     $ mamec compile fonts/Tiny5x7.png
    ///
    /// writes Tiny5x7.hpp and Tiny5x7.cpp to the current directory.
    Compile(Compile),
    /// Compile a font and check that every glyph decodes back to its source.
    Check(Check),
    /// Print how well a font compresses.
    ///
    /// The first table lists the segment table:
    ///     how often each segment value appears in the source glyphs
    ///     and how many load instructions still reference it after compression.
    /// Segments that compression eliminated entirely are marked as deleted.
    ///
    /// The second table breaks the compiled size down by instruction family.
    Report(Report),
    /// Print the compiled program of each glyph.
    Dump(Dump),
}

/// Arguments shared by every subcommand that reads a font.
#[derive(Clone, Debug, clap::Args)]
struct Input {
    /// Path to the font: a .png sprite sheet or a .json font.
    path: InputPath,

    /// Character code of the first glyph in a sprite sheet.
    ///
    /// Glyphs get consecutive codes in reading order unless
    ///     the sheet sets a code with a green marker.
    #[arg(long, default_value = "0x20", value_parser = parse_char_code)]
    first_code: u8,
}

impl Input {
    fn compile(&self) -> Result<(mamefont::Font, mamefont::algorithms::Compilation), String> {
        let font = self.path.read(self.first_code).map_err(|err| err.to_string())?;
        let compilation = mamefont::algorithms::compile(&font).map_err(|err| {
            format!(
                "Failed to compile `{}`: {}",
                self.path.path().display(),
                err
            )
        })?;
        Ok((font, compilation))
    }
}

#[derive(Clone, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    /// A C++ header and source file.
    #[default]
    Cpp,
    /// A single JSON file with the compiled arrays.
    Json,
}

#[derive(Clone, Debug, Parser)]
struct Compile {
    #[command(flatten)]
    input: Input,

    /// Name of the font object in the output.
    ///
    /// Defaults to the name of the input file without its extension.
    /// Array names are derived from it.
    #[arg(short, long)]
    name: Option<String>,

    /// Directory to write the output files to.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path of the C++ source file. Overrides --output-dir.
    #[arg(long)]
    output_cpp: Option<PathBuf>,

    /// Path of the C++ header file. Overrides --output-dir.
    #[arg(long)]
    output_hpp: Option<PathBuf>,

    /// Directory prefix used when the source file includes the header.
    #[arg(long)]
    include_dir: Option<String>,

    /// C++ namespace to put the font in.
    #[arg(long)]
    cpp_namespace: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Also print the compression report.
    #[arg(long)]
    report: bool,
}

#[derive(serde::Serialize)]
struct JsonOutput<'a> {
    format: &'static str,
    name: &'a str,
    height: u8,
    min_code: u8,
    flags: u8,
    char_table: &'a [u16],
    segment_table: &'a [u8],
    glyph_data: &'a [u8],
}

impl Compile {
    fn output_path(&self, name: &str, extension: &str) -> PathBuf {
        let file_name = format!["{name}.{extension}"];
        match &self.output_dir {
            None => file_name.into(),
            Some(dir) => dir.join(file_name),
        }
    }

    fn run(&self) -> Result<(), String> {
        let (font, compilation) = self.input.compile()?;
        let name = match &self.name {
            Some(name) => name.clone(),
            None => self.input.path.stem(),
        };
        let file = &compilation.file;
        match self.format {
            OutputFormat::Cpp => {
                let cpp_path = match &self.output_cpp {
                    Some(path) => path.clone(),
                    None => self.output_path(&name, "cpp"),
                };
                let hpp_path = match &self.output_hpp {
                    Some(path) => path.clone(),
                    None => self.output_path(&name, "hpp"),
                };
                let options = cpp::Options {
                    name,
                    namespace: self.cpp_namespace.clone(),
                    header_include_path: header_include_path(&hpp_path, self.include_dir.as_deref()),
                };
                write(&hpp_path, &cpp::Header::new(file, &options).to_string())?;
                write(&cpp_path, &cpp::Source::new(file, &options).to_string())?;
                log::info!(
                    "Wrote `{}` and `{}`",
                    hpp_path.display(),
                    cpp_path.display()
                );
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    format: "MameFont",
                    name: &name,
                    height: file.height,
                    min_code: file.min_code.0,
                    flags: file.flags,
                    char_table: &file.char_table,
                    segment_table: &file.segment_table,
                    glyph_data: &file.glyph_data,
                };
                let json = serde_json::to_string_pretty(&output)
                    .map_err(|err| format!("Failed to serialize the font: {err}"))?;
                let json_path = self.output_path(&name, "json");
                write(&json_path, &json)?;
                log::info!("Wrote `{}`", json_path.display());
            }
        }
        if self.report {
            let report = mamefont::report::Report::new(&font, &compilation);
            print!("{}", report::render(&report));
        }
        Ok(())
    }
}

/// Path the C++ source uses to include the header.
fn header_include_path(hpp_path: &Path, include_dir: Option<&str>) -> String {
    let file_name = hpp_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match include_dir {
        None => file_name,
        Some(dir) => format!["{}/{}", dir.trim_end_matches('/'), file_name],
    }
}

#[derive(Clone, Debug, Parser)]
struct Check {
    #[command(flatten)]
    input: Input,
}

impl Check {
    fn run(&self) -> Result<(), String> {
        let (font, compilation) = self.input.compile()?;
        let failures = mamefont::algorithms::verify(&font, &compilation.file);
        for failure in &failures {
            eprintln!("{failure}");
        }
        if !failures.is_empty() {
            return Err(format!(
                "{} of {} glyphs failed verification",
                failures.len(),
                font.len()
            ));
        }
        println!(
            "{} glyphs verified, {} bytes",
            font.len(),
            compilation.file.size()
        );
        Ok(())
    }
}

#[derive(Clone, Debug, Parser)]
struct Report {
    #[command(flatten)]
    input: Input,
}

impl Report {
    fn run(&self) -> Result<(), String> {
        let (font, compilation) = self.input.compile()?;
        let report = mamefont::report::Report::new(&font, &compilation);
        print!("{}", report::render(&report));
        Ok(())
    }
}

#[derive(Clone, Debug, Parser)]
struct Dump {
    #[command(flatten)]
    input: Input,

    /// Only print the glyph with this character code.
    #[arg(short, long, value_parser = parse_char_code)]
    char: Option<u8>,
}

impl Dump {
    fn run(&self) -> Result<(), String> {
        let (font, compilation) = self.input.compile()?;
        let file = &compilation.file;
        let codes: Vec<mamefont::Char> = match self.char {
            Some(code) => {
                let code = mamefont::Char(code);
                if font.get(code).is_none() {
                    return Err(format!("The font has no glyph for {code}"));
                }
                vec![code]
            }
            None => font.glyphs().map(|(code, _)| code).collect(),
        };
        for code in codes {
            let (offset, width, instructions) = file
                .glyph_offset(code)
                .and_then(|offset| {
                    Ok((
                        offset,
                        file.glyph_width(code)?,
                        file.glyph_instructions(code)?,
                    ))
                })
                .map_err(|err| format!("Failed to decode the glyph for {code}: {err}"))?;
            println!("{code}: offset={offset} width={width}");
            for (i, instruction) in instructions.iter().enumerate() {
                let byte = file.glyph_data[offset + 1 + i];
                match instruction {
                    mamefont::bytecode::lang::Instruction::Load(index) => {
                        let value = file.segment_table[*index as usize];
                        println!("    0x{byte:02x}  {instruction} -> {value:08b}");
                    }
                    _ => println!("    0x{byte:02x}  {instruction}"),
                }
            }
        }
        Ok(())
    }
}
