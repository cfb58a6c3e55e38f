use std::path::{Path, PathBuf};

/// Path to a font source: either a sprite sheet or a JSON font description.
#[derive(Clone, Debug)]
pub enum InputPath {
    Png(PathBuf),
    Json(PathBuf),
}

impl InputPath {
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let path_buf: PathBuf = input.into();
        match path_buf.extension().and_then(std::ffi::OsStr::to_str) {
            Some("png") => Ok(InputPath::Png(path_buf)),
            Some("json") => Ok(InputPath::Json(path_buf)),
            Some(extension) => Err(InputError::UnsupportedExtension(extension.to_string())),
            None => Err(InputError::MissingExtension),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            InputPath::Png(path) | InputPath::Json(path) => path,
        }
    }

    /// Name of the input file without its extension.
    pub fn stem(&self) -> String {
        self.path()
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Reads the font.
    ///
    /// The first code is only used for sprite sheets,
    ///     and only until the sheet sets the code explicitly.
    pub fn read(&self, first_code: u8) -> Result<mamefont::Font, InputError> {
        match self {
            InputPath::Png(path) => {
                let image = image::open(path).map_err(|source| InputError::Image {
                    path: path.clone(),
                    source,
                })?;
                crate::sheet::parse(&image.to_rgb8(), first_code).map_err(|source| {
                    InputError::Sheet {
                        path: path.clone(),
                        source,
                    }
                })
            }
            InputPath::Json(path) => {
                let data = std::fs::read_to_string(path).map_err(|source| InputError::Io {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str(&data).map_err(|source| InputError::Json {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

impl clap::builder::ValueParserFactory for InputPath {
    type Parser = clap::builder::ValueParser;

    fn value_parser() -> Self::Parser {
        clap::builder::ValueParser::new(InputPath::parse)
    }
}

/// Error returned when a font source can't be opened or understood.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("the file extension must be .png or .json but it is missing")]
    MissingExtension,
    #[error("the file extension must be .png or .json but it is .{0}")]
    UnsupportedExtension(String),
    #[error("Failed to read `{file}`: {source}", file = .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read `{file}`: {source}", file = .path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to parse `{file}`: {source}", file = .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to parse `{file}`: {source}", file = .path.display())]
    Sheet {
        path: PathBuf,
        source: crate::sheet::SheetError,
    },
}

/// Parses a character code written in decimal, or in hexadecimal with a `0x` prefix.
pub fn parse_char_code(input: &str) -> Result<u8, String> {
    let result = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse::<u8>(),
    };
    result.map_err(|_| format!("`{input}` is not a character code between 0 and 0xff"))
}

pub fn write(path: &Path, content: &str) -> Result<(), String> {
    match std::fs::write(path, content) {
        Ok(_) => Ok(()),
        Err(err) => Err(format!("Failed to write `{}`: {}", path.display(), err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_input_path() {
        assert!(matches!(
            InputPath::parse("font.png"),
            Ok(InputPath::Png(_))
        ));
        assert!(matches!(
            InputPath::parse("dir/font.json"),
            Ok(InputPath::Json(_))
        ));
        let err = InputPath::parse("font.bmp").unwrap_err();
        assert_eq!(
            err.to_string(),
            "the file extension must be .png or .json but it is .bmp"
        );
        let err = InputPath::parse("font").unwrap_err();
        assert_eq!(
            err.to_string(),
            "the file extension must be .png or .json but it is missing"
        );
    }

    #[test]
    fn read_errors_name_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        let err = InputPath::Json(missing.clone()).read(0x20).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
        assert!(err
            .to_string()
            .starts_with(&format!["Failed to read `{}`: ", missing.display()]));

        let sheet = dir.path().join("blank.png");
        image::RgbImage::new(2, 2).save(&sheet).unwrap();
        let err = InputPath::Png(sheet.clone()).read(0x20).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!["Failed to parse `{}`: no red baseline pixel found", sheet.display()]
        );
    }

    #[test]
    fn stem() {
        let path = InputPath::parse("assets/Tiny5x7.png").unwrap();
        assert_eq!(path.stem(), "Tiny5x7");
    }

    #[test]
    fn char_codes() {
        assert_eq!(parse_char_code("32"), Ok(32));
        assert_eq!(parse_char_code("0x20"), Ok(32));
        assert_eq!(parse_char_code("0XfF"), Ok(255));
        assert!(parse_char_code("0x100").is_err());
        assert!(parse_char_code("A").is_err());
    }
}
