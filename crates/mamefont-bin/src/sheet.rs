//! Reading fonts from sprite sheets.
//!
//! A sprite sheet is an image in which glyphs are drawn in white on a dark background.
//! Each glyph sits directly above a horizontal red line, its *baseline*,
//!     which is exactly as wide as the glyph.
//! The height of the font is the distance between the first row that contains
//!     a white pixel and the first row that contains a red pixel.
//!
//! Glyphs are assigned consecutive character codes in reading order
//!     (top to bottom, then left to right).
//! The code of a glyph can be set explicitly with a green marker two rows below its baseline:
//!     the marker is a run of green pixels, one per bit, most significant bit first,
//!     and a bit is set if the pixel directly above it is also green.

use image::RgbImage;
use mamefont::{Char, Font, Glyph, SEGMENT_HEIGHT};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetError {
    /// The sheet has no red pixel, so the font height is unknown.
    #[error("no red baseline pixel found")]
    NoBaseline,
    /// The first baseline is on the same row as the first white pixel.
    #[error("the font height is zero")]
    ZeroHeight,
    /// The font is taller than a character code can describe.
    #[error("the font height {0} is larger than 255")]
    TooTall(u32),
    /// A glyph is wider than 255 pixels.
    #[error("the glyph at ({x}, {y}) has width {width}, which is larger than 255")]
    TooWide { x: u32, y: u32, width: u32 },
    /// A code marker has more bits than a character code.
    #[error("the code marker at ({x}, {y}) is {width} pixels wide but a character code has 8 bits")]
    MarkerTooWide { x: u32, y: u32, width: u32 },
    /// Consecutive glyphs ran past the last character code.
    #[error("the glyph at ({x}, {y}) comes after character code 0xff")]
    CodeOverflow { x: u32, y: u32 },
    /// The glyphs are not a valid font.
    #[error(transparent)]
    Font(mamefont::Error),
}

fn is_red(p: [u8; 3]) -> bool {
    p[0] >= 192 && p[1] < 64 && p[2] < 64
}

fn is_green(p: [u8; 3]) -> bool {
    p[0] < 64 && p[1] >= 192 && p[2] < 64
}

fn is_white(p: [u8; 3]) -> bool {
    p[0] >= 192 && p[1] >= 192 && p[2] >= 192
}

struct Sheet<'a> {
    image: &'a RgbImage,
}

impl<'a> Sheet<'a> {
    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        match self.image.get_pixel_checked(x, y) {
            Some(p) => p.0,
            None => [0, 0, 0],
        }
    }

    /// Returns the row of the first white pixel and the height of the font.
    fn measure(&self) -> Result<(u32, u32), SheetError> {
        let (width, height) = self.image.dimensions();
        let mut offset_y = None;
        for y in 0..height {
            for x in 0..width {
                let p = self.pixel(x, y);
                if offset_y.is_none() && is_white(p) {
                    offset_y = Some(y);
                }
                if is_red(p) {
                    let offset_y = offset_y.unwrap_or(0);
                    return Ok((offset_y, y - offset_y));
                }
            }
        }
        Err(SheetError::NoBaseline)
    }

    /// Reads the code marker below a baseline starting at `(x, y)`, if there is one.
    fn code_marker(&self, x: u32, y: u32) -> Result<Option<u8>, SheetError> {
        let mut code: u8 = 0;
        let mut width = 0;
        while is_green(self.pixel(x + width, y + 2)) {
            if width == u8::BITS {
                while is_green(self.pixel(x + width, y + 2)) {
                    width += 1;
                }
                return Err(SheetError::MarkerTooWide { x, y: y + 2, width });
            }
            code = (code << 1) | is_green(self.pixel(x + width, y + 1)) as u8;
            width += 1;
        }
        Ok((width > 0).then_some(code))
    }

    fn segments(&self, x: u32, baseline: u32, width: u32, height: u32, rows: usize) -> Vec<u8> {
        let top = baseline - height;
        let mut segments = Vec::with_capacity(rows * width as usize);
        for row in 0..rows as u32 {
            let band = top + row * SEGMENT_HEIGHT as u32;
            for col in x..x + width {
                let mut segment = 0_u8;
                for i in 0..SEGMENT_HEIGHT as u32 {
                    let y = band + i;
                    segment <<= 1;
                    if y < baseline && is_white(self.pixel(col, y)) {
                        segment |= 1;
                    }
                }
                segments.push(segment);
            }
        }
        segments
    }
}

/// Reads a font from a sprite sheet.
///
/// Glyphs without a code marker get consecutive codes starting at `first_code`.
pub fn parse(image: &RgbImage, first_code: u8) -> Result<Font, SheetError> {
    let sheet = Sheet { image };
    log::info!("Recognizing characters...");
    let (offset_y, height) = sheet.measure()?;
    if height == 0 {
        return Err(SheetError::ZeroHeight);
    }
    let height_u8: u8 = height.try_into().map_err(|_| SheetError::TooTall(height))?;
    let mut font = Font::new(height_u8).map_err(SheetError::Font)?;
    let rows = font.rows();
    log::info!("    Y offset: {offset_y}");
    log::info!("    Font height: {height} (num rows: {rows})");

    let (image_width, image_height) = image.dimensions();
    let mut code: Option<u8> = Some(first_code);
    for baseline in height..image_height {
        let mut x = 0;
        while x < image_width {
            if !is_red(sheet.pixel(x, baseline)) {
                x += 1;
                continue;
            }
            let start = x;
            while x < image_width && is_red(sheet.pixel(x, baseline)) {
                x += 1;
            }
            let width = x - start;

            if let Some(marker) = sheet.code_marker(start, baseline)? {
                code = Some(marker);
                log::info!("    Code offset changed: {}", Char(marker));
            }
            let Some(current) = code else {
                return Err(SheetError::CodeOverflow {
                    x: start,
                    y: baseline,
                });
            };
            let width_u8: u8 = width.try_into().map_err(|_| SheetError::TooWide {
                x: start,
                y: baseline,
                width,
            })?;
            let segments = sheet.segments(start, baseline, width, height, rows);
            font.insert(Char(current), Glyph::new(width_u8, segments))
                .map_err(SheetError::Font)?;
            log::debug!(
                "    Character defined: code={}, width={}",
                Char(current),
                width
            );
            code = current.checked_add(1);
        }
    }
    log::info!("    {} characters", font.len());
    Ok(font)
}
