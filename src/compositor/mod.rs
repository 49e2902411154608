//! ASCII visualizer compositing.
//!
//! A station mask is a fixed glyph template. Each frame, mask cells that sit
//! under a column's bar are replaced by [`FILL_GLYPH`], and every row is tinted
//! with a vertical gradient picked by the station's icon key.

mod masks;

pub use masks::{DEFAULT_MASK, EASTER_EGG, EBSM_MASK, REKTORY_MASK, REKT_MASK};

use std::fmt::Write as _;

/// Glyph painted where a bar covers the mask.
pub const FILL_GLYPH: char = '░';

/// Gradient used for stations without their own palette.
pub const DEFAULT_GRADIENT: Gradient = Gradient {
    top: Rgb(0xff, 0x38, 0x6f),
    bottom: Rgb(0x7d, 0x3c, 0xff),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb`; anything else is black.
    pub fn from_hex(hex: &str) -> Self {
        let parse = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
                .unwrap_or(0)
        };
        if hex.len() == 7 && hex.starts_with('#') {
            Rgb(parse(1..3), parse(3..5), parse(5..7))
        } else {
            Rgb(0, 0, 0)
        }
    }
}

/// Linear top-to-bottom color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub top: Rgb,
    pub bottom: Rgb,
}

impl Gradient {
    pub fn from_hex(top: &str, bottom: &str) -> Self {
        Self {
            top: Rgb::from_hex(top),
            bottom: Rgb::from_hex(bottom),
        }
    }

    /// Color of row `y` in a block `height` rows tall.
    pub fn at(&self, y: usize, height: usize) -> Rgb {
        let t = if height > 1 {
            y as f32 / (height - 1) as f32
        } else {
            0.0
        };
        let lerp = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t) as u8;
        Rgb(
            lerp(self.top.0, self.bottom.0),
            lerp(self.top.1, self.bottom.1),
            lerp(self.top.2, self.bottom.2),
        )
    }
}

/// Station palette by icon key, falling back to [`DEFAULT_GRADIENT`].
pub fn palette_for(icon_key: &str) -> Gradient {
    let (top, bottom) = match icon_key {
        "nrfm" => ("#ff386f", "#d52d2d"),
        "darksynth" => ("#af0000", "#ff0000"),
        "chillsynth" => ("#00ced1", "#ffcba6"),
        "datawave" => ("#ffe696", "#ffa200"),
        "ebsm" => ("#ffffff", "#666666"),
        "horrorsynth" => ("#a200ff", "#5503cf"),
        "rekt" => ("#ffffff", "#f31111"),
        "rektory" => ("#ffffff", "#ff386f"),
        "spacesynth" => ("#08637a", "#aa1149"),
        _ => return DEFAULT_GRADIENT,
    };
    Gradient::from_hex(top, bottom)
}

/// A parsed glyph template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    rows: Vec<Vec<char>>,
    width: usize,
}

impl Mask {
    /// Split on `\n`; a trailing newline yields a final empty row.
    pub fn parse(text: &str) -> Self {
        let rows: Vec<Vec<char>> = text.split('\n').map(|line| line.chars().collect()).collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    /// Mask for a station icon key.
    pub fn for_station(icon_key: &str) -> Self {
        Self::parse(match icon_key {
            "rekt" => REKT_MASK,
            "rektory" => REKTORY_MASK,
            "ebsm" => EBSM_MASK,
            _ => DEFAULT_MASK,
        })
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

/// One composited line and the color it is drawn in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRow {
    pub text: String,
    pub color: Rgb,
}

/// Paint `bars` onto `mask`. Cell `(x, y)` is filled when it is not a space and
/// `bars[x] >= height - y`; columns without a bar are left untouched.
pub fn composite(mask: &Mask, bars: &[usize], gradient: &Gradient) -> Vec<CompositeRow> {
    let height = mask.height();
    mask.rows
        .iter()
        .enumerate()
        .map(|(y, row)| {
            let text = row
                .iter()
                .enumerate()
                .map(|(x, glyph)| match bars.get(x) {
                    Some(bar) if *glyph != ' ' && *bar >= height - y => FILL_GLYPH,
                    _ => *glyph,
                })
                .collect();
            CompositeRow {
                text,
                color: gradient.at(y, height),
            }
        })
        .collect()
}

/// 24-bit ANSI rendering of composited rows, joined with `\n`.
pub fn render_ansi(rows: &[CompositeRow]) -> String {
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let Rgb(r, g, b) = row.color;
        let _ = write!(out, "\x1b[38;2;{r};{g};{b}m{}\x1b[0m", row.text);
    }
    out
}

/// Mask, palette and bar geometry for the station currently shown.
#[derive(Debug, Clone)]
pub struct AsciiCompositor {
    mask: Mask,
    gradient: Gradient,
}

impl AsciiCompositor {
    pub fn for_station(icon_key: &str) -> Self {
        Self {
            mask: Mask::for_station(icon_key),
            gradient: palette_for(icon_key),
        }
    }

    /// The frame as 24-bit ANSI text, one line per mask row.
    pub fn render(&self, bars: &[usize]) -> String {
        render_ansi(&composite(&self.mask, bars, &self.gradient))
    }
}

/// Bar count and row count the visualizer runs at, taken from the default mask.
pub fn visualizer_geometry() -> (usize, usize) {
    let mask = Mask::parse(DEFAULT_MASK);
    (mask.width(), mask.height())
}
