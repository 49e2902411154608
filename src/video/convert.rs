//! Raw RGB24 frame → ASCII text.

use std::fmt::Write as _;

const RAMP: &[u8] = b" .:-=+*#%@";

/// 256-entry luma → glyph table.
#[derive(Debug, Clone)]
pub struct GlyphTable {
    lut: [u8; 256],
}

impl Default for GlyphTable {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphTable {
    pub fn new() -> Self {
        let mut lut = [b' '; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = RAMP[(i * (RAMP.len() - 1)) >> 8];
        }
        Self { lut }
    }

    pub fn glyph(&self, r: u8, g: u8, b: u8) -> char {
        self.lut[usize::from(luma(r, g, b))] as char
    }
}

/// Integer Rec.709-ish luma.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((54 * u32::from(r) + 183 * u32::from(g) + 19 * u32::from(b)) >> 8) as u8
}

/// Per-pixel 24-bit colored glyphs; each row ends with a reset and newline.
pub fn to_color_ascii(frame: &[u8], cols: usize, rows: usize, table: &GlyphTable) -> String {
    let mut out = String::with_capacity(cols * rows * 20);
    for row in frame.chunks_exact(cols * 3).take(rows) {
        for px in row.chunks_exact(3) {
            let (r, g, b) = (px[0], px[1], px[2]);
            let _ = write!(out, "\x1b[38;2;{r};{g};{b}m{}", table.glyph(r, g, b));
        }
        out.push_str("\x1b[0m\n");
    }
    out
}

/// Plain glyphs; each row ends with a newline.
pub fn to_mono_ascii(frame: &[u8], cols: usize, rows: usize, table: &GlyphTable) -> String {
    let mut out = String::with_capacity((cols + 1) * rows);
    for row in frame.chunks_exact(cols * 3).take(rows) {
        out.extend(row.chunks_exact(3).map(|px| table.glyph(px[0], px[1], px[2])));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_spans_the_ramp() {
        let table = GlyphTable::new();
        assert_eq!(table.glyph(0, 0, 0), ' ');
        assert_eq!(table.glyph(255, 255, 255), '%');
        assert_eq!(table.lut[128], RAMP[4]);
    }

    #[test]
    fn luma_weights_green_heaviest() {
        assert_eq!(luma(0, 0, 0), 0);
        assert!(luma(0, 255, 0) > luma(255, 0, 0));
        assert!(luma(255, 0, 0) > luma(0, 0, 255));
        assert_eq!(luma(255, 255, 255), 255);
    }

    #[test]
    fn mono_frame_has_one_line_per_row() {
        let table = GlyphTable::new();
        let frame = vec![0u8; 4 * 3 * 3];
        let text = to_mono_ascii(&frame, 4, 3, &table);
        assert_eq!(text, "    \n    \n    \n");
    }

    #[test]
    fn color_frame_wraps_each_pixel() {
        let table = GlyphTable::new();
        let frame = [255u8, 255, 255, 0, 0, 0];
        let text = to_color_ascii(&frame, 2, 1, &table);
        assert_eq!(
            text,
            "\x1b[38;2;255;255;255m%\x1b[38;2;0;0;0m \x1b[0m\n"
        );
    }
}
