use super::surface::{Rgba, Surface};

pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;
pub const TEXT_SCALE: i32 = 2;
pub const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;
pub const LINE_ADVANCE: i32 = (GLYPH_HEIGHT + 2) * TEXT_SCALE;

const FALLBACK_CHAR: char = '?';

// 3x5 bitmap font for printable ASCII, one u16 per glyph: rows top to bottom, three bits
// each, most significant row first.
const ASCII_GLYPHS: [u16; 95] = [
    0x0000, 0x2482, 0x5a00, 0x5f7d, 0x7ddf, 0x52a5, 0x2aab, 0x2400, //
    0x1491, 0x4494, 0x0aa8, 0x05d0, 0x0014, 0x01c0, 0x0002, 0x12a4, //
    0x7b6f, 0x2c97, 0x73e7, 0x73cf, 0x5bc9, 0x79cf, 0x79ef, 0x7292, //
    0x7bef, 0x7bcf, 0x0410, 0x0414, 0x1511, 0x0e38, 0x4454, 0x72c2, //
    0x7be7, 0x2bed, 0x6bae, 0x7927, 0x6b6e, 0x79a7, 0x79a4, 0x796f, //
    0x5bed, 0x7497, 0x726f, 0x5bad, 0x4927, 0x5fed, 0x5ffd, 0x7b6f, //
    0x6ba4, 0x7b79, 0x6bad, 0x79cf, 0x7492, 0x5b6f, 0x5b6a, 0x5bfd, //
    0x5aad, 0x5a92, 0x72a7, 0x6926, 0x4889, 0x324b, 0x2a00, 0x0007, //
    0x4400, 0x0e7f, 0x49ae, 0x0f27, 0x13ef, 0x0fa7, 0x39a4, 0x0f79, //
    0x49ad, 0x2092, 0x106a, 0x4bad, 0x4927, 0x0ded, 0x0d6d, 0x0f6f, //
    0x0d74, 0x0f79, 0x0d64, 0x0f8f, 0x2e93, 0x0b6f, 0x0b6a, 0x0b7a, //
    0x0a95, 0x0b79, 0x0e57, 0x3593, 0x2492, 0x64d6, 0x0780,
];

pub fn text_width_px(chars: usize) -> i32 {
    chars as i32 * GLYPH_ADVANCE
}

/// Draws `text` with its top-left corner at (`x`, `y`). Characters outside printable
/// ASCII render as `?`.
pub fn draw_text(surface: &mut Surface, mut x: i32, y: i32, text: &str, color: Rgba) {
    for ch in text.chars() {
        draw_glyph(surface, x, y, glyph_bits(ch), color);
        x += GLYPH_ADVANCE;
    }
}

/// Like [`draw_text`] but stops before the first glyph that would cross `max_width`.
pub fn draw_text_fitted(
    surface: &mut Surface,
    x: i32,
    y: i32,
    text: &str,
    max_width: i32,
    color: Rgba,
) {
    let fits = (max_width / GLYPH_ADVANCE).max(0) as usize;
    let clipped: String = text.chars().take(fits).collect();
    draw_text(surface, x, y, &clipped, color);
}

fn glyph_bits(ch: char) -> u16 {
    match ch {
        ' '..='~' => ASCII_GLYPHS[ch as usize - ' ' as usize],
        _ => ASCII_GLYPHS[FALLBACK_CHAR as usize - ' ' as usize],
    }
}

fn draw_glyph(surface: &mut Surface, x: i32, y: i32, bits: u16, color: Rgba) {
    for row in 0..GLYPH_HEIGHT {
        let row_bits = (bits >> ((GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH)) & 0b111;
        for col in 0..GLYPH_WIDTH {
            if row_bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            surface.fill_rect(
                x + col * TEXT_SCALE,
                y + row * TEXT_SCALE,
                TEXT_SCALE,
                TEXT_SCALE,
                color,
            );
        }
    }
}
