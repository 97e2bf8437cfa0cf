use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

use super::draw::fill_rect;

/// Each 8x8 glyph is blown up to 16x16 so the label reads at map scale
pub const GLYPH_SCALE: u32 = 2;
const GLYPH_CELL: u32 = 8;

/// Pixel size of `text` when drawn with `draw_text`
pub fn text_size(text: &str) -> (u32, u32) {
    let advance = GLYPH_CELL * GLYPH_SCALE;
    (text.chars().count() as u32 * advance, advance)
}

/// Draw `text` with its top-left corner at `(left, top)`.
/// Characters outside the basic Latin set are left blank.
pub fn draw_text(canvas: &mut RgbaImage, text: &str, left: i64, top: i64, color: Rgba<u8>) {
    let scale = GLYPH_SCALE as i64;
    let advance = (GLYPH_CELL * GLYPH_SCALE) as i64;

    for (index, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let origin_x = left + index as i64 * advance;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_CELL as i64 {
                // Bit 0 is the leftmost pixel of the row
                if bits & (1 << col) != 0 {
                    fill_rect(
                        canvas,
                        origin_x + col * scale,
                        top + row as i64 * scale,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
    }
}
