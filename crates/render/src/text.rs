//! Bitmap text from the 8x8 font, scaled by whole pixels

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

const GLYPH_PX: u32 = 8;

/// Integer scale giving glyphs closest to `size_px` tall
pub fn glyph_scale(size_px: u32) -> u32 {
    ((size_px + GLYPH_PX / 2) / GLYPH_PX).max(1)
}

/// Width and height of `text` in pixels
pub fn text_extent(text: &str, size_px: u32) -> (u32, u32) {
    let scale = glyph_scale(size_px);
    let chars = text.chars().count() as u32;
    (chars * GLYPH_PX * scale, GLYPH_PX * scale)
}

/// Source-over blend of a straight-alpha color onto a pixel
pub(crate) fn blend_pixel(dst: Rgba<u8>, src: [u8; 4]) -> Rgba<u8> {
    let a = f64::from(src[3]) / 255.0;
    if a <= 0.0 {
        return dst;
    }
    let inv = 1.0 - a;
    let mix = |d: u8, s: u8| (f64::from(d) * inv + f64::from(s) * a).round().clamp(0.0, 255.0) as u8;
    let out_a = (f64::from(dst[3]) + f64::from(src[3]) * inv).round().clamp(0.0, 255.0) as u8;
    Rgba([mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2]), out_a])
}

/// Draw `text` with its top-left corner at (`x`, `y`); pixels off the
/// image are skipped
pub fn draw_bitmap_text(img: &mut RgbaImage, x: i64, y: i64, text: &str, size_px: u32, color: [u8; 4]) {
    let scale = i64::from(glyph_scale(size_px));
    let (width, height) = (i64::from(img.width()), i64::from(img.height()));
    let mut cursor_x = x;

    for ch in text.chars() {
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            cursor_x += i64::from(GLYPH_PX) * scale;
            continue;
        };

        for (row_idx, &row_bits) in glyph.iter().enumerate() {
            for col_idx in 0..GLYPH_PX {
                if (row_bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + i64::from(col_idx) * scale;
                let py = y + row_idx as i64 * scale;
                for ty in py..py + scale {
                    for tx in px..px + scale {
                        if tx < 0 || ty < 0 || tx >= width || ty >= height {
                            continue;
                        }
                        let (tx, ty) = (tx as u32, ty as u32);
                        let dst = *img.get_pixel(tx, ty);
                        img.put_pixel(tx, ty, blend_pixel(dst, color));
                    }
                }
            }
        }
        cursor_x += i64::from(GLYPH_PX) * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_rounds_to_nearest_glyph_size() {
        assert_eq!(glyph_scale(30), 4);
        assert_eq!(glyph_scale(16), 2);
        assert_eq!(glyph_scale(3), 1);
    }

    #[test]
    fn extent_counts_characters() {
        assert_eq!(text_extent("5.000 um", 16), (128, 16));
        assert_eq!(text_extent("", 16), (0, 16));
    }

    #[test]
    fn half_transparent_blend() {
        let out = blend_pixel(Rgba([0, 0, 0, 255]), [255, 255, 255, 128]);
        assert_eq!(out, Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn glyph_pixels_are_painted_inside_the_box() {
        let mut img = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        draw_bitmap_text(&mut img, 2, 2, "H", 8, [0, 0, 0, 255]);

        let painted: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, px)| px[0] == 0)
            .map(|(x, y, _)| (x, y))
            .collect();

        assert!(!painted.is_empty());
        assert!(painted.iter().all(|&(x, y)| (2..10).contains(&x) && (2..10).contains(&y)));
    }

    #[test]
    fn text_off_the_image_is_clipped() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        draw_bitmap_text(&mut img, -50, -50, "clip", 8, [0, 0, 0, 255]);

        assert!(img.pixels().all(|px| px[0] == 255));
    }
}
