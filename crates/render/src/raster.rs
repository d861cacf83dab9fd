//! Drawing annotations into an `RgbaImage`
//!
//! Strokes and filled boxes go through tiny-skia; glyphs come from the
//! bitmap font in [`crate::text`].

use image::RgbaImage;
use mscope_core::{Canvas, Line, Point, RgbaColor, TextSize};
use tiny_skia::{LineCap, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::text::{draw_bitmap_text, glyph_scale, text_extent};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    img.copy_from_slice(pixmap.data());
}

fn paint_for(color: RgbaColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// [`Canvas`] over the pixels of one image
#[derive(Debug)]
pub struct RasterCanvas<'a> {
    img: &'a mut RgbaImage,
}

impl<'a> RasterCanvas<'a> {
    pub fn new(img: &'a mut RgbaImage) -> Self {
        Self { img }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: RgbaColor) {
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let paint = paint_for(color);
        with_pixmap(self.img, |pixmap| {
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        });
    }
}

impl Canvas for RasterCanvas<'_> {
    fn size(&self) -> (u32, u32) {
        (self.img.width(), self.img.height())
    }

    fn measure_text(&self, text: &str, size_px: u32) -> TextSize {
        let (width, height) = text_extent(text, size_px);
        TextSize { width: f64::from(width), height: f64::from(height) }
    }

    fn draw_line(&mut self, line: &Line, thickness: f32, color: RgbaColor) {
        let mut pb = PathBuilder::new();
        pb.move_to(line.p1.x as f32, line.p1.y as f32);
        pb.line_to(line.p2.x as f32, line.p2.y as f32);
        let Some(path) = pb.finish() else {
            log::debug!("skipping degenerate line {line:?}");
            return;
        };

        let paint = paint_for(color);
        let stroke = Stroke { width: thickness, line_cap: LineCap::Butt, ..Default::default() };
        with_pixmap(self.img, |pixmap| {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        });
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        size_px: u32,
        color: RgbaColor,
        background: Option<RgbaColor>,
    ) {
        let (width, height) = text_extent(text, size_px);
        let top = origin.y - f64::from(height);

        if let Some(background) = background {
            let pad = glyph_scale(size_px) as f32;
            self.fill_rect(
                origin.x as f32 - pad,
                top as f32 - pad,
                width as f32 + 2.0 * pad,
                height as f32 + 2.0 * pad,
                background,
            );
        }

        draw_bitmap_text(
            self.img,
            origin.x.round() as i64,
            top.round() as i64,
            text,
            size_px,
            color.to_rgba_u8(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use mscope_core::{annotate_line, AnnotationStyle, Roi};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: RgbaColor = RgbaColor::new(1.0, 0.0, 0.0, 1.0);

    fn is_red(px: &Rgba<u8>) -> bool {
        px[0] > 200 && px[1] < 60 && px[2] < 60
    }

    #[test]
    fn stroke_covers_the_line() {
        let mut img = RgbaImage::from_pixel(40, 40, WHITE);
        let mut canvas = RasterCanvas::new(&mut img);

        canvas.draw_line(&Line::new(Point::new(5.0, 20.0), Point::new(35.0, 20.0)), 4.0, RED);

        assert!(is_red(img.get_pixel(20, 20)));
        assert_eq!(img.get_pixel(20, 5), &WHITE);
        assert_eq!(img.get_pixel(2, 20), &WHITE);
    }

    #[test]
    fn text_sits_above_the_baseline() {
        let mut img = RgbaImage::from_pixel(60, 40, WHITE);
        let mut canvas = RasterCanvas::new(&mut img);

        canvas.draw_text("II", Point::new(10.0, 30.0), 16, RED, None);

        let painted: Vec<(u32, u32)> =
            img.enumerate_pixels().filter(|(_, _, px)| is_red(px)).map(|(x, y, _)| (x, y)).collect();
        assert!(!painted.is_empty());
        assert!(painted.iter().all(|&(x, y)| (10..42).contains(&x) && (14..30).contains(&y)));
    }

    #[test]
    fn background_box_surrounds_text() {
        let mut img = RgbaImage::from_pixel(60, 40, WHITE);
        let mut canvas = RasterCanvas::new(&mut img);
        let black = RgbaColor::new(0.0, 0.0, 0.0, 1.0);

        canvas.draw_text("II", Point::new(10.0, 30.0), 16, RED, Some(black));

        // padding is one glyph pixel (2 px at this size)
        assert_eq!(img.get_pixel(9, 13), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(5, 13), &WHITE);
    }

    #[test]
    fn measure_matches_drawn_extent() {
        let mut img = RgbaImage::from_pixel(10, 10, WHITE);
        let canvas = RasterCanvas::new(&mut img);

        assert_eq!(canvas.measure_text("abc", 30), TextSize { width: 96.0, height: 32.0 });
        assert_eq!(canvas.size(), (10, 10));
    }

    #[test]
    fn annotates_a_line_in_pixels() {
        let mut img = RgbaImage::from_pixel(200, 120, WHITE);
        let roi = Roi::Line(Line::new(Point::new(20.0, 60.0), Point::new(120.0, 60.0)));
        let style = AnnotationStyle::default();

        let m = annotate_line(
            &mut RasterCanvas::new(&mut img),
            Some(&roi),
            &mscope_core::ImageCalibration::default(),
            &style,
        )
        .unwrap();

        assert_eq!(m.label, "100.000 pixel");
        assert_ne!(img.get_pixel(70, 60), &WHITE);
    }
}
