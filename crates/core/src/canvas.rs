use crate::geometry::{Line, Point};
use crate::style::RgbaColor;
use crate::text_place::TextSize;

/// Raster surface the annotators draw on
pub trait Canvas {
    /// Width and height in pixels
    fn size(&self) -> (u32, u32);

    /// Size `text` would occupy at `size_px`
    fn measure_text(&self, text: &str, size_px: u32) -> TextSize;

    fn draw_line(&mut self, line: &Line, thickness: f32, color: RgbaColor);

    /// Draw `text` with its left edge at `origin.x` and baseline at `origin.y`
    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        size_px: u32,
        color: RgbaColor,
        background: Option<RgbaColor>,
    );
}
