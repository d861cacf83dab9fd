//! Scale bar drawn into the bottom-right corner of an image

use crate::annotate::length_label;
use crate::canvas::Canvas;
use crate::geometry::{Line, Point};
use crate::host::ImageCalibration;
use crate::style::AnnotationStyle;
use crate::text_place::{self, Placement, SPACER_PX};

/// Distance from the right and bottom edges to the bar
pub const BAR_INSET_PX: f64 = 20.0;

/// The bar is at most this fraction of the image width
pub const MAX_WIDTH_FRACTION: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    /// Physical length in calibrated units
    pub length: f64,
    pub line: Line,
    pub label: String,
    pub label_position: Point,
}

/// Largest 1, 2 or 5 times a power of ten not exceeding `max`
pub fn nice_length(max: f64) -> Option<f64> {
    if !max.is_finite() || max <= 0.0 {
        return None;
    }
    let exponent = max.log10().floor() as i32;
    let base = 10f64.powi(exponent);
    [5.0, 2.0, 1.0]
        .into_iter()
        .map(|m| m * base)
        .find(|&len| len <= max)
        .or(Some(base))
}

/// Decimal places needed to print a nice length without trailing noise
fn decimals_for(length: f64) -> usize {
    let exponent = length.log10().floor() as i32;
    usize::try_from(-exponent).unwrap_or(0)
}

/// Draw a scale bar sized for the canvas; `None` if the image is too
/// narrow to hold one
pub fn draw_scale_bar<C: Canvas + ?Sized>(
    canvas: &mut C,
    calibration: &ImageCalibration,
    style: &AnnotationStyle,
) -> Option<ScaleBar> {
    let (width, height) = canvas.size();
    let (width, height) = (f64::from(width), f64::from(height));

    if !calibration.is_calibrated() {
        log::warn!("scale bar on an uncalibrated image is in pixels");
    }

    let physical_width = width * calibration.pixel_width;
    let length = nice_length(physical_width * MAX_WIDTH_FRACTION)?;
    let length_px = length / calibration.pixel_width;

    let y = height - BAR_INSET_PX;
    let x2 = width - BAR_INSET_PX;
    let line = Line::new(Point::new(x2 - length_px, y), Point::new(x2, y));
    if line.p1.x < 0.0 || y < 0.0 {
        log::debug!("image {width}x{height} too small for a {length_px} px scale bar");
        return None;
    }

    let label = length_label(length, decimals_for(length), &calibration.unit);
    let text = canvas.measure_text(&label, style.text_size);

    // baseline sits just above the stroke
    let baseline = y - f64::from(style.line_thickness) * 0.5 - SPACER_PX;
    let anchor = Point::new(line.midpoint().x, baseline - text.height * 0.5);
    let label_position = text_place::place(anchor, Placement::Centered, text, canvas.size());

    canvas.draw_line(&line, style.line_thickness, style.line_color);
    canvas.draw_text(
        &label,
        label_position,
        style.text_size,
        style.text_color,
        style.text_background_color,
    );
    log::debug!("scale bar {label} ({length_px} px)");

    Some(ScaleBar { length, line, label, label_position })
}
