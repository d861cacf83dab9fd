//! Calibrated measurement annotations
//!
//! Two drawing modes share the style and the label placement:
//!
//! - a straight line with its length written next to its end point;
//! - the long axis of a rectangle: both short sides, a center line
//!   joining their midpoints, and the long-side length on the center line.

use crate::canvas::Canvas;
use crate::error::RoiError;
use crate::geometry::{Line, Point, Quadrilateral};
use crate::host::{ImageCalibration, PolygonKind, Roi};
use crate::style::AnnotationStyle;
use crate::text_place::{self, Placement, Quadrant};

/// Opposite sides may differ by at most this many pixels
pub const RECTANGLE_TOLERANCE_PX: f64 = 0.01;

/// What was drawn for a line measurement
#[derive(Debug, Clone, PartialEq)]
pub struct LineMeasurement {
    pub line: Line,
    /// Length in calibrated units
    pub length: f64,
    pub label: String,
    pub quadrant: Quadrant,
    pub label_position: Point,
}

/// Long axis of a rectangle selection
#[derive(Debug, Clone, PartialEq)]
pub struct LongAxis {
    /// The two short sides, one at each end of the long axis
    pub ends: [Line; 2],
    /// Joins the midpoints of the short sides
    pub center_line: Line,
    /// Long-side length in calibrated units
    pub length: f64,
}

/// What was drawn for a rectangle measurement
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleMeasurement {
    pub axis: LongAxis,
    pub label: String,
    pub label_position: Point,
}

/// Format a length with `decimals` places and the unit
pub fn length_label(length: f64, decimals: usize, unit: &str) -> String {
    format!("{length:.decimals$} {unit}")
}

/// The straight line selected on the image
pub fn selected_line(roi: Option<&Roi>) -> Result<Line, RoiError> {
    match roi {
        None => Err(RoiError::NoLine),
        Some(Roi::Line(line)) => Ok(*line),
        Some(other) => {
            log::debug!("expected a straight line, got {}", other.type_name());
            Err(RoiError::NotStraightLine)
        }
    }
}

/// The rectangle (or rotated rectangle) selected on the image
pub fn selected_rectangle(roi: Option<&Roi>) -> Result<Quadrilateral, RoiError> {
    let vertices = match roi {
        None => return Err(RoiError::NoRectangle),
        Some(Roi::Polygon { kind: PolygonKind::Rectangle | PolygonKind::Freehand, vertices }) => {
            vertices
        }
        Some(other) => {
            log::debug!("expected a rectangle, got {}", other.type_name());
            return Err(RoiError::NotRectangle);
        }
    };

    let quad = Quadrilateral::from_vertices(vertices).ok_or(RoiError::NotRectangle)?;
    if !quad.is_parallelogram(RECTANGLE_TOLERANCE_PX) {
        log::debug!("side lengths {:?} are not pairwise equal", quad.side_lengths());
        return Err(RoiError::NotRectangle);
    }
    Ok(quad)
}

/// Find the long axis of a parallelogram
///
/// Sides are compared as `l0` against `l1`; on a tie (a square) side 0-1 is
/// taken as the long side.
pub fn long_axis(quad: &Quadrilateral, calibration: &ImageCalibration) -> LongAxis {
    let [l0, l1, _, _] = quad.side_lengths();
    let v = quad.vertices;

    let (ends, center_line, long_side) = if l0 >= l1 {
        (
            [quad.side(1), quad.side(3)],
            Line::new(v[1].midpoint(&v[2]), v[3].midpoint(&v[0])),
            quad.side(0),
        )
    } else {
        (
            [quad.side(0), quad.side(2)],
            Line::new(v[0].midpoint(&v[1]), v[2].midpoint(&v[3])),
            quad.side(1),
        )
    };

    LongAxis {
        ends,
        center_line,
        length: long_side.scaled_length(calibration.pixel_width, calibration.pixel_height),
    }
}

/// Draw the selected straight line and its calibrated length
pub fn annotate_line<C: Canvas + ?Sized>(
    canvas: &mut C,
    roi: Option<&Roi>,
    calibration: &ImageCalibration,
    style: &AnnotationStyle,
) -> Result<LineMeasurement, RoiError> {
    let line = selected_line(roi)?;
    let length = line.scaled_length(calibration.pixel_width, calibration.pixel_height);
    let label = length_label(length, 3, &calibration.unit);
    log::debug!("line {:?} -> {label}", line);

    let drawn = Line::new(line.p1.truncated(), line.p2.truncated());
    canvas.draw_line(&drawn, style.line_thickness, style.line_color);

    let quadrant = Quadrant::for_line(&line, style.text_side);
    let label_position = draw_label(canvas, &label, drawn.p2, Placement::Quadrant(quadrant), style);

    Ok(LineMeasurement { line, length, label, quadrant, label_position })
}

/// Draw the long axis of the selected rectangle and its calibrated length
pub fn annotate_rectangle_long_axis<C: Canvas + ?Sized>(
    canvas: &mut C,
    roi: Option<&Roi>,
    calibration: &ImageCalibration,
    style: &AnnotationStyle,
) -> Result<RectangleMeasurement, RoiError> {
    if !calibration.is_calibrated() {
        log::warn!("no calibration set, measuring in pixels");
    }

    let quad = selected_rectangle(roi)?;
    let axis = long_axis(&quad, calibration);
    let label = length_label(axis.length, 1, &calibration.unit);

    for line in axis.ends.iter().chain(std::iter::once(&axis.center_line)) {
        canvas.draw_line(line, style.line_thickness, style.line_color);
    }

    let anchor = axis.center_line.midpoint();
    let label_position = draw_label(canvas, &label, anchor, Placement::Centered, style);

    Ok(RectangleMeasurement { axis, label, label_position })
}

/// Place and draw a label, returning its origin
pub(crate) fn draw_label<C: Canvas + ?Sized>(
    canvas: &mut C,
    label: &str,
    anchor: Point,
    placement: Placement,
    style: &AnnotationStyle,
) -> Point {
    let text = canvas.measure_text(label, style.text_size);
    let origin = text_place::place(anchor, placement, text, canvas.size());
    canvas.draw_text(label, origin, style.text_size, style.text_color, style.text_background_color);
    origin
}
