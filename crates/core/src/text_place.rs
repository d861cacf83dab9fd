//! Label placement with edge clamping
//!
//! Positions are the left edge and baseline of the text, in pixels.
//! The text occupies `x..x + width` horizontally and `y - height..y`
//! vertically.

use crate::geometry::{Line, Point};
use crate::style::TextSide;
use std::fmt;

/// Gap between the anchor point and the label
pub const SPACER_PX: f64 = 4.0;

/// Minimum distance between a clamped label and the image edge
pub const MARGIN_PX: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Right,
}

/// Corner of the anchor a label is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quadrant {
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

impl Quadrant {
    pub const fn new(vertical: Vertical, horizontal: Horizontal) -> Self {
        Self { vertical, horizontal }
    }

    /// Quadrant beyond the end point `p2` of a drawn line
    ///
    /// For vertical lines the horizontal side comes from `side`.
    pub fn for_line(line: &Line, side: TextSide) -> Self {
        let (p1, p2) = (line.p1.truncated(), line.p2.truncated());

        let vertical = if p2.y > p1.y { Vertical::Bottom } else { Vertical::Top };
        let horizontal = if p2.x > p1.x {
            Horizontal::Right
        } else if p2.x < p1.x {
            Horizontal::Left
        } else {
            match side {
                TextSide::Left => Horizontal::Left,
                TextSide::Right => Horizontal::Right,
            }
        };

        Self { vertical, horizontal }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertical = match self.vertical {
            Vertical::Top => "top",
            Vertical::Bottom => "bottom",
        };
        let horizontal = match self.horizontal {
            Horizontal::Left => "left",
            Horizontal::Right => "right",
        };
        write!(f, "{vertical} {horizontal}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Next to the anchor, on the given corner
    Quadrant(Quadrant),
    /// Centered horizontally and vertically on the anchor
    Centered,
}

/// Rendered size of a label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSize {
    pub width: f64,
    pub height: f64,
}

/// Compute where to draw a label so that it stays inside the canvas
///
/// The offset for the placement is applied first; clamping then replaces
/// the coordinate on any edge the label would cross.
pub fn place(anchor: Point, placement: Placement, text: TextSize, canvas: (u32, u32)) -> Point {
    let (canvas_w, canvas_h) = (f64::from(canvas.0), f64::from(canvas.1));
    let (mut x, mut y) = (anchor.x, anchor.y);

    match placement {
        Placement::Quadrant(quadrant) => {
            match quadrant.vertical {
                Vertical::Bottom => y += SPACER_PX + text.height,
                Vertical::Top => y -= SPACER_PX,
            }
            match quadrant.horizontal {
                Horizontal::Right => x += SPACER_PX,
                Horizontal::Left => x -= SPACER_PX + text.width,
            }
        }
        Placement::Centered => {
            x -= text.width * 0.5;
            y += text.height * 0.5;
        }
    }

    if y - text.height < 0.0 {
        y = text.height + MARGIN_PX;
    } else if y > canvas_h {
        y = canvas_h - MARGIN_PX;
    }

    if x < 0.0 {
        x = MARGIN_PX;
    } else if x + text.width > canvas_w {
        x = canvas_w - text.width - MARGIN_PX;
    }

    log::debug!("label at ({x}, {y}) for anchor ({}, {}) {placement:?}", anchor.x, anchor.y);
    Point::new(x, y)
}
