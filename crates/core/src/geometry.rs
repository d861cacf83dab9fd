//! Pixel-space geometry for measurement annotations
//!
//! All coordinates are image pixels with the origin at the top-left
//! corner and y growing downwards.


/// A point in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between this point and another
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Drop the fractional part of both coordinates
    pub fn truncated(&self) -> Point {
        Point::new(self.x.trunc(), self.y.trunc())
    }
}

/// A straight segment from `p1` to `p2`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
}

impl Line {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// Length in pixels
    pub fn length(&self) -> f64 {
        self.p1.distance_to(&self.p2)
    }

    pub fn midpoint(&self) -> Point {
        self.p1.midpoint(&self.p2)
    }

    /// Length in physical units, scaling each axis by its own pixel size
    pub fn scaled_length(&self, pixel_width: f64, pixel_height: f64) -> f64 {
        let dx = (self.p2.x - self.p1.x) * pixel_width;
        let dy = (self.p2.y - self.p1.y) * pixel_height;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Four vertices in drawing order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral {
    pub vertices: [Point; 4],
}

impl Quadrilateral {
    /// Build from a vertex list; `None` unless there are exactly four
    pub fn from_vertices(vertices: &[Point]) -> Option<Self> {
        let vertices: [Point; 4] = vertices.try_into().ok()?;
        Some(Self { vertices })
    }

    /// Side `i` runs from vertex `i` to vertex `i + 1`, wrapping
    pub fn side(&self, i: usize) -> Line {
        Line::new(self.vertices[i % 4], self.vertices[(i + 1) % 4])
    }

    /// Lengths of the four sides `l0..l3`
    pub fn side_lengths(&self) -> [f64; 4] {
        [0, 1, 2, 3].map(|i| self.side(i).length())
    }

    /// Whether both pairs of opposite sides match within `tolerance` pixels
    pub fn is_parallelogram(&self, tolerance: f64) -> bool {
        let [l0, l1, l2, l3] = self.side_lengths();
        (l0 - l2).abs() <= tolerance && (l1 - l3).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_four_five_line() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert_eq!(line.length(), 5.0);
        assert_eq!(line.scaled_length(1.0, 1.0), 5.0);
        assert_eq!(line.scaled_length(2.0, 2.0), 10.0);
    }

    #[test]
    fn scaled_length_respects_axis_scales() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(0.0, 10.0));
        assert_eq!(line.scaled_length(1.0, 0.5), 5.0);
    }

    #[test]
    fn midpoint_and_truncation() {
        let p = Point::new(1.0, 2.0).midpoint(&Point::new(4.0, 7.0));
        assert_eq!(p, Point::new(2.5, 4.5));
        assert_eq!(p.truncated(), Point::new(2.0, 4.0));
    }

    #[test]
    fn quadrilateral_requires_four_vertices() {
        let three = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        assert!(Quadrilateral::from_vertices(&three).is_none());
    }

    #[test]
    fn side_lengths_wrap_around() {
        let quad = Quadrilateral::from_vertices(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 4.0),
            Point::new(0.0, 4.0),
        ])
        .unwrap();

        assert_eq!(quad.side_lengths(), [10.0, 4.0, 10.0, 4.0]);
        assert!(quad.is_parallelogram(0.01));
    }

    #[test]
    fn generic_quadrilateral_is_not_a_parallelogram() {
        let quad = Quadrilateral::from_vertices(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(8.0, 4.0),
            Point::new(0.0, 4.0),
        ])
        .unwrap();

        assert!(!quad.is_parallelogram(0.01));
    }
}
