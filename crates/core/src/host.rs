//! The image host: displayed images, their calibration records and selections
//!
//! [`ImageHost`] is the seam to whatever owns the images. The calibration
//! workflow and the annotators only talk to images through this trait.

use crate::geometry::{Line, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Unit name of an image that has never been calibrated
pub const UNCALIBRATED_UNIT: &str = "pixel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only facts about an open image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub id: ImageId,
    pub title: String,
    /// File the image was opened from, if any
    pub path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

/// Physical size of one pixel, as stored in an image's metadata
///
/// This is also the shape of the record saved beside a calibrated file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCalibration {
    pub unit: String,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl Default for ImageCalibration {
    fn default() -> Self {
        Self { unit: UNCALIBRATED_UNIT.to_owned(), pixel_width: 1.0, pixel_height: 1.0 }
    }
}

impl ImageCalibration {
    pub fn new(unit: impl Into<String>, pixel_width: f64, pixel_height: f64) -> Self {
        Self { unit: unit.into(), pixel_width, pixel_height }
    }

    /// False while the image still measures in raw pixels
    pub fn is_calibrated(&self) -> bool {
        self.unit != UNCALIBRATED_UNIT
    }
}

/// Shape family reported by the host for polygon selections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonKind {
    Rectangle,
    /// Rotated rectangles come back from some hosts as freehand outlines
    Freehand,
    Polygon,
    Oval,
}

/// A user-drawn region of interest
#[derive(Debug, Clone, PartialEq)]
pub enum Roi {
    Line(Line),
    Polygon { kind: PolygonKind, vertices: Vec<Point> },
}

impl Roi {
    pub fn type_name(&self) -> &'static str {
        match self {
            Roi::Line(_) => "Straight Line",
            Roi::Polygon { kind: PolygonKind::Rectangle, .. } => "Rectangle",
            Roi::Polygon { kind: PolygonKind::Freehand, .. } => "Freehand",
            Roi::Polygon { kind: PolygonKind::Polygon, .. } => "Polygon",
            Roi::Polygon { kind: PolygonKind::Oval, .. } => "Oval",
        }
    }
}

/// Operations the measurement tools need from the program displaying images
pub trait ImageHost {
    /// The image the user is working on
    fn current_image(&self) -> Result<ImageId, crate::HostError>;

    /// Every open image, read once per call
    fn open_images(&self) -> Vec<ImageId>;

    fn image_info(&self, id: ImageId) -> Result<ImageInfo, crate::HostError>;

    /// The calibration the image is displayed with: the global calibration
    /// when one is installed, otherwise the image's own record
    fn calibration(&self, id: ImageId) -> Result<ImageCalibration, crate::HostError>;

    /// Replace the image's own calibration record
    fn set_calibration(
        &mut self,
        id: ImageId,
        calibration: ImageCalibration,
    ) -> Result<(), crate::HostError>;

    fn global_calibration(&self) -> Option<ImageCalibration>;

    /// Install or clear the calibration shared by all images
    fn set_global_calibration(&mut self, calibration: Option<ImageCalibration>);

    fn roi(&self, id: ImageId) -> Result<Option<Roi>, crate::HostError>;

    /// Redraw the image so it reflects its current calibration
    fn refresh(&mut self, id: ImageId) -> Result<(), crate::HostError>;

    /// Ask the host to add its scale bar to the image
    fn add_scale_bar(&mut self, id: ImageId) -> Result<(), crate::HostError>;
}
