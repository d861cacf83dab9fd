//! Microscope measurement core
//!
//! Calibration selection and application, and calibrated line and
//! rectangle measurements drawn onto images. The program that displays
//! images is reached through [`ImageHost`]; pixels are drawn through
//! [`Canvas`].

pub mod annotate;
pub mod applier;
pub mod calibration;
pub mod canvas;
pub mod error;
pub mod geometry;
pub mod host;
pub mod jeol;
pub mod registry;
pub mod scale_bar;
pub mod selector;
pub mod style;
pub mod text_place;
pub mod workflow;

pub use annotate::{
    annotate_line, annotate_rectangle_long_axis, long_axis, LineMeasurement, LongAxis,
    RectangleMeasurement, RECTANGLE_TOLERANCE_PX,
};
pub use applier::{apply, Applied};
pub use calibration::{
    CalibrationEntry, CalibrationProvider, CalibrationSource, ComputedCalibration,
};
pub use canvas::Canvas;
pub use error::{CalibrationError, ComputeFailure, Error, HostError, Result, RoiError};
pub use geometry::{Line, Point, Quadrilateral};
pub use host::{
    ImageCalibration, ImageHost, ImageId, ImageInfo, PolygonKind, Roi, UNCALIBRATED_UNIT,
};
pub use jeol::JeolSemCalibration;
pub use registry::CalibrationRegistry;
pub use scale_bar::{draw_scale_bar, ScaleBar};
pub use selector::{CalibrationMenu, CalibrationSelector, ChoiceWidget, PresetSelector, Selection};
pub use style::{AnnotationStyle, RgbaColor, TextSide};
pub use text_place::{Placement, Quadrant, TextSize};
pub use workflow::{choose_calibration, Outcome};
