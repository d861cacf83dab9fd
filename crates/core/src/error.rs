use crate::host::ImageId;
use std::path::PathBuf;

/// Why a calibration provider could not derive a value from its source
#[derive(Debug, thiserror::Error)]
pub enum ComputeFailure {
    #[error("file not found")]
    NotFound,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("directive {0} not found")]
    MissingDirective(&'static str),
    #[error("directive {directive} has an unusable value {value:?}")]
    MalformedDirective { directive: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("could not compute calibration from {}", path.display())]
    Compute {
        path: PathBuf,
        #[source]
        reason: ComputeFailure,
    },
    #[error("image was not opened from a file, so no calibration can be derived from it")]
    NoSourceFile,
    #[error("pixels per unit must be positive, got {pixels_per_unit}")]
    NonPositiveScale { pixels_per_unit: f64 },
    #[error("aspect ratio must be positive, got {aspect_ratio}")]
    NonPositiveAspect { aspect_ratio: f64 },
}

impl CalibrationError {
    pub fn compute(path: impl Into<PathBuf>, reason: ComputeFailure) -> Self {
        Self::Compute { path: path.into(), reason }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoiError {
    #[error("no line selected on the image")]
    NoLine,
    #[error("no rectangle selected on the image")]
    NoRectangle,
    #[error("selection is not a straight line")]
    NotStraightLine,
    #[error("selection is not a rectangle")]
    NotRectangle,
}

impl RoiError {
    /// Text shown to the user in the dismissable message
    pub fn user_message(&self) -> &'static str {
        match self {
            RoiError::NoLine | RoiError::NotStraightLine => "Please draw a straight-line first!",
            RoiError::NoRectangle => "Draw a rectangle first!",
            RoiError::NotRectangle => "Invalid shape - please draw a rectangle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("no image is open")]
    NoImage,
    #[error("unknown image {0}")]
    UnknownImage(ImageId),
}

/// Any failure of a user-triggered action
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Roi(#[from] RoiError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("calibration {index} does not exist (registry has {len})")]
    InvalidSelection { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
