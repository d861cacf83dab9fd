//! Calibration entries and the providers that produce them
//!
//! A registry row is either a static calibration written in the settings
//! file or a provider object that derives the value from the image at
//! the moment the calibration is applied.

use crate::error::CalibrationError;
use crate::host::{ImageCalibration, ImageInfo};
use std::fmt;

/// A fully resolved calibration, immutable for one application
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationEntry {
    pub display_name: String,
    pub pixels_per_unit: f64,
    pub unit: String,
    /// `pixel_height = pixel_width * aspect_ratio`
    pub aspect_ratio: f64,
}

impl CalibrationEntry {
    pub fn new(
        display_name: impl Into<String>,
        pixels_per_unit: f64,
        unit: impl Into<String>,
        aspect_ratio: f64,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            pixels_per_unit,
            unit: unit.into(),
            aspect_ratio,
        }
    }

    /// Pixel dimensions for an image measured with this entry
    ///
    /// Fails instead of producing infinite or negative pixel sizes.
    pub fn to_image_calibration(&self) -> Result<ImageCalibration, CalibrationError> {
        if !(self.pixels_per_unit.is_finite() && self.pixels_per_unit > 0.0) {
            return Err(CalibrationError::NonPositiveScale {
                pixels_per_unit: self.pixels_per_unit,
            });
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(CalibrationError::NonPositiveAspect { aspect_ratio: self.aspect_ratio });
        }

        let pixel_width = 1.0 / self.pixels_per_unit;
        Ok(ImageCalibration {
            unit: self.unit.clone(),
            pixel_width,
            pixel_height: pixel_width * self.aspect_ratio,
        })
    }
}

/// What a provider derives from an image
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedCalibration {
    pub pixels_per_unit: f64,
    pub unit: String,
    pub aspect_ratio: f64,
}

/// A calibration whose value depends on the image it is applied to
pub trait CalibrationProvider: fmt::Debug {
    /// Name shown in the calibration menu
    fn display_name(&self) -> &str;

    fn compute_calibration(
        &self,
        image: &ImageInfo,
    ) -> Result<ComputedCalibration, CalibrationError>;
}

/// One row of the calibration registry
#[derive(Debug)]
pub enum CalibrationSource {
    Static(CalibrationEntry),
    Dynamic(Box<dyn CalibrationProvider>),
}

impl CalibrationSource {
    pub fn fixed(
        name: impl Into<String>,
        pixels_per_unit: f64,
        unit: impl Into<String>,
        aspect_ratio: f64,
    ) -> Self {
        Self::Static(CalibrationEntry::new(name, pixels_per_unit, unit, aspect_ratio))
    }

    pub fn provider(provider: impl CalibrationProvider + 'static) -> Self {
        Self::Dynamic(Box::new(provider))
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Static(entry) => &entry.display_name,
            Self::Dynamic(provider) => provider.display_name(),
        }
    }

    /// Text shown for this row in the selection menu
    ///
    /// Whole factors keep their decimal point (`4.0`, not `4`).
    pub fn label(&self) -> String {
        match self {
            Self::Static(entry) => format!(
                "{}      ({:?} pixels/{})",
                entry.display_name, entry.pixels_per_unit, entry.unit
            ),
            Self::Dynamic(provider) => provider.display_name().to_owned(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }

    /// Produce the entry to apply to `image`, running the provider if needed
    pub fn resolve(&self, image: &ImageInfo) -> Result<CalibrationEntry, CalibrationError> {
        match self {
            Self::Static(entry) => Ok(entry.clone()),
            Self::Dynamic(provider) => {
                let computed = provider.compute_calibration(image)?;
                log::debug!(
                    "{} computed {} pixels/{} for {}",
                    provider.display_name(),
                    computed.pixels_per_unit,
                    computed.unit,
                    image.title
                );
                Ok(CalibrationEntry {
                    display_name: provider.display_name().to_owned(),
                    pixels_per_unit: computed.pixels_per_unit,
                    unit: computed.unit,
                    aspect_ratio: computed.aspect_ratio,
                })
            }
        }
    }
}
