//! Drawing style for measurement annotations

use serde::{Deserialize, Serialize};

/// Straight RGBA color with components in `0.0..=1.0`
///
/// Serialized as `[r, g, b, a]`; `a = 1.0` is fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct RgbaColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl RgbaColor {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to 8-bit channels, clamping out-of-range components
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

impl From<[f32; 4]> for RgbaColor {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<RgbaColor> for [f32; 4] {
    fn from(c: RgbaColor) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// Preferred side for a label when the geometry does not decide it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSide {
    #[default]
    Left,
    Right,
}

/// Line and label appearance, read once from the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    /// Stroke width in pixels
    pub line_thickness: f32,
    pub line_color: RgbaColor,
    /// Font size in pixels
    pub text_size: u32,
    pub text_color: RgbaColor,
    /// Filled box behind the label; no box when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_background_color: Option<RgbaColor>,
    pub text_side: TextSide,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            line_thickness: 5.0,
            line_color: RgbaColor::new(0.0, 0.7, 0.0, 1.0),
            text_size: 30,
            text_color: RgbaColor::new(0.0, 0.8, 0.0, 1.0),
            text_background_color: Some(RgbaColor::new(0.0, 0.0, 0.0, 0.6)),
            text_side: TextSide::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_converts_to_bytes() {
        assert_eq!(RgbaColor::new(0.0, 1.0, 0.0, 1.0).to_rgba_u8(), [0, 255, 0, 255]);
        assert_eq!(RgbaColor::new(1.5, -1.0, 0.5, 0.6).to_rgba_u8(), [255, 0, 128, 153]);
    }

    #[test]
    fn color_array_round_trips_through_arrays() {
        let c = RgbaColor::from([0.1, 0.2, 0.3, 0.4]);
        assert_eq!(<[f32; 4]>::from(c), [0.1, 0.2, 0.3, 0.4]);
    }
}
