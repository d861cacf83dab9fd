//! Automatic calibration for JEOL SEM images
//!
//! The microscope writes a text file next to every image, with the same
//! base name and a `.txt` extension. Two of its directives describe the
//! scale bar burnt into the image:
//!
//! ```text
//! $$SM_MICRON_BAR 90
//! $$SM_MICRON_MARKER 100nm
//! ```
//!
//! The bar is 90 pixels long and represents 100 nm, so the image has
//! 0.9 pixels/nm.

use crate::calibration::{CalibrationProvider, ComputedCalibration};
use crate::error::{CalibrationError, ComputeFailure};
use crate::host::ImageInfo;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

pub const BAR_DIRECTIVE: &str = "$$SM_MICRON_BAR";
pub const MARKER_DIRECTIVE: &str = "$$SM_MICRON_MARKER";

/// Scale bar description read from a sidecar file
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBarMetadata {
    pub bar_length_px: f64,
    pub marker_length: f64,
    pub marker_unit: String,
}

impl ScaleBarMetadata {
    pub fn pixels_per_unit(&self) -> f64 {
        self.bar_length_px / self.marker_length
    }
}

/// Sidecar file expected for an image file
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("txt")
}

/// Scan a sidecar for the scale bar directives; the last occurrence of each wins
pub fn parse_sidecar(mut reader: impl BufRead) -> Result<ScaleBarMetadata, ComputeFailure> {
    let mut bar = None;
    let mut marker = None;

    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        // header fields are free text in the microscope's code page
        let line = String::from_utf8_lossy(&buf);

        if let Some(value) = directive_value(&line, BAR_DIRECTIVE) {
            bar = Some(parse_bar(value)?);
        }
        if let Some(value) = directive_value(&line, MARKER_DIRECTIVE) {
            marker = Some(parse_marker(value)?);
        }
    }

    let bar_length_px = bar.ok_or(ComputeFailure::MissingDirective(BAR_DIRECTIVE))?;
    let (marker_length, marker_unit) =
        marker.ok_or(ComputeFailure::MissingDirective(MARKER_DIRECTIVE))?;

    Ok(ScaleBarMetadata { bar_length_px, marker_length, marker_unit })
}

fn directive_value<'a>(line: &'a str, directive: &str) -> Option<&'a str> {
    let start = line.find(directive)? + directive.len();
    let rest = &line[start..];
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

fn parse_bar(value: &str) -> Result<f64, ComputeFailure> {
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    match digits.parse::<u32>() {
        Ok(px) if px > 0 => Ok(f64::from(px)),
        _ => Err(ComputeFailure::MalformedDirective {
            directive: BAR_DIRECTIVE,
            value: value.to_owned(),
        }),
    }
}

fn parse_marker(value: &str) -> Result<(f64, String), ComputeFailure> {
    let malformed = || ComputeFailure::MalformedDirective {
        directive: MARKER_DIRECTIVE,
        value: value.to_owned(),
    };

    let number_len = value.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(value.len());
    let (number, tail) = value.split_at(number_len);
    let unit: String = tail.chars().take_while(char::is_ascii_alphabetic).collect();

    let length = number.parse::<f64>().map_err(|_| malformed())?;
    if length <= 0.0 || unit.is_empty() {
        return Err(malformed());
    }

    Ok((length, unit))
}

/// Provider reading the scale from the JEOL SEM sidecar text file
#[derive(Debug, Clone, Default)]
pub struct JeolSemCalibration;

impl JeolSemCalibration {
    pub const NAME: &'static str = "JEOL SEM: AutoCal from *.txt";

    pub fn new() -> Self {
        Self
    }

    /// Read and parse the sidecar at `path`
    pub fn read_sidecar(path: &Path) -> Result<ScaleBarMetadata, CalibrationError> {
        let file = File::open(path).map_err(|err| {
            let reason = if err.kind() == io::ErrorKind::NotFound {
                ComputeFailure::NotFound
            } else {
                ComputeFailure::Io(err)
            };
            CalibrationError::compute(path, reason)
        })?;

        parse_sidecar(BufReader::new(file)).map_err(|reason| CalibrationError::compute(path, reason))
    }
}

impl CalibrationProvider for JeolSemCalibration {
    fn display_name(&self) -> &str {
        Self::NAME
    }

    fn compute_calibration(
        &self,
        image: &ImageInfo,
    ) -> Result<ComputedCalibration, CalibrationError> {
        let image_path = image.path.as_deref().ok_or(CalibrationError::NoSourceFile)?;
        let txt_path = sidecar_path(image_path);
        log::debug!("reading JEOL sidecar {}", txt_path.display());

        let metadata = Self::read_sidecar(&txt_path)?;
        log::debug!(
            "scale bar {} px = {} {}",
            metadata.bar_length_px,
            metadata.marker_length,
            metadata.marker_unit
        );

        Ok(ComputedCalibration {
            pixels_per_unit: metadata.pixels_per_unit(),
            unit: metadata.marker_unit,
            aspect_ratio: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ImageId;
    use std::fs;
    use std::io::Cursor;

    const SIDECAR: &str = "$CM_FORMAT JEOL-SEM\n\
                           $CM_VERSION 1.0\n\
                           $$SM_MICRON_BAR 90\n\
                           $$SM_MICRON_MARKER 100nm\n";

    fn image_at(path: PathBuf) -> ImageInfo {
        ImageInfo { id: ImageId(7), title: "sem.tif".to_owned(), path: Some(path), width: 1280, height: 960 }
    }

    #[test]
    fn parses_bar_and_marker() {
        let meta = parse_sidecar(Cursor::new(SIDECAR)).unwrap();

        assert_eq!(meta.bar_length_px, 90.0);
        assert_eq!(meta.marker_length, 100.0);
        assert_eq!(meta.marker_unit, "nm");
        assert!((meta.pixels_per_unit() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn decimal_marker_is_accepted() {
        let text = "$$SM_MICRON_BAR 120\n$$SM_MICRON_MARKER 1.5um\n";
        let meta = parse_sidecar(Cursor::new(text)).unwrap();

        assert_eq!(meta.marker_length, 1.5);
        assert_eq!(meta.marker_unit, "um");
        assert_eq!(meta.pixels_per_unit(), 80.0);
    }

    #[test]
    fn non_utf8_header_lines_are_skipped() {
        let bytes: &[u8] = b"$CM_TITLE 5 \xB5m sample\n$$SM_MICRON_BAR 90\n$$SM_MICRON_MARKER 100nm\n";
        let meta = parse_sidecar(Cursor::new(bytes)).unwrap();

        assert_eq!(meta.bar_length_px, 90.0);
        assert_eq!(meta.marker_unit, "nm");
    }

    #[test]
    fn last_directive_wins() {
        let text = "$$SM_MICRON_BAR 10\n$$SM_MICRON_MARKER 1um\n$$SM_MICRON_BAR 20\n";
        let meta = parse_sidecar(Cursor::new(text)).unwrap();
        assert_eq!(meta.bar_length_px, 20.0);
    }

    #[test]
    fn missing_marker_is_reported() {
        let err = parse_sidecar(Cursor::new("$$SM_MICRON_BAR 90\n")).unwrap_err();
        assert!(matches!(err, ComputeFailure::MissingDirective(MARKER_DIRECTIVE)));
    }

    #[test]
    fn zero_marker_is_malformed() {
        let text = "$$SM_MICRON_BAR 90\n$$SM_MICRON_MARKER 0nm\n";
        let err = parse_sidecar(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, ComputeFailure::MalformedDirective { .. }));
    }

    #[test]
    fn sidecar_path_swaps_extension() {
        assert_eq!(sidecar_path(Path::new("/scans/wafer 3.tif")), PathBuf::from("/scans/wafer 3.txt"));
    }

    #[test]
    fn computes_calibration_from_sidecar_file() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let image_path = dir.path().join("sem.tif");
        fs::write(dir.path().join("sem.txt"), SIDECAR).unwrap();

        let computed = JeolSemCalibration::new().compute_calibration(&image_at(image_path)).unwrap();

        assert!((computed.pixels_per_unit - 0.9).abs() < 1e-12);
        assert_eq!(computed.unit, "nm");
        assert_eq!(computed.aspect_ratio, 1.0);
    }

    #[test]
    fn missing_sidecar_names_the_attempted_path() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let image_path = dir.path().join("orphan.tif");

        let err = JeolSemCalibration::new().compute_calibration(&image_at(image_path)).unwrap_err();

        match &err {
            CalibrationError::Compute { path, reason: ComputeFailure::NotFound } => {
                assert_eq!(path, &dir.path().join("orphan.txt"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().contains("orphan.txt"));
    }

    #[test]
    fn image_without_file_cannot_be_calibrated() {
        let info = ImageInfo { id: ImageId(1), title: "clipboard".to_owned(), path: None, width: 1, height: 1 };
        let err = JeolSemCalibration::new().compute_calibration(&info).unwrap_err();
        assert!(matches!(err, CalibrationError::NoSourceFile));
    }
}
