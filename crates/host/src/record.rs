//! Calibration kept next to an image file between runs
//!
//! `sample.tif` gets `sample.tif.mscope.json`. The record is read back when
//! the image is opened again.

use mscope_core::ImageCalibration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_SCHEMA_VERSION: u32 = 1;
const RECORD_SUFFIX: &str = ".mscope.json";

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid calibration record {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("calibration record {} has unsupported version {version}", path.display())]
    Version { path: PathBuf, version: u32 },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordEnvelope {
    version: u32,
    calibration: ImageCalibration,
}

/// Record file belonging to an image file
pub fn record_path(image_path: &Path) -> PathBuf {
    let mut name = image_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(RECORD_SUFFIX);
    image_path.with_file_name(name)
}

/// Calibration saved for `image_path`, or `None` when it has no record
pub fn load_record(image_path: &Path) -> Result<Option<ImageCalibration>, RecordError> {
    let path = record_path(image_path);
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(&path).map_err(|source| RecordError::Io { path: path.clone(), source })?;
    let envelope: RecordEnvelope = serde_json::from_slice(&bytes)
        .map_err(|source| RecordError::Parse { path: path.clone(), source })?;
    if envelope.version != RECORD_SCHEMA_VERSION {
        return Err(RecordError::Version { path, version: envelope.version });
    }

    Ok(Some(envelope.calibration))
}

pub fn save_record(
    image_path: &Path,
    calibration: &ImageCalibration,
) -> Result<PathBuf, RecordError> {
    let path = record_path(image_path);
    let envelope =
        RecordEnvelope { version: RECORD_SCHEMA_VERSION, calibration: calibration.clone() };

    let bytes = serde_json::to_vec_pretty(&envelope)?;
    fs::write(&path, bytes).map_err(|source| RecordError::Io { path: path.clone(), source })?;
    Ok(path)
}
