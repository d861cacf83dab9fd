//! Installing a chosen calibration on images

use crate::calibration::{CalibrationEntry, CalibrationSource};
use crate::error::Result;
use crate::host::{ImageCalibration, ImageHost, ImageId};

/// Result of one successful application
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub entry: CalibrationEntry,
    pub calibration: ImageCalibration,
    pub global: bool,
    /// Images redrawn to show the new calibration
    pub refreshed: Vec<ImageId>,
}

/// Resolve `source` against `target` and install the result
///
/// With `apply_globally` the calibration becomes the shared global one and
/// every currently open image is redrawn. Otherwise any global calibration
/// is cleared and only `target` is recalibrated and redrawn. Nothing is
/// installed when the calibration cannot be resolved.
pub fn apply<H: ImageHost + ?Sized>(
    host: &mut H,
    target: ImageId,
    source: &CalibrationSource,
    apply_globally: bool,
) -> Result<Applied> {
    let info = host.image_info(target)?;
    let entry = source.resolve(&info)?;
    let calibration = entry.to_image_calibration()?;

    log::info!(
        "applying {} ({} pixels/{}) to {}",
        entry.display_name,
        entry.pixels_per_unit,
        entry.unit,
        if apply_globally { "all images".to_owned() } else { info.title.clone() }
    );

    let refreshed = if apply_globally {
        host.set_global_calibration(Some(calibration.clone()));
        let open = host.open_images();
        for id in &open {
            host.refresh(*id)?;
        }
        open
    } else {
        host.set_global_calibration(None);
        host.set_calibration(target, calibration.clone())?;
        host.refresh(target)?;
        vec![target]
    };

    Ok(Applied { entry, calibration, global: apply_globally, refreshed })
}
