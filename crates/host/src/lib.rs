mod record;

pub use record::{load_record, record_path, save_record, RecordError};

use image::{DynamicImage, ImageFormat, Rgba};
use mscope_core::{HostError, ImageCalibration, ImageHost, ImageId, ImageInfo, Roi};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub type RgbaImage = image::ImageBuffer<Rgba<u8>, Vec<u8>>;

#[derive(Debug, Clone)]
pub enum OpenSource {
    Path(PathBuf),
    Pixels { title: String, pixels: RgbaImage },
}

impl From<PathBuf> for OpenSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for OpenSource {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Record(#[from] RecordError),
}

#[derive(Debug, Clone)]
struct ImageRecord {
    title: String,
    path: Option<PathBuf>,
    pixels: RgbaImage,
    calibration: ImageCalibration,
    roi: Option<Roi>,
    redraws: u32,
    scale_bar: bool,
}

/// Open images with their calibration records and selections
///
/// The global calibration, when set, is what every image reports; each
/// image keeps its own record underneath.
#[derive(Debug, Default)]
pub struct Session {
    next_id: u64,
    images: BTreeMap<ImageId, ImageRecord>,
    current: Option<ImageId>,
    global: Option<ImageCalibration>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an image and make it the current one
    ///
    /// A file opened from disk picks up the calibration saved for it by
    /// [`Session::persist_calibration`].
    pub fn open(&mut self, source: impl Into<OpenSource>) -> Result<ImageId, SessionError> {
        let (title, path, pixels, calibration) = match source.into() {
            OpenSource::Path(path) => {
                let pixels = image::open(&path)?.to_rgba8();
                let calibration = load_record(&path)?.unwrap_or_default();
                let title = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                (title, Some(path), pixels, calibration)
            }
            OpenSource::Pixels { title, pixels } => {
                (title, None, pixels, ImageCalibration::default())
            }
        };

        self.next_id += 1;
        let id = ImageId(self.next_id);
        log::debug!("opened {title} as {id} ({}x{})", pixels.width(), pixels.height());

        self.images.insert(
            id,
            ImageRecord {
                title,
                path,
                pixels,
                calibration,
                roi: None,
                redraws: 0,
                scale_bar: false,
            },
        );
        self.current = Some(id);
        Ok(id)
    }

    pub fn close(&mut self, id: ImageId) -> Result<(), HostError> {
        self.images.remove(&id).ok_or(HostError::UnknownImage(id))?;
        if self.current == Some(id) {
            self.current = self.images.keys().next_back().copied();
        }
        Ok(())
    }

    pub fn set_current(&mut self, id: ImageId) -> Result<(), HostError> {
        self.record(id)?;
        self.current = Some(id);
        Ok(())
    }

    pub fn set_roi(&mut self, id: ImageId, roi: Option<Roi>) -> Result<(), HostError> {
        self.record_mut(id)?.roi = roi;
        Ok(())
    }

    pub fn pixels(&self, id: ImageId) -> Result<&RgbaImage, HostError> {
        Ok(&self.record(id)?.pixels)
    }

    pub fn pixels_mut(&mut self, id: ImageId) -> Result<&mut RgbaImage, HostError> {
        Ok(&mut self.record_mut(id)?.pixels)
    }

    /// How many times the image has been redrawn
    pub fn redraw_count(&self, id: ImageId) -> Result<u32, HostError> {
        Ok(self.record(id)?.redraws)
    }

    pub fn scale_bar_requested(&self, id: ImageId) -> Result<bool, HostError> {
        Ok(self.record(id)?.scale_bar)
    }

    /// Save the calibration the image is displayed with next to its file
    ///
    /// Returns the record path, or `None` for images not opened from a file.
    pub fn persist_calibration(&self, id: ImageId) -> Result<Option<PathBuf>, SessionError> {
        let Some(path) = self.record(id)?.path.as_deref() else {
            return Ok(None);
        };
        let written = save_record(path, &self.calibration(id)?)?;
        log::debug!("saved calibration of {id} to {}", written.display());
        Ok(Some(written))
    }

    /// Write the image's pixels; the format follows the file extension
    pub fn save(&self, id: ImageId, path: &Path) -> Result<(), SessionError> {
        let pixels = &self.record(id)?.pixels;
        let format = ImageFormat::from_path(path)?;

        match format {
            // no alpha channel in JPEG
            ImageFormat::Jpeg => {
                DynamicImage::ImageRgba8(pixels.clone()).to_rgb8().save_with_format(path, format)?
            }
            _ => pixels.save_with_format(path, format)?,
        }
        log::debug!("saved {id} to {}", path.display());
        Ok(())
    }

    fn record(&self, id: ImageId) -> Result<&ImageRecord, HostError> {
        self.images.get(&id).ok_or(HostError::UnknownImage(id))
    }

    fn record_mut(&mut self, id: ImageId) -> Result<&mut ImageRecord, HostError> {
        self.images.get_mut(&id).ok_or(HostError::UnknownImage(id))
    }
}

impl ImageHost for Session {
    fn current_image(&self) -> Result<ImageId, HostError> {
        self.current.ok_or(HostError::NoImage)
    }

    fn open_images(&self) -> Vec<ImageId> {
        self.images.keys().copied().collect()
    }

    fn image_info(&self, id: ImageId) -> Result<ImageInfo, HostError> {
        let record = self.record(id)?;
        Ok(ImageInfo {
            id,
            title: record.title.clone(),
            path: record.path.clone(),
            width: record.pixels.width(),
            height: record.pixels.height(),
        })
    }

    fn calibration(&self, id: ImageId) -> Result<ImageCalibration, HostError> {
        let record = self.record(id)?;
        Ok(self.global.clone().unwrap_or_else(|| record.calibration.clone()))
    }

    fn set_calibration(
        &mut self,
        id: ImageId,
        calibration: ImageCalibration,
    ) -> Result<(), HostError> {
        self.record_mut(id)?.calibration = calibration;
        Ok(())
    }

    fn global_calibration(&self) -> Option<ImageCalibration> {
        self.global.clone()
    }

    fn set_global_calibration(&mut self, calibration: Option<ImageCalibration>) {
        self.global = calibration;
    }

    fn roi(&self, id: ImageId) -> Result<Option<Roi>, HostError> {
        Ok(self.record(id)?.roi.clone())
    }

    fn refresh(&mut self, id: ImageId) -> Result<(), HostError> {
        self.record_mut(id)?.redraws += 1;
        Ok(())
    }

    fn add_scale_bar(&mut self, id: ImageId) -> Result<(), HostError> {
        self.record_mut(id)?.scale_bar = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mscope_core::{Line, Point};

    fn blank(title: &str) -> OpenSource {
        OpenSource::Pixels {
            title: title.to_owned(),
            pixels: RgbaImage::from_pixel(8, 6, Rgba([10, 20, 30, 255])),
        }
    }

    #[test]
    fn last_opened_image_is_current() {
        let mut session = Session::new();
        assert!(matches!(session.current_image(), Err(HostError::NoImage)));

        let first = session.open(blank("a")).expect("open should succeed");
        let second = session.open(blank("b")).expect("open should succeed");

        assert_eq!(session.current_image().unwrap(), second);
        assert_eq!(session.open_images(), vec![first, second]);

        session.close(second).expect("close should succeed");
        assert_eq!(session.current_image().unwrap(), first);
    }

    #[test]
    fn global_calibration_overrides_own_record() {
        let mut session = Session::new();
        let id = session.open(blank("a")).expect("open should succeed");

        session.set_calibration(id, ImageCalibration::new("um", 0.5, 0.5)).unwrap();
        session.set_global_calibration(Some(ImageCalibration::new("nm", 2.0, 2.0)));
        assert_eq!(session.calibration(id).unwrap().unit, "nm");

        session.set_global_calibration(None);
        assert_eq!(session.calibration(id).unwrap().unit, "um");
    }

    #[test]
    fn unknown_image_is_an_error() {
        let mut session = Session::new();
        let err = session.refresh(ImageId(42)).expect_err("should fail for unknown image");

        assert_eq!(err, HostError::UnknownImage(ImageId(42)));
    }

    #[test]
    fn refresh_and_scale_bar_are_recorded() {
        let mut session = Session::new();
        let id = session.open(blank("a")).expect("open should succeed");

        session.refresh(id).unwrap();
        session.refresh(id).unwrap();
        session.add_scale_bar(id).unwrap();

        assert_eq!(session.redraw_count(id).unwrap(), 2);
        assert!(session.scale_bar_requested(id).unwrap());
    }

    #[test]
    fn roi_is_stored_per_image() {
        let mut session = Session::new();
        let a = session.open(blank("a")).expect("open should succeed");
        let b = session.open(blank("b")).expect("open should succeed");
        let roi = Roi::Line(Line::new(Point::new(1.0, 1.0), Point::new(5.0, 5.0)));

        session.set_roi(a, Some(roi.clone())).unwrap();

        assert_eq!(session.roi(a).unwrap(), Some(roi));
        assert_eq!(session.roi(b).unwrap(), None);
    }

    #[test]
    fn opens_from_file_and_saves_back() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let input = temp.path().join("sample.png");
        RgbaImage::from_pixel(12, 7, Rgba([1, 2, 3, 255])).save(&input).expect("fixture save");

        let mut session = Session::new();
        let id = session.open(input.clone()).expect("open should succeed");
        let info = session.image_info(id).unwrap();

        assert_eq!(info.title, "sample.png");
        assert_eq!(info.path.as_deref(), Some(input.as_path()));
        assert_eq!((info.width, info.height), (12, 7));

        session.pixels_mut(id).unwrap().put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let output = temp.path().join("out.png");
        session.save(id, &output).expect("save should succeed");

        let reloaded = image::open(&output).expect("reload").to_rgba8();
        assert_eq!(reloaded.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn persisted_calibration_is_restored_on_open() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let input = temp.path().join("sample.png");
        RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])).save(&input).expect("fixture save");

        let mut session = Session::new();
        let id = session.open(input.clone()).expect("open should succeed");
        session.set_global_calibration(Some(ImageCalibration::new("nm", 2.0, 2.0)));
        let written = session.persist_calibration(id).expect("persist should succeed");
        assert_eq!(written, Some(record_path(&input)));

        let mut next_run = Session::new();
        let id = next_run.open(input).expect("open should succeed");
        assert_eq!(next_run.calibration(id).unwrap(), ImageCalibration::new("nm", 2.0, 2.0));
    }

    #[test]
    fn in_memory_image_has_nothing_to_persist() {
        let mut session = Session::new();
        let id = session.open(blank("a")).expect("open should succeed");

        assert_eq!(session.persist_calibration(id).expect("persist should succeed"), None);
    }

    #[test]
    fn missing_file_fails_to_open() {
        let mut session = Session::new();
        let err = session.open(PathBuf::from("/no/such/image.png")).unwrap_err();

        assert!(matches!(err, SessionError::Image(_)));
        assert!(session.open_images().is_empty());
    }
}
