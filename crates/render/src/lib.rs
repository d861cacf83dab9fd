//! Raster drawing for measurement annotations

mod raster;
pub mod text;

pub use raster::RasterCanvas;
