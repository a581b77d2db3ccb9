use buffer::VeroBufReaderError;
use image::ExportError;
use raster::RasterError;
use tables::{TableEncodingError, glyf::GlyphError};
use thiserror::Error;

pub mod buffer;
pub mod checksum;
pub mod config;
pub mod font;
pub mod image;
pub mod outline;
pub mod raster;
pub mod sdf;
pub mod tables;

#[cfg(test)]
mod test_font;

pub use config::RenderConfig;
pub use font::{Font, VerticalMetrics};
pub use image::RgbImage;
pub use outline::{BoundingBox, Contour, ContourPoint, GlyphOutline};
pub use raster::{CoverageBitmap, GlyphBitmap};
pub use sdf::DistanceField;
pub use tables::hmtx::HorizontalMetrics;

/// Index of a glyph inside a font, 0 is the missing glyph
pub type GlyphId = u32;

#[derive(Debug, Error)]
pub enum VeroTypeError {
    #[error(transparent)]
    TableEncodingError(#[from] TableEncodingError),

    #[error(transparent)]
    VeroBufReaderError(#[from] VeroBufReaderError),

    #[error(transparent)]
    GlyphError(#[from] GlyphError),

    #[error(transparent)]
    RasterError(#[from] RasterError),

    #[error(transparent)]
    ExportError(#[from] ExportError),

    #[error("Failed to read font: {0}")]
    Io(#[from] std::io::Error),
}
