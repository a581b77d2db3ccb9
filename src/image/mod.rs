//! RGB images and their export to PNG and BMP.

use thiserror::Error;

use crate::raster::CoverageBitmap;

pub mod bmp;
pub mod png;

#[derive(Error, Debug)]
pub enum ExportError {
    /// There is nothing to encode
    #[error("Cannot export an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("Failed to allocate {0} bytes for an image")]
    AllocationFailure(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An 8-bit RGB image, row-major, top row first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbImage {
    /// A black image
    pub fn new(width: u32, height: u32) -> Result<Self, ExportError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or(ExportError::AllocationFailure(usize::MAX))?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| ExportError::AllocationFailure(len))?;
        data.resize(len, 0);

        Ok(Self { width, height, data })
    }

    /// Tints `color` by the coverage of each pixel, `channel * coverage / 255`
    pub fn from_coverage(bitmap: &CoverageBitmap, color: [u8; 3]) -> Result<Self, ExportError> {
        let mut image = Self::new(bitmap.width(), bitmap.height())?;
        for (pixel, &alpha) in image.data.chunks_exact_mut(3).zip(bitmap.as_raw()) {
            for (out, &channel) in pixel.iter_mut().zip(&color) {
                *out = (u32::from(channel) * u32::from(alpha) / 255) as u8;
            }
        }

        Ok(image)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some((y as usize * self.width as usize + x as usize) * 3)
    }

    /// Sets a pixel, writes outside of the image are ignored
    pub fn put_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if let Some(i) = self.index(x, y) {
            self.data[i..i + 3].copy_from_slice(&rgb);
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        let i = self.index(x, y)?;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Row stride in bytes
    pub(crate) fn stride(&self) -> usize {
        self.width as usize * 3
    }

    pub(crate) fn ensure_not_empty(&self) -> Result<(), ExportError> {
        if self.is_empty() {
            return Err(ExportError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }

        Ok(())
    }

    /// Rows of RGB triples, top to bottom. Empty images have no rows.
    pub(crate) fn rows(&self) -> impl DoubleEndedIterator<Item = &[u8]> {
        self.data.chunks_exact(self.stride().max(1))
    }
}
