//! Uncompressed 24-bit BMP encoding.

use std::path::Path;

use log::debug;

use super::{ExportError, RgbImage};

const FILE_HEADER_SIZE: u32 = 14;
const INFO_HEADER_SIZE: u32 = 40;
const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
const BITS_PER_PIXEL: u16 = 24;

impl RgbImage {
    /// Encodes the image as a BMP file in memory.
    ///
    /// Rows are stored bottom-up in BGR order, each padded with zeros to a
    /// multiple of 4 bytes.
    pub fn encode_bmp(&self) -> Result<Vec<u8>, ExportError> {
        self.ensure_not_empty()?;

        let stride = self.stride();
        let padding = (4 - stride % 4) % 4;
        let image_size = (stride + padding) * self.height() as usize;
        let file_size = PIXEL_DATA_OFFSET as usize + image_size;

        let mut out = Vec::new();
        out.try_reserve_exact(file_size)
            .map_err(|_| ExportError::AllocationFailure(file_size))?;

        out.extend_from_slice(b"BM");
        out.extend_from_slice(&(file_size as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&PIXEL_DATA_OFFSET.to_le_bytes());

        out.extend_from_slice(&INFO_HEADER_SIZE.to_le_bytes());
        out.extend_from_slice(&(self.width() as i32).to_le_bytes());
        out.extend_from_slice(&(self.height() as i32).to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());
        // no compression
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(image_size as u32).to_le_bytes());
        // resolution and palette fields are left at 0
        out.extend_from_slice(&[0; 16]);

        for row in self.rows().rev() {
            for pixel in row.chunks_exact(3) {
                out.extend_from_slice(&[pixel[2], pixel[1], pixel[0]]);
            }
            out.extend(std::iter::repeat_n(0u8, padding));
        }

        Ok(out)
    }

    /// Encodes the image as BMP and writes it to `path`
    pub fn write_bmp<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let encoded = self.encode_bmp()?;
        std::fs::write(path.as_ref(), &encoded)?;
        debug!(
            "Wrote {}x{} BMP ({} bytes) to {}",
            self.width(),
            self.height(),
            encoded.len(),
            path.as_ref().display()
        );

        Ok(())
    }
}
