//! PNG encoding.
//!
//! Images are written as 8-bit truecolor with every scanline Sub filtered.
//! The zlib stream uses stored (uncompressed) deflate blocks only.

use std::path::Path;

use log::debug;

use crate::checksum::{Crc32, adler32};

use super::{ExportError, RgbImage};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Largest payload of a stored deflate block
const MAX_STORED_BLOCK: usize = 0xFFFF;

const BIT_DEPTH: u8 = 8;
const COLOR_TYPE_RGB: u8 = 2;
const FILTER_SUB: u8 = 1;

/// Appends a chunk: big-endian length, type, data, CRC32 of type and data
fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    let crc = Crc32::new().update(kind).update(data).finalize();
    out.extend_from_slice(&crc.to_be_bytes());
}

/// Each scanline is prefixed with its filter type, each byte stored as the
/// difference to the byte one pixel to its left
fn sub_filter(image: &RgbImage) -> Vec<u8> {
    let stride = image.stride();
    let mut filtered = Vec::with_capacity((stride + 1) * image.height() as usize);

    for row in image.rows() {
        filtered.push(FILTER_SUB);
        filtered.extend(
            row.iter()
                .enumerate()
                .map(|(i, &byte)| if i < 3 { byte } else { byte.wrapping_sub(row[i - 3]) }),
        );
    }

    filtered
}

/// Wraps `data` in a zlib stream made of stored deflate blocks
fn zlib_stored(data: &[u8]) -> Vec<u8> {
    let blocks = data.len().div_ceil(MAX_STORED_BLOCK).max(1);
    let mut out = Vec::with_capacity(data.len() + blocks * 5 + 6);

    // CM = 8, CINFO = 7 window, FLEVEL = 0, FCHECK makes the header a multiple of 31
    out.extend_from_slice(&[0x78, 0x01]);

    let mut chunks = data.chunks(MAX_STORED_BLOCK).peekable();
    if chunks.peek().is_none() {
        out.push(1);
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0xFFFFu16.to_le_bytes());
    }
    while let Some(block) = chunks.next() {
        let is_final = chunks.peek().is_none();
        let len = block.len() as u16;

        out.push(u8::from(is_final));
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(block);
    }

    out.extend_from_slice(&adler32(data).to_be_bytes());
    out
}

impl RgbImage {
    /// Encodes the image as a PNG file in memory
    pub fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        self.ensure_not_empty()?;

        let mut header = Vec::with_capacity(13);
        header.extend_from_slice(&self.width().to_be_bytes());
        header.extend_from_slice(&self.height().to_be_bytes());
        // compression, filter method and interlace are all 0
        header.extend_from_slice(&[BIT_DEPTH, COLOR_TYPE_RGB, 0, 0, 0]);

        let idat = zlib_stored(&sub_filter(self));

        let mut out = Vec::with_capacity(PNG_SIGNATURE.len() + header.len() + idat.len() + 3 * 12);
        out.extend_from_slice(&PNG_SIGNATURE);
        write_chunk(&mut out, b"IHDR", &header);
        write_chunk(&mut out, b"IDAT", &idat);
        write_chunk(&mut out, b"IEND", &[]);

        Ok(out)
    }

    /// Encodes the image as PNG and writes it to `path`
    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let encoded = self.encode_png()?;
        std::fs::write(path.as_ref(), &encoded)?;
        debug!(
            "Wrote {}x{} PNG ({} bytes) to {}",
            self.width(),
            self.height(),
            encoded.len(),
            path.as_ref().display()
        );

        Ok(())
    }
}
