//! Signed distance fields from coverage bitmaps.

use log::trace;

use crate::raster::{CoverageBitmap, RasterError, try_filled};

/// Coverage above this value counts as inside the glyph
const INSIDE_THRESHOLD: u8 = 127;

/// An 8-bit signed distance field.
///
/// 0 is `spread` pixels or more inside the shape, 255 is `spread` pixels or
/// more outside of it and the contour sits around 127.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceField {
    field: CoverageBitmap,
    spread: u32,
}

impl DistanceField {
    pub fn width(&self) -> u32 {
        self.field.width()
    }

    pub fn height(&self) -> u32 {
        self.field.height()
    }

    pub fn spread(&self) -> u32 {
        self.spread
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        self.field.get(x, y)
    }

    pub fn as_raw(&self) -> &[u8] {
        self.field.as_raw()
    }

    /// The field as a plain single channel bitmap, for export
    pub fn as_bitmap(&self) -> &CoverageBitmap {
        &self.field
    }

    pub fn into_bitmap(self) -> CoverageBitmap {
        self.field
    }
}

/// Relaxes `distances` with a city-block chamfer: rows left to right then
/// right to left, then columns top to bottom then bottom to top.
fn chamfer(distances: &mut [f32], width: usize, height: usize) {
    for row in distances.chunks_mut(width) {
        for x in 1..width {
            row[x] = row[x].min(row[x - 1] + 1.0);
        }
        for x in (0..width.saturating_sub(1)).rev() {
            row[x] = row[x].min(row[x + 1] + 1.0);
        }
    }

    for x in 0..width {
        for y in 1..height {
            let above = distances[(y - 1) * width + x];
            let cell = &mut distances[y * width + x];
            *cell = cell.min(above + 1.0);
        }
        for y in (0..height.saturating_sub(1)).rev() {
            let below = distances[(y + 1) * width + x];
            let cell = &mut distances[y * width + x];
            *cell = cell.min(below + 1.0);
        }
    }
}

/// Converts a coverage bitmap into a distance field encoding up to
/// `spread` pixels on either side of the outline. A `spread` of 0 is
/// treated as 1.
pub fn to_sdf(bitmap: &CoverageBitmap, spread: u32) -> Result<DistanceField, RasterError> {
    let spread = spread.max(1);
    let (width, height) = (bitmap.width(), bitmap.height());
    let coverage = bitmap.as_raw();

    let inside = |c: u8| c > INSIDE_THRESHOLD;

    // distance to the nearest inside pixel, and to the nearest outside one
    let mut to_inside = try_filled(coverage.len(), f32::INFINITY)?;
    let mut to_outside = try_filled(coverage.len(), f32::INFINITY)?;
    for ((&c, near_in), near_out) in coverage.iter().zip(&mut to_inside).zip(&mut to_outside) {
        if inside(c) {
            *near_in = 0.0;
        } else {
            *near_out = 0.0;
        }
    }

    if width > 0 {
        chamfer(&mut to_inside, width as usize, height as usize);
        chamfer(&mut to_outside, width as usize, height as usize);
    }

    let limit = spread as f32;
    let mut data = try_filled(coverage.len(), 0u8)?;
    for (i, out) in data.iter_mut().enumerate() {
        let distance = if inside(coverage[i]) { -to_outside[i] } else { to_inside[i] };
        let distance = distance.clamp(-limit, limit);
        *out = ((distance / limit + 1.0) * 0.5 * 255.0) as u8;
    }
    trace!("Built {width}x{height} distance field with spread {spread}");

    let field = CoverageBitmap::from_raw(width, height, data)
        .ok_or(RasterError::InvalidDimensions { width, height })?;

    Ok(DistanceField { field, spread })
}
