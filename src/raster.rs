//! Scanline coverage rasterizer.
//!
//! Edges deposit signed vertical coverage into a float accumulator, one
//! cell per row they cross. Summing a row left to right then yields the
//! non-zero winding coverage of every pixel.

use thiserror::Error;

use crate::outline::{Contour, ContourPoint};

/// Quadratic curves are flattened into this many line segments
pub const CURVE_SEGMENTS: u32 = 32;

/// Edges flatter than this contribute no coverage
const MIN_EDGE_HEIGHT: f32 = 0.001;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RasterError {
    #[error("Failed to allocate a {0} element raster buffer")]
    AllocationFailure(usize),

    #[error("Bitmap dimensions {width}x{height} are too large")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Number of pixels in a `width` x `height` bitmap
pub(crate) fn pixel_count(width: u32, height: u32) -> Result<usize, RasterError> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(RasterError::InvalidDimensions { width, height })
}

/// Allocates `len` copies of `value`, reporting allocation failure instead
/// of aborting
pub(crate) fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>, RasterError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| RasterError::AllocationFailure(len))?;
    buffer.resize(len, value);

    Ok(buffer)
}

/// An 8-bit single channel image, row-major, top row first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CoverageBitmap {
    /// A zeroed bitmap
    pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        let data = try_filled(pixel_count(width, height)?, 0u8)?;
        Ok(Self { width, height, data })
    }

    /// Wraps `data`, which must hold exactly `width * height` bytes
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if pixel_count(width, height).ok()? != data.len() {
            return None;
        }

        Some(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }

        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Iterates over the rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks(0) panics, an empty bitmap has no rows anyway
        self.data.chunks(self.width.max(1) as usize)
    }
}

/// A rasterized glyph and where to place it relative to the pen position.
///
/// `x_offset` is the scaled left edge of the glyph box and `y_offset` its
/// scaled top edge, both truncated toward zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub bitmap: CoverageBitmap,
    pub x_offset: i32,
    pub y_offset: i32,
}

struct Accumulator {
    width: usize,
    height: usize,
    cells: Vec<f32>,
}

impl Accumulator {
    fn add_edge(&mut self, from: (f32, f32), to: (f32, f32)) {
        let ((x0, y0), (x1, y1)) = (from, to);
        if (y1 - y0).abs() < MIN_EDGE_HEIGHT {
            return;
        }

        let (x0, y0, x1, y1, direction) = if y0 > y1 {
            (x1, y1, x0, y0, -1.0)
        } else {
            (x0, y0, x1, y1, 1.0)
        };

        let row_start = (y0.floor() as i64).max(0);
        let row_end = (y1.ceil() as i64).min(self.height as i64);
        let slope = (x1 - x0) / (y1 - y0);

        for row in row_start..row_end {
            let top = (row as f32).max(y0);
            let bottom = ((row + 1) as f32).min(y1);
            let coverage = bottom - top;

            let x = x0 + slope * ((top + bottom) * 0.5 - y0);
            let column = x.floor() as i64;
            if (0..self.width as i64).contains(&column) {
                self.cells[row as usize * self.width + column as usize] += coverage * direction;
            }
        }
    }

    fn add_quadratic(&mut self, p0: (f32, f32), control: (f32, f32), p2: (f32, f32)) {
        let mut previous = p0;
        for step in 1..=CURVE_SEGMENTS {
            let t = step as f32 / CURVE_SEGMENTS as f32;
            let mt = 1.0 - t;
            let (b0, b1, b2) = (mt * mt, 2.0 * mt * t, t * t);

            let point = (
                b0 * p0.0 + b1 * control.0 + b2 * p2.0,
                b0 * p0.1 + b1 * control.1 + b2 * p2.1,
            );
            self.add_edge(previous, point);
            previous = point;
        }
    }

    fn add_contour(&mut self, points: &[ContourPoint]) {
        let n = points.len();
        if n < 2 {
            return;
        }

        let xy = |p: &ContourPoint| (p.x, p.y);
        let mut i = 0;
        while i < n {
            let p0 = &points[i];
            let p1 = &points[(i + 1) % n];

            match (p0.on_curve, p1.on_curve) {
                (true, true) => {
                    self.add_edge(xy(p0), xy(p1));
                    i += 1;
                }
                (true, false) => {
                    let p2 = &points[(i + 2) % n];
                    let end = if p2.on_curve { *p2 } else { p1.midpoint(p2) };
                    self.add_quadratic(xy(p0), xy(p1), xy(&end));
                    i += if p2.on_curve { 2 } else { 1 };
                }
                _ => i += 1,
            }
        }
    }

    fn resolve(&self) -> Result<Vec<u8>, RasterError> {
        let mut data = try_filled(self.cells.len(), 0u8)?;
        if self.width == 0 {
            return Ok(data);
        }

        for (cells, out) in self.cells.chunks(self.width).zip(data.chunks_mut(self.width)) {
            let mut winding = 0.0f32;
            for (cell, pixel) in cells.iter().zip(out.iter_mut()) {
                winding += cell;
                *pixel = (winding.abs().min(1.0) * 255.0) as u8;
            }
        }

        Ok(data)
    }
}

/// Fills `contours` into a `width` x `height` coverage bitmap with the
/// non-zero winding rule.
///
/// Contours are in pixel space with y pointing down. Straight segments
/// join consecutive on-curve points, an off-curve point is the control of
/// a quadratic flattened into [`CURVE_SEGMENTS`] lines.
pub fn rasterize(contours: &[Contour], width: u32, height: u32) -> Result<CoverageBitmap, RasterError> {
    let len = pixel_count(width, height)?;
    let mut accumulator = Accumulator {
        width: width as usize,
        height: height as usize,
        cells: try_filled(len, 0.0f32)?,
    };

    for contour in contours {
        accumulator.add_contour(&contour.points);
    }

    Ok(CoverageBitmap {
        width,
        height,
        data: accumulator.resolve()?,
    })
}
