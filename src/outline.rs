//! Scaled glyph contours, ready for the rasterizer.

use crate::{
    raster::RasterError,
    tables::glyf::{RawPoint, SimpleGlyph},
};

/// A glyph's bounds in font units plus its horizontal metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub advance_width: u16,
    pub left_side_bearing: i16,
}

impl BoundingBox {
    pub fn width(&self) -> i32 {
        i32::from(self.x_max) - i32::from(self.x_min)
    }

    pub fn height(&self) -> i32 {
        i32::from(self.y_max) - i32::from(self.y_min)
    }

    /// Pixel size of the bitmap covering this box, `ceil(extent * scale) + 1`
    /// on each axis. A negative side becomes 0, a side past `u32::MAX` is
    /// an error.
    pub fn bitmap_size(&self, scale_x: f32, scale_y: f32) -> Result<(u32, u32), RasterError> {
        let side = |extent: i32, scale: f32| ((extent as f32 * scale).ceil() as i64).saturating_add(1).max(0);
        let (width, height) = (side(self.width(), scale_x), side(self.height(), scale_y));

        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(width), Ok(height)) => Ok((width, height)),
            _ => Err(RasterError::InvalidDimensions {
                width: u32::try_from(width).unwrap_or(u32::MAX),
                height: u32::try_from(height).unwrap_or(u32::MAX),
            }),
        }
    }
}

/// A point in pixel space, y pointing down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourPoint {
    pub x: f32,
    pub y: f32,
    pub on_curve: bool,
}

impl ContourPoint {
    pub fn new(x: f32, y: f32, on_curve: bool) -> Self {
        Self { x, y, on_curve }
    }

    pub fn midpoint(&self, other: &ContourPoint) -> ContourPoint {
        ContourPoint::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5, true)
    }
}

/// A closed contour, the last point connects back to the first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<ContourPoint>,
}

impl Contour {
    pub fn new(points: Vec<ContourPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The result of extracting a glyph at a given scale
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphOutline {
    pub bbox: BoundingBox,
    pub contours: Vec<Contour>,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl GlyphOutline {
    /// Scales `glyph` into pixel space, see [`scale_contours`]
    pub fn from_simple_glyph(glyph: &SimpleGlyph, bbox: BoundingBox, scale_x: f32, scale_y: f32) -> Self {
        Self {
            bbox,
            contours: scale_contours(glyph, scale_x, scale_y),
            scale_x,
            scale_y,
        }
    }

    /// Bitmap size needed to rasterize this outline
    pub fn bitmap_size(&self) -> Result<(u32, u32), RasterError> {
        self.bbox.bitmap_size(self.scale_x, self.scale_y)
    }
}

/// Moves every point to `((x - xMin) * sx, (yMax - y) * sy)` and inserts
/// an on-curve midpoint between each pair of consecutive off-curve points,
/// the closing pair (last, first) included.
pub fn scale_contours(glyph: &SimpleGlyph, scale_x: f32, scale_y: f32) -> Vec<Contour> {
    let x_min = f32::from(glyph.header.x_min);
    let y_max = f32::from(glyph.header.y_max);
    let to_pixels = |x: f32, y: f32| ((x - x_min) * scale_x, (y_max - y) * scale_y);

    glyph
        .contours
        .iter()
        .map(|raw| {
            let mut points = Vec::with_capacity(raw.len() * 2);
            for (i, point) in raw.iter().enumerate() {
                let next: &RawPoint = &raw[(i + 1) % raw.len()];

                let (x, y) = to_pixels(point.x as f32, point.y as f32);
                points.push(ContourPoint::new(x, y, point.on_curve));

                if !point.on_curve && !next.on_curve {
                    let (mx, my) = to_pixels(
                        (point.x as f32 + next.x as f32) * 0.5,
                        (point.y as f32 + next.y as f32) * 0.5,
                    );
                    points.push(ContourPoint::new(mx, my, true));
                }
            }
            Contour::new(points)
        })
        .collect()
}
