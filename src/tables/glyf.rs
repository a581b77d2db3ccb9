use thiserror::Error;

use crate::buffer::{VeroBufReader, VeroBufReaderError};

const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE_SHORT: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE_SHORT: u8 = 0x20;

/// Errors raised while decoding a single glyph description
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GlyphError {
    /// Composite glyphs (negative contour count) are not decoded
    #[error("Unsupported glyph format, numberOfContours = {0}")]
    UnsupportedGlyphFormat(i16),

    /// `endPtsOfContours` must be increasing
    #[error("Contour end point {end} precedes contour start {start}")]
    MalformedContours { start: usize, end: usize },

    #[error(transparent)]
    Buffer(#[from] VeroBufReaderError),
}

/// The 10 byte header shared by every glyph description in the
/// [glyf table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6glyf.html)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlyphHeader {
    /// Negative for composite glyphs
    pub number_of_contours: i16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

impl GlyphHeader {
    pub fn from_reader(reader: &mut VeroBufReader<'_>) -> Result<Self, VeroBufReaderError> {
        Ok(Self {
            number_of_contours: reader.read_i16()?,
            x_min: reader.read_i16()?,
            y_min: reader.read_i16()?,
            x_max: reader.read_i16()?,
            y_max: reader.read_i16()?,
        })
    }

    pub fn is_composite(&self) -> bool {
        self.number_of_contours < 0
    }
}

/// A decoded outline point in font units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPoint {
    pub x: i32,
    pub y: i32,
    pub on_curve: bool,
}

/// A simple glyph: its header and every contour's points in font units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleGlyph {
    pub header: GlyphHeader,
    pub contours: Vec<Vec<RawPoint>>,
}

impl SimpleGlyph {
    /// Decodes the glyph description in `data`, which must be the exact
    /// byte range `loca` assigned to the glyph.
    pub fn parse(data: &[u8]) -> Result<Self, GlyphError> {
        let mut reader = VeroBufReader::from_buffer(data);
        let header = GlyphHeader::from_reader(&mut reader)?;

        if header.is_composite() {
            return Err(GlyphError::UnsupportedGlyphFormat(header.number_of_contours));
        }

        let num_contours = header.number_of_contours as usize;
        let end_points = (0..num_contours)
            .map(|_| reader.read_u16().map(usize::from))
            .collect::<Result<Vec<_>, _>>()?;

        let mut start = 0usize;
        for &end in &end_points {
            if end < start {
                return Err(GlyphError::MalformedContours { start, end });
            }
            start = end + 1;
        }
        // end points are strictly increasing, so the last one bounds them all
        let num_points = start;

        let instruction_length = reader.read_u16()?;
        reader.skip(usize::from(instruction_length))?;

        let flags = read_flags(&mut reader, num_points)?;
        let xs = read_coordinates(&mut reader, &flags, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE_SHORT)?;
        let ys = read_coordinates(&mut reader, &flags, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE_SHORT)?;

        let mut contours = Vec::with_capacity(num_contours);
        let mut start = 0usize;
        for &end in &end_points {
            let points = (start..=end)
                .map(|i| RawPoint {
                    x: xs[i],
                    y: ys[i],
                    on_curve: flags[i] & ON_CURVE_POINT != 0,
                })
                .collect();
            contours.push(points);
            start = end + 1;
        }

        Ok(Self { header, contours })
    }

    pub fn num_points(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }
}

fn read_flags(reader: &mut VeroBufReader<'_>, num_points: usize) -> Result<Vec<u8>, VeroBufReaderError> {
    let mut flags = Vec::with_capacity(num_points);
    while flags.len() < num_points {
        let flag = reader.read_u8()?;
        flags.push(flag);

        if flag & REPEAT_FLAG != 0 {
            let repeat = usize::from(reader.read_u8()?);
            let room = num_points - flags.len();
            flags.extend(std::iter::repeat_n(flag, repeat.min(room)));
        }
    }

    Ok(flags)
}

/// Coordinates are stored as deltas from the previous point
fn read_coordinates(
    reader: &mut VeroBufReader<'_>,
    flags: &[u8],
    short_vector: u8,
    same_or_positive: u8,
) -> Result<Vec<i32>, VeroBufReaderError> {
    let mut value = 0i32;
    flags
        .iter()
        .map(|&flag| -> Result<i32, VeroBufReaderError> {
            if flag & short_vector != 0 {
                let delta = i32::from(reader.read_u8()?);
                if flag & same_or_positive != 0 {
                    value = value.wrapping_add(delta);
                } else {
                    value = value.wrapping_sub(delta);
                }
            } else if flag & same_or_positive == 0 {
                value = value.wrapping_add(i32::from(reader.read_i16()?));
            }
            Ok(value)
        })
        .collect()
}
