use crate::buffer::VeroBufReader;

use super::{TableEncodingError, TableMetadata};

/// Width of the entries in the `loca` table, chosen by `indexToLocFormat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaFormat {
    /// 2 byte entries storing the offset divided by two
    Short,
    /// 4 byte entries storing the offset verbatim
    Long,
}

impl From<i16> for LocaFormat {
    fn from(value: i16) -> Self {
        match value {
            0 => Self::Short,
            _ => Self::Long,
        }
    }
}

/// A representation of the [head table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6head.html)
/// reduced to the fields the rasterizer depends on
#[derive(Debug, Clone, Copy)]
pub struct Head {
    /// Magic number, obselete, always set to 0x5F0F3CF5
    pub magic_number: u32,

    /// Units per em (ranges from 64 to 16384)
    pub units_per_em: u16,

    /// The minimum x value for all glyph bounding boxes
    pub x_min: i16,

    /// The minimum y value for all glyph bounding boxes
    pub y_min: i16,

    /// The maximum x value for all glyph bounding boxes
    pub x_max: i16,

    /// The maximum y value for all glyph bounding boxes
    pub y_max: i16,

    /// Index to loc format, 0 for short offsets and anything else for long
    pub index_to_loc_format: LocaFormat,
}

impl Head {
    /// The fixed size of version 1.0 of the table
    pub const SIZE: usize = 54;

    pub(crate) fn from_reader(
        reader: &VeroBufReader<'_>,
        metadata: &TableMetadata,
    ) -> Result<Self, TableEncodingError> {
        if metadata.length() < Self::SIZE {
            return Err(TableEncodingError::InvalidBufferLength(
                Self::SIZE,
                metadata.length(),
            ));
        }
        let base = metadata.offset();

        Ok(Self {
            magic_number: reader.u32_at(base + 12)?,
            units_per_em: reader.u16_at(base + 18)?,
            x_min: reader.i16_at(base + 36)?,
            y_min: reader.i16_at(base + 38)?,
            x_max: reader.i16_at(base + 40)?,
            y_max: reader.i16_at(base + 42)?,
            index_to_loc_format: LocaFormat::from(reader.i16_at(base + 50)?),
        })
    }
}
