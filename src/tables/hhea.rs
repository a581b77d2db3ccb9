use crate::buffer::VeroBufReader;

use super::{TableEncodingError, TableMetadata};

/// A representation of the [hhea table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hhea.html)
#[derive(Debug, Clone, Copy)]
pub struct Hhea {
    /// Distance from baseline of highest ascender
    pub ascender: i16,

    /// Distance from baseline of lowest descender, usually negative
    pub descender: i16,

    /// Typographic line gap
    pub line_gap: i16,

    /// Maximum advance width value in `hmtx`
    pub advance_width_max: u16,

    /// Number of advance widths in `hmtx`
    pub num_of_long_hor_metrics: u16,
}

impl Hhea {
    pub const SIZE: usize = 36;

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
            ascender: reader.i16_at(base + 4)?,
            descender: reader.i16_at(base + 6)?,
            line_gap: reader.i16_at(base + 8)?,
            advance_width_max: reader.u16_at(base + 10)?,
            num_of_long_hor_metrics: reader.u16_at(base + 34)?,
        })
    }
}
