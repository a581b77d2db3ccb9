use crate::buffer::VeroBufReader;

use super::{TableEncodingError, TableMetadata};

/// The part of the [maxp table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6maxp.html)
/// shared by both the 0.5 (CFF) and 1.0 (TrueType) versions
#[derive(Debug, Clone, Copy)]
pub struct Maxp {
    pub version: u32,
    pub num_glyphs: u16,
}

impl Maxp {
    pub const SIZE: usize = 6;

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
            version: reader.u32_at(base)?,
            num_glyphs: reader.u16_at(base + 4)?,
        })
    }
}
