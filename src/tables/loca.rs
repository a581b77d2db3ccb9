use std::ops::Range;

use crate::buffer::{VeroBufReader, VeroBufReaderError};

use super::head::LocaFormat;

/// Resolves the byte range of `glyph` inside `glyf` using the
/// [loca table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6loca.html).
///
/// `table` must be scoped to the bytes of `loca`. Returns `None` when both
/// entries are equal, which is how fonts encode a glyph without outline,
/// and for a malformed range whose end precedes its start.
pub fn glyph_range(
    table: &VeroBufReader<'_>,
    format: LocaFormat,
    glyph: u32,
) -> Result<Option<Range<usize>>, VeroBufReaderError> {
    let index = glyph as usize;
    let (start, end) = match format {
        LocaFormat::Short => (
            usize::from(table.u16_at(index * 2)?) * 2,
            usize::from(table.u16_at(index * 2 + 2)?) * 2,
        ),
        LocaFormat::Long => (
            table.u32_at(index * 4)? as usize,
            table.u32_at(index * 4 + 4)? as usize,
        ),
    };

    if start >= end {
        return Ok(None);
    }

    Ok(Some(start..end))
}
