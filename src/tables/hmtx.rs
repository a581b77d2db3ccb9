use crate::buffer::{VeroBufReader, VeroBufReaderError};

/// Horizontal metrics of a single glyph, in font units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HorizontalMetrics {
    pub advance_width: u16,
    pub left_side_bearing: i16,
}

/// Looks up a glyph in the [hmtx table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hmtx.html).
///
/// `table` must be scoped to the bytes of `hmtx`. Glyphs past
/// `num_long_metrics` share the last advance width and read their bearing
/// from the trailing `leftSideBearing` array.
pub fn lookup(
    table: &VeroBufReader<'_>,
    num_long_metrics: u16,
    glyph: u32,
) -> Result<HorizontalMetrics, VeroBufReaderError> {
    if num_long_metrics == 0 {
        return Ok(HorizontalMetrics::default());
    }
    let num_long = u32::from(num_long_metrics);

    if glyph < num_long {
        let record = glyph as usize * 4;
        return Ok(HorizontalMetrics {
            advance_width: table.u16_at(record)?,
            left_side_bearing: table.i16_at(record + 2)?,
        });
    }

    let advance_width = table.u16_at((num_long as usize - 1) * 4)?;
    let bearing = num_long as usize * 4 + (glyph - num_long) as usize * 2;

    Ok(HorizontalMetrics {
        advance_width,
        left_side_bearing: table.i16_at(bearing)?,
    })
}
