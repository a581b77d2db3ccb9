use log::{trace, warn};

use crate::{
    GlyphId,
    buffer::{VeroBufReader, VeroBufReaderError},
};

use super::{TableEncodingError, TableMetadata};

/// A representation of the [cmap table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html)
/// header and its encoding records.
#[derive(Debug, Clone)]
pub struct Cmap {
    /// The version of the cmap table
    /// it's almost guarenteed to be set to zero
    pub version: u16,

    /// The encoding records, in the order the font declares them
    pub subtables: Vec<CmapSub>,
}

/// A representation of the cmap [sub table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html)
/// encoding record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmapSub {
    /// The platform identifier
    pub platform_id: u16,

    /// The platform specific encoding identifier
    pub platform_specific_id: u16,

    /// The offset of the mapping table, from the start of `cmap`
    pub offset: u32,
}

impl CmapSub {
    /// Unicode platform, or Windows with the Unicode BMP (1) / full (10) encodings
    pub fn is_unicode(&self) -> bool {
        self.platform_id == 0
            || (self.platform_id == 3
                && (self.platform_specific_id == 1 || self.platform_specific_id == 10))
    }
}

impl Cmap {
    pub(crate) fn from_reader(
        reader: &VeroBufReader<'_>,
        metadata: &TableMetadata,
    ) -> Result<Self, TableEncodingError> {
        let base = metadata.offset();
        let version = reader.u16_at(base)?;
        let count = reader.u16_at(base + 2)?;

        let subtables = (0..usize::from(count))
            .map(|i| -> Result<CmapSub, VeroBufReaderError> {
                let record = base + 4 + i * 8;
                Ok(CmapSub {
                    platform_id: reader.u16_at(record)?,
                    platform_specific_id: reader.u16_at(record + 2)?,
                    offset: reader.u32_at(record + 4)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { version, subtables })
    }

    /// The first Unicode subtable in declared order, no scoring
    pub fn unicode_subtable(&self) -> Option<&CmapSub> {
        self.subtables.iter().find(|sub| sub.is_unicode())
    }
}

/// The mapping subtable formats we know how to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmapFormat {
    ByteEncoding,
    SegmentMapping,
    TrimmedTable,
    SegmentedCoverage,
    ManyToOneRange,
    Unsupported(u16),
}

impl From<u16> for CmapFormat {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::ByteEncoding,
            4 => Self::SegmentMapping,
            6 => Self::TrimmedTable,
            12 => Self::SegmentedCoverage,
            13 => Self::ManyToOneRange,
            _ => Self::Unsupported(value),
        }
    }
}

/// Maps `codepoint` through the subtable found at `subtable` in `table`.
///
/// Never fails: unmapped codepoints, unsupported formats and truncated
/// subtables all resolve to glyph 0.
pub fn glyph_index(table: &VeroBufReader<'_>, subtable: usize, codepoint: u32) -> GlyphId {
    match lookup(table, subtable, codepoint) {
        Ok(glyph) => glyph,
        Err(err) => {
            warn!("cmap lookup for U+{codepoint:04X} hit truncated data: {err}");
            0
        }
    }
}

fn lookup(table: &VeroBufReader<'_>, at: usize, codepoint: u32) -> Result<GlyphId, VeroBufReaderError> {
    match CmapFormat::from(table.u16_at(at)?) {
        CmapFormat::ByteEncoding => {
            let length = u32::from(table.u16_at(at + 2)?);
            if codepoint < length.saturating_sub(6) {
                return Ok(u32::from(table.u8_at(at + 6 + codepoint as usize)?));
            }
            Ok(0)
        }
        CmapFormat::SegmentMapping => segment_mapping(table, at, codepoint),
        CmapFormat::TrimmedTable => {
            let first = u32::from(table.u16_at(at + 6)?);
            let count = u32::from(table.u16_at(at + 8)?);
            if codepoint >= first && codepoint < first + count {
                let entry = at + 10 + (codepoint - first) as usize * 2;
                return Ok(u32::from(table.u16_at(entry)?));
            }
            Ok(0)
        }
        format @ (CmapFormat::SegmentedCoverage | CmapFormat::ManyToOneRange) => {
            let groups = table.u32_at(at + 12)? as usize;
            for i in 0..groups {
                let group = at + 16 + i * 12;
                let start_char = table.u32_at(group)?;
                let end_char = table.u32_at(group + 4)?;
                if (start_char..=end_char).contains(&codepoint) {
                    let start_glyph = table.u32_at(group + 8)?;
                    return Ok(match format {
                        CmapFormat::SegmentedCoverage => {
                            start_glyph.wrapping_add(codepoint - start_char)
                        }
                        _ => start_glyph,
                    });
                }
            }
            Ok(0)
        }
        CmapFormat::Unsupported(format) => {
            trace!("cmap format {format} is not supported");
            Ok(0)
        }
    }
}

fn segment_mapping(table: &VeroBufReader<'_>, at: usize, codepoint: u32) -> Result<GlyphId, VeroBufReaderError> {
    let seg_count = usize::from(table.u16_at(at + 6)? >> 1);
    let end_codes = at + 14;
    // +2 skips reservedPad
    let start_codes = end_codes + seg_count * 2 + 2;
    let id_deltas = start_codes + seg_count * 2;
    let id_range_offsets = id_deltas + seg_count * 2;

    for i in 0..seg_count {
        let end = u32::from(table.u16_at(end_codes + i * 2)?);
        if codepoint > end {
            continue;
        }

        let start = u32::from(table.u16_at(start_codes + i * 2)?);
        if codepoint < start {
            return Ok(0);
        }

        let delta = i64::from(table.i16_at(id_deltas + i * 2)?);
        let range_offset_at = id_range_offsets + i * 2;
        let range_offset = usize::from(table.u16_at(range_offset_at)?);

        if range_offset == 0 {
            return Ok(((i64::from(codepoint) + delta) & 0xFFFF) as u32);
        }

        let glyph_at = range_offset_at + range_offset + (codepoint - start) as usize * 2;
        let glyph = i64::from(table.u16_at(glyph_at)?);
        if glyph == 0 {
            return Ok(0);
        }
        return Ok(((glyph + delta) & 0xFFFF) as u32);
    }

    Ok(0)
}
