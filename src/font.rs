use std::path::Path;

use log::{debug, trace, warn};

use crate::{
    GlyphId, VeroTypeError,
    buffer::VeroBufReader,
    config::RenderConfig,
    image::RgbImage,
    outline::{BoundingBox, GlyphOutline},
    raster::{CoverageBitmap, GlyphBitmap, rasterize},
    sdf::to_sdf,
    tables::{
        OffsetTable, REQUIRED_TABLES, TableEncodingError, TableMetadata, TablesHeaders, Tag,
        cmap::{self, Cmap, CmapFormat},
        collection_font_offset,
        glyf::{GlyphError, GlyphHeader, SimpleGlyph},
        head::{Head, LocaFormat},
        hhea::Hhea,
        hmtx::{self, HorizontalMetrics},
        loca,
        maxp::Maxp,
    },
};

/// Font wide vertical metrics from `hhea`, in font units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerticalMetrics {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
}

/// A parsed TrueType/OpenType font.
///
/// The font owns its bytes and keeps the location of every table it reads
/// from. It is immutable once loaded, so a `&Font` can be shared freely.
#[derive(Debug, Clone)]
pub struct Font {
    data: Vec<u8>,
    tables: TablesHeaders,
    cmap: TableMetadata,
    /// Offset of the selected Unicode subtable, from the start of `cmap`
    cmap_subtable: usize,
    glyf: Option<TableMetadata>,
    loca: Option<TableMetadata>,
    hmtx: TableMetadata,
    kern: Option<TableMetadata>,
    gpos: Option<TableMetadata>,
    head: Head,
    hhea: Hhea,
    num_glyphs: u32,
}

impl Font {
    /// Loads the first face of a font or font collection
    pub fn from_data(data: Vec<u8>) -> Result<Self, VeroTypeError> {
        Self::from_collection(data, 0)
    }

    /// Loads face `index` of a `ttcf` collection; plain fonts only have face 0
    pub fn from_collection(data: Vec<u8>, index: u32) -> Result<Self, VeroTypeError> {
        let offset = collection_font_offset(&data, index)?;
        Self::load(data, offset)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VeroTypeError> {
        let data = std::fs::read(path.as_ref())?;
        debug!("Read {} bytes from {}", data.len(), path.as_ref().display());
        Self::from_data(data)
    }

    /// Parses the font whose offset table starts at `font_offset` in `data`
    pub fn load(data: Vec<u8>, font_offset: usize) -> Result<Self, VeroTypeError> {
        let reader = VeroBufReader::from_buffer(&data);
        let font_len = data.len();

        let offset_table = OffsetTable::from_reader(&reader, font_offset)?;
        let tables = TablesHeaders::from_reader(&reader, font_offset, offset_table.num_tables())?;
        for tag in tables.tags() {
            tables.locate(tag, font_len)?;
        }

        let [cmap, head, hhea, hmtx] = REQUIRED_TABLES.map(|tag| tables.require(tag, font_len));
        let (cmap, head, hhea, hmtx) = (cmap?, head?, hhea?, hmtx?);

        let glyf = tables.locate(Tag::GLYF, font_len)?;
        let loca = tables.locate(Tag::LOCA, font_len)?;
        if glyf.is_some() && loca.is_none() {
            return Err(TableEncodingError::MissingTable(Tag::LOCA).into());
        }

        let head = Head::from_reader(&reader, &head)?;
        let hhea = Hhea::from_reader(&reader, &hhea)?;
        let maxp = tables
            .locate(Tag::MAXP, font_len)?
            .map(|metadata| Maxp::from_reader(&reader, &metadata))
            .transpose()?;

        let cmap_subtable = Cmap::from_reader(&reader, &cmap)?
            .unicode_subtable()
            .map(|sub| sub.offset as usize)
            .ok_or(TableEncodingError::NoUnicodeCmap)?;

        let num_glyphs = u32::from(maxp.map_or(hhea.num_of_long_hor_metrics, |maxp| maxp.num_glyphs));

        debug!(
            "Loaded {:?} font: {} tables [{}], loca {:?}, cmap format {:?}, {} glyphs",
            offset_table.signature(),
            tables.len(),
            tables.tags().map(|tag| tag.to_string()).collect::<Vec<_>>().join(", "),
            head.index_to_loc_format,
            reader
                .u16_at(cmap.offset() + cmap_subtable)
                .map(CmapFormat::from)
                .ok(),
            num_glyphs,
        );

        Ok(Self {
            kern: tables.locate(Tag::KERN, font_len)?,
            gpos: tables.locate(Tag::GPOS, font_len)?,
            data,
            tables,
            cmap,
            cmap_subtable,
            glyf,
            loca,
            hmtx,
            head,
            hhea,
            num_glyphs,
        })
    }

    /// Bytes of a table, every record was bounds checked at load
    fn table_data(&self, metadata: &TableMetadata) -> &[u8] {
        self.data
            .get(metadata.offset()..metadata.offset() + metadata.length())
            .unwrap_or(&[])
    }

    fn table_reader(&self, metadata: &TableMetadata) -> VeroBufReader<'_> {
        VeroBufReader::from_buffer(self.table_data(metadata))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Raw bytes of any table in the directory
    pub fn table(&self, tag: Tag) -> Option<&[u8]> {
        self.tables.find(tag).map(|metadata| self.table_data(metadata))
    }

    /// The raw `kern` table, when present. It is not applied by the rasterizer
    pub fn kern_table(&self) -> Option<&[u8]> {
        self.kern.as_ref().map(|metadata| self.table_data(metadata))
    }

    /// The raw `GPOS` table, when present
    pub fn gpos_table(&self) -> Option<&[u8]> {
        self.gpos.as_ref().map(|metadata| self.table_data(metadata))
    }

    pub fn num_glyphs(&self) -> u32 {
        self.num_glyphs
    }

    pub fn units_per_em(&self) -> u16 {
        self.head.units_per_em
    }

    pub fn loca_format(&self) -> LocaFormat {
        self.head.index_to_loc_format
    }

    /// Whether the font has TrueType outlines; CFF fonts render as empty glyphs
    pub fn has_outlines(&self) -> bool {
        self.glyf.is_some()
    }

    pub fn v_metrics(&self) -> VerticalMetrics {
        VerticalMetrics {
            ascender: self.hhea.ascender,
            descender: self.hhea.descender,
            line_gap: self.hhea.line_gap,
        }
    }

    /// Scale factor mapping the em box onto `pixel_height` pixels
    pub fn scale_for_pixel_height(&self, pixel_height: f32) -> f32 {
        pixel_height / f32::from(self.head.units_per_em.max(1))
    }

    /// Maps a Unicode codepoint to a glyph, unmapped codepoints give glyph 0
    pub fn glyph_index(&self, codepoint: u32) -> GlyphId {
        cmap::glyph_index(&self.table_reader(&self.cmap), self.cmap_subtable, codepoint)
    }

    pub fn glyph_index_for_char(&self, ch: char) -> GlyphId {
        self.glyph_index(u32::from(ch))
    }

    /// Advance width and left side bearing of `glyph`. Glyphs the `hmtx`
    /// table doesn't cover get zeroed metrics.
    pub fn h_metrics(&self, glyph: GlyphId) -> HorizontalMetrics {
        let table = self.table_reader(&self.hmtx);
        match hmtx::lookup(&table, self.hhea.num_of_long_hor_metrics, glyph) {
            Ok(metrics) => metrics,
            Err(err) => {
                warn!("No horizontal metrics for glyph {glyph}: {err}");
                HorizontalMetrics::default()
            }
        }
    }

    pub fn glyph_advance(&self, glyph: GlyphId) -> u16 {
        self.h_metrics(glyph).advance_width
    }

    /// The glyph's description in `glyf`, `None` when it has no outline
    fn glyph_data(&self, glyph: GlyphId) -> Result<Option<&[u8]>, VeroTypeError> {
        let (Some(glyf), Some(loca)) = (&self.glyf, &self.loca) else {
            return Ok(None);
        };
        if glyph >= self.num_glyphs {
            return Ok(None);
        }

        let Some(range) = loca::glyph_range(&self.table_reader(loca), self.loca_format(), glyph)?
        else {
            return Ok(None);
        };

        let glyf = self.table_reader(glyf);
        Ok(Some(glyf.slice(range.start, range.len())?))
    }

    fn glyph_header(&self, glyph: GlyphId) -> Result<Option<GlyphHeader>, VeroTypeError> {
        let Some(data) = self.glyph_data(glyph)? else {
            return Ok(None);
        };

        let header = GlyphHeader::from_reader(&mut VeroBufReader::from_buffer(data))?;
        Ok(Some(header))
    }

    /// The glyph's box from its `glyf` header along with its `hmtx` metrics.
    /// Glyphs without an outline have an all zero box.
    pub fn glyph_bbox(&self, glyph: GlyphId) -> Result<BoundingBox, VeroTypeError> {
        let header = self.glyph_header(glyph)?.unwrap_or_default();
        let metrics = self.h_metrics(glyph);

        Ok(BoundingBox {
            x_min: header.x_min,
            y_min: header.y_min,
            x_max: header.x_max,
            y_max: header.y_max,
            advance_width: metrics.advance_width,
            left_side_bearing: metrics.left_side_bearing,
        })
    }

    /// Decodes `glyph` and scales its contours into pixel space.
    ///
    /// `None` means there is nothing to draw: glyph 0 (notdef), a blank
    /// glyph, an index past the end of the font, a font without `glyf`, or
    /// a composite glyph.
    pub fn extract_contours(
        &self,
        glyph: GlyphId,
        scale_x: f32,
        scale_y: f32,
    ) -> Result<Option<GlyphOutline>, VeroTypeError> {
        if glyph == 0 {
            trace!("Glyph 0 is notdef, rendering it empty");
            return Ok(None);
        }
        let Some(data) = self.glyph_data(glyph)? else {
            trace!("Glyph {glyph} has no outline");
            return Ok(None);
        };

        let simple = match SimpleGlyph::parse(data) {
            Ok(simple) => simple,
            Err(GlyphError::UnsupportedGlyphFormat(contours)) => {
                debug!("Glyph {glyph} is a composite ({contours} contours), rendering it empty");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        if simple.contours.is_empty() {
            return Ok(None);
        }
        trace!(
            "Glyph {glyph}: {} contours, {} points",
            simple.contours.len(),
            simple.num_points()
        );

        let metrics = self.h_metrics(glyph);
        let bbox = BoundingBox {
            x_min: simple.header.x_min,
            y_min: simple.header.y_min,
            x_max: simple.header.x_max,
            y_max: simple.header.y_max,
            advance_width: metrics.advance_width,
            left_side_bearing: metrics.left_side_bearing,
        };

        Ok(Some(GlyphOutline::from_simple_glyph(&simple, bbox, scale_x, scale_y)))
    }

    /// Size of the blank bitmap standing in for a glyph without outline:
    /// its advance wide and the font's ascender to descender tall
    fn empty_glyph_size(&self, glyph: GlyphId, scale_x: f32, scale_y: f32) -> (u32, u32) {
        let advance = f32::from(self.glyph_advance(glyph));
        let extent = f32::from(self.hhea.ascender) - f32::from(self.hhea.descender);
        let clamp = |v: f32| if v > 0.0 { v.ceil() as u32 } else { 0 };

        (clamp(advance * scale_x), clamp(extent * scale_y))
    }

    /// Rasterizes `glyph` into an anti-aliased coverage bitmap
    pub fn glyph_bitmap(&self, glyph: GlyphId, scale_x: f32, scale_y: f32) -> Result<GlyphBitmap, VeroTypeError> {
        let Some(outline) = self.extract_contours(glyph, scale_x, scale_y)? else {
            let (width, height) = self.empty_glyph_size(glyph, scale_x, scale_y);
            return Ok(GlyphBitmap {
                bitmap: CoverageBitmap::new(width, height)?,
                x_offset: 0,
                y_offset: 0,
            });
        };

        let (width, height) = outline.bitmap_size()?;
        let bitmap = rasterize(&outline.contours, width, height)?;
        trace!("Glyph {glyph} rasterized at {width}x{height}");

        Ok(GlyphBitmap {
            bitmap,
            x_offset: (f32::from(outline.bbox.x_min) * scale_x) as i32,
            y_offset: (f32::from(outline.bbox.y_max) * scale_y) as i32,
        })
    }

    /// Rasterizes `glyph` then turns the coverage into a signed distance
    /// field of the given `spread`. The returned bitmap holds distances.
    pub fn glyph_sdf(
        &self,
        glyph: GlyphId,
        scale_x: f32,
        scale_y: f32,
        spread: u32,
    ) -> Result<GlyphBitmap, VeroTypeError> {
        let GlyphBitmap {
            bitmap,
            x_offset,
            y_offset,
        } = self.glyph_bitmap(glyph, scale_x, scale_y)?;

        Ok(GlyphBitmap {
            bitmap: to_sdf(&bitmap, spread)?.into_bitmap(),
            x_offset,
            y_offset,
        })
    }

    /// Rasterizes `glyph` and tints it with `color` on a black background
    pub fn render_glyph_to_image(
        &self,
        glyph: GlyphId,
        scale_x: f32,
        scale_y: f32,
        color: [u8; 3],
    ) -> Result<RgbImage, VeroTypeError> {
        let glyph_bitmap = self.glyph_bitmap(glyph, scale_x, scale_y)?;
        Ok(RgbImage::from_coverage(&glyph_bitmap.bitmap, color)?)
    }

    /// Runs the whole pipeline for one character
    pub fn render_char(&self, ch: char, config: &RenderConfig) -> Result<RgbImage, VeroTypeError> {
        let glyph = self.glyph_index_for_char(ch);
        let scale = self.scale_for_pixel_height(config.pixel_height);
        debug!("Rendering {ch:?} as glyph {glyph} at scale {scale}");

        let glyph_bitmap = match config.sdf_spread {
            Some(spread) => self.glyph_sdf(glyph, scale, scale, spread)?,
            None => self.glyph_bitmap(glyph, scale, scale)?,
        };

        Ok(RgbImage::from_coverage(&glyph_bitmap.bitmap, config.color)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::ContourPoint;
    use crate::raster::RasterError;
    use crate::test_font::{FontBuilder, square_glyph};

    fn load(builder: FontBuilder) -> Font {
        Font::from_data(builder.build()).unwrap()
    }

    fn font() -> Font {
        load(FontBuilder::new())
    }

    #[test]
    fn loads_tables_and_metrics() {
        let font = font();

        assert_eq!(font.units_per_em(), 1000);
        assert_eq!(font.num_glyphs(), 3);
        assert_eq!(font.loca_format(), LocaFormat::Short);
        assert!(font.has_outlines());
        assert!(font.kern_table().is_none());
        assert_eq!(
            font.v_metrics(),
            VerticalMetrics {
                ascender: 800,
                descender: -200,
                line_gap: 0
            }
        );
    }

    #[test]
    fn maps_characters() {
        let font = font();

        assert_eq!(font.glyph_index_for_char('A'), 1);
        assert_eq!(font.glyph_index_for_char(' '), 2);
        assert_eq!(font.glyph_index_for_char('B'), 0);
        assert_eq!(font.glyph_index(0x1F600), 0);
    }

    #[test]
    fn missing_required_table() {
        let data = FontBuilder::new().without(b"hhea").build();
        assert!(matches!(
            Font::from_data(data),
            Err(VeroTypeError::TableEncodingError(TableEncodingError::MissingTable(Tag::HHEA)))
        ));
    }

    #[test]
    fn glyf_without_loca() {
        let data = FontBuilder::new().without(b"loca").build();
        assert!(matches!(
            Font::from_data(data),
            Err(VeroTypeError::TableEncodingError(TableEncodingError::MissingTable(Tag::LOCA)))
        ));
    }

    #[test]
    fn bad_signature() {
        let mut data = FontBuilder::new().build();
        data[..4].copy_from_slice(b"wOFF");
        assert!(matches!(
            Font::from_data(data),
            Err(VeroTypeError::TableEncodingError(TableEncodingError::InvalidSignature(_)))
        ));
    }

    #[test]
    fn table_past_the_end() {
        let mut data = FontBuilder::new().build();
        let len = data.len();
        data.truncate(len - 4);
        assert!(matches!(
            Font::from_data(data),
            Err(VeroTypeError::TableEncodingError(TableEncodingError::TableOutOfBounds { .. }))
        ));
    }

    #[test]
    fn no_unicode_cmap() {
        let data = FontBuilder::new().cmap_platform(1, 0).build();
        assert!(matches!(
            Font::from_data(data),
            Err(VeroTypeError::TableEncodingError(TableEncodingError::NoUnicodeCmap))
        ));
    }

    #[test]
    fn glyph_count_falls_back_to_hhea() {
        let font = load(FontBuilder::new().without(b"maxp"));
        assert_eq!(font.num_glyphs(), 3);
    }

    #[test]
    fn bbox_and_metrics() {
        let font = font();
        let bbox = font.glyph_bbox(1).unwrap();

        assert_eq!((bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max), (100, 0, 500, 400));
        assert_eq!(bbox.advance_width, 600);
        assert_eq!(bbox.left_side_bearing, 100);

        let blank = font.glyph_bbox(2).unwrap();
        assert_eq!((blank.x_min, blank.x_max), (0, 0));
        assert_eq!(blank.advance_width, 250);
    }

    #[test]
    fn extracts_scaled_square() {
        let font = font();
        let outline = font.extract_contours(1, 0.25, 0.25).unwrap().unwrap();

        assert_eq!(outline.contours.len(), 1);
        assert_eq!(outline.contours[0].points[0], ContourPoint::new(0.0, 100.0, true));
        assert_eq!(outline.contours[0].points[2], ContourPoint::new(100.0, 0.0, true));
        assert_eq!(outline.bitmap_size(), Ok((101, 101)));
    }

    #[test]
    fn long_loca_offsets() {
        let font = load(FontBuilder::new().long_loca());

        assert_eq!(font.loca_format(), LocaFormat::Long);
        assert!(font.extract_contours(1, 1.0, 1.0).unwrap().is_some());
        assert!(font.extract_contours(2, 1.0, 1.0).unwrap().is_none());
    }

    #[test]
    fn collection_faces() {
        let data = FontBuilder::collection(&[
            FontBuilder::new(),
            FontBuilder::new().push_glyph(u16::from(b'B'), square_glyph(), 700),
        ]);

        let first = Font::from_data(data.clone()).unwrap();
        assert_eq!(first.glyph_index_for_char('B'), 0);

        let second = Font::from_collection(data.clone(), 1).unwrap();
        assert_eq!(second.glyph_index_for_char('B'), 3);
        assert_eq!(second.glyph_advance(3), 700);

        assert!(matches!(
            Font::from_collection(data, 2),
            Err(VeroTypeError::TableEncodingError(TableEncodingError::FaceIndexOutOfRange {
                index: 2,
                faces: 2
            }))
        ));
    }

    #[test]
    fn extra_tables_are_reachable() {
        let font = load(FontBuilder::new().table(b"kern", vec![0, 1, 0, 0]));

        assert_eq!(font.kern_table(), Some(&[0u8, 1, 0, 0][..]));
        assert_eq!(font.table(Tag::KERN), font.kern_table());
        assert!(font.gpos_table().is_none());
    }

    #[test]
    fn empty_and_out_of_range_glyphs_have_no_outline() {
        let font = font();

        assert!(font.extract_contours(2, 1.0, 1.0).unwrap().is_none());
        assert!(font.extract_contours(3, 1.0, 1.0).unwrap().is_none());
        assert!(font.extract_contours(u32::MAX, 1.0, 1.0).unwrap().is_none());
    }

    #[test]
    fn composite_glyph_is_empty() {
        let mut composite = (-1i16).to_be_bytes().to_vec();
        composite.extend_from_slice(&[0; 8]);
        let font = load(FontBuilder::new().glyph(1, composite));

        assert!(font.extract_contours(1, 1.0, 1.0).unwrap().is_none());
    }

    #[test]
    fn truncated_glyph_is_an_error() {
        let mut glyph = square_glyph();
        glyph.truncate(glyph.len() - 3);
        let font = load(FontBuilder::new().glyph(1, glyph));

        assert!(matches!(
            font.extract_contours(1, 1.0, 1.0),
            Err(VeroTypeError::GlyphError(GlyphError::Buffer(_)))
        ));
    }

    #[test]
    fn empty_glyph_bitmap_is_advance_sized() {
        let font = font();
        let scale = 1.0 / 32.0;
        let glyph = font.glyph_bitmap(2, scale, scale).unwrap();

        // ceil(250 / 32) by ceil(1000 / 32)
        assert_eq!(glyph.bitmap.width(), 8);
        assert_eq!(glyph.bitmap.height(), 32);
        assert!(glyph.bitmap.as_raw().iter().all(|&c| c == 0));
        assert_eq!((glyph.x_offset, glyph.y_offset), (0, 0));
    }

    #[test]
    fn notdef_renders_empty_even_with_an_outline() {
        let font = load(FontBuilder::new().glyph(0, square_glyph()));
        let scale = 1.0 / 32.0;
        assert_eq!(font.glyph_index_for_char('z'), 0);
        assert!(font.glyph_data(0).unwrap().is_some());

        assert!(font.extract_contours(0, scale, scale).unwrap().is_none());
        let glyph = font.glyph_bitmap(0, scale, scale).unwrap();
        // advance sized like any blank glyph, ceil(500 / 32) by ceil(1000 / 32)
        assert_eq!((glyph.bitmap.width(), glyph.bitmap.height()), (16, 32));
        assert!(glyph.bitmap.as_raw().iter().all(|&c| c == 0));

        let sdf = font.glyph_sdf(0, scale, scale, 4).unwrap();
        assert_eq!(sdf.bitmap.width(), glyph.bitmap.width());
        assert_eq!(sdf.bitmap.height(), glyph.bitmap.height());
    }

    #[test]
    fn oversized_scales_are_rejected() {
        let font = font();

        assert!(matches!(
            font.glyph_bitmap(1, 1e12, 1e12),
            Err(VeroTypeError::RasterError(RasterError::InvalidDimensions { .. }))
        ));
        assert!(matches!(
            font.glyph_bitmap(1, f32::MAX, f32::MAX),
            Err(VeroTypeError::RasterError(RasterError::InvalidDimensions { .. }))
        ));
    }

    #[test]
    fn glyph_bitmap_offsets() {
        let font = font();
        let scale = 1.0 / 32.0;
        let glyph = font.glyph_bitmap(1, scale, scale).unwrap();

        // 400 / 32 = 12.5, rounded up plus one
        assert_eq!(glyph.bitmap.width(), 14);
        assert_eq!(glyph.bitmap.height(), 14);
        assert_eq!((glyph.x_offset, glyph.y_offset), (3, 12));
        assert_eq!(glyph.bitmap.get(4, 4), Some(255));
        assert_eq!(glyph.bitmap.get(13, 4), Some(0));
    }

    #[test]
    fn sdf_keeps_offsets() {
        let font = font();
        let scale = 1.0 / 16.0;
        let sdf = font.glyph_sdf(1, scale, scale, 4).unwrap();

        assert_eq!((sdf.x_offset, sdf.y_offset), (6, 25));
        assert_eq!(sdf.bitmap.get(12, 12), Some(0));
        assert!(sdf.bitmap.get(25, 25).unwrap() > 127);
    }

    #[test]
    fn render_char_uses_config() {
        let font = font();
        // 31.25 px over 1000 units is a scale of exactly 1/32
        let config = RenderConfig::default()
            .with_pixel_height(31.25)
            .with_color([0, 255, 0]);
        let image = font.render_char('A', &config).unwrap();

        assert_eq!((image.width(), image.height()), (14, 14));
        assert_eq!(image.get_pixel(4, 4), Some([0, 255, 0]));
        assert_eq!(image.get_pixel(13, 13), Some([0, 0, 0]));
    }
}
