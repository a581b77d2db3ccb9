//! Builds small in-memory TrueType fonts for tests.
//!
//! Only depends on std so the integration tests can pull it in with
//! `#[path]` as well.

#![allow(dead_code)]

const ON_CURVE: u8 = 0x01;

/// A one contour square from (100, 0) to (500, 400), all coordinates long
pub fn square_glyph() -> Vec<u8> {
    let mut data = Vec::new();
    for v in [1i16, 100, 0, 500, 400] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    // endPtsOfContours, instructionLength
    data.extend_from_slice(&3u16.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&[ON_CURVE; 4]);
    for dx in [100i16, 400, 0, -400] {
        data.extend_from_slice(&dx.to_be_bytes());
    }
    for dy in [0i16, 0, 400, 0] {
        data.extend_from_slice(&dy.to_be_bytes());
    }
    data
}

/// A diamond with one quadratic side, made of short vectors
pub fn curved_glyph() -> Vec<u8> {
    let mut data = Vec::new();
    for v in [1i16, 0, 0, 200, 200] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    data.extend_from_slice(&3u16.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    // (0,100) on, (100,200) off, (200,100) on, (100,0) on
    const X_SHORT: u8 = 0x02;
    const Y_SHORT: u8 = 0x04;
    const X_POS: u8 = 0x10;
    const Y_POS: u8 = 0x20;
    data.extend_from_slice(&[
        ON_CURVE | Y_SHORT | Y_POS | 0x10,
        X_SHORT | X_POS | Y_SHORT | Y_POS,
        ON_CURVE | X_SHORT | X_POS | Y_SHORT,
        ON_CURVE | X_SHORT | Y_SHORT,
    ]);
    // x: 0 (same), +100, +100, -100
    data.extend_from_slice(&[100, 100, 100]);
    // y: +100, +100, -100, -100
    data.extend_from_slice(&[100, 100, 100, 100]);
    data
}

#[derive(Debug, Clone)]
pub struct FontBuilder {
    glyphs: Vec<Vec<u8>>,
    metrics: Vec<(u16, i16)>,
    /// (first codepoint, last codepoint, first glyph)
    mappings: Vec<(u16, u16, u16)>,
    cmap_platform: (u16, u16),
    long_loca: bool,
    skip: Vec<[u8; 4]>,
    extra: Vec<([u8; 4], Vec<u8>)>,
}

impl Default for FontBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBuilder {
    /// Three glyphs: 0 is a blank notdef, 1 ('A') the square from
    /// [`square_glyph`], 2 (' ') a blank space. 1000 units per em,
    /// ascender 800, descender -200.
    pub fn new() -> Self {
        Self {
            glyphs: vec![Vec::new(), square_glyph(), Vec::new()],
            metrics: vec![(500, 0), (600, 100), (250, 0)],
            mappings: vec![(32, 32, 2), (65, 65, 1)],
            cmap_platform: (3, 1),
            long_loca: false,
            skip: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Replaces the description of glyph `index`
    pub fn glyph(mut self, index: usize, data: Vec<u8>) -> Self {
        self.glyphs[index] = data;
        self
    }

    /// Appends a glyph with its advance and maps `codepoint` to it
    pub fn push_glyph(mut self, codepoint: u16, data: Vec<u8>, advance: u16) -> Self {
        let index = self.glyphs.len() as u16;
        self.glyphs.push(data);
        self.metrics.push((advance, 0));
        self.mappings.push((codepoint, codepoint, index));
        self
    }

    pub fn cmap_platform(mut self, platform: u16, encoding: u16) -> Self {
        self.cmap_platform = (platform, encoding);
        self
    }

    pub fn long_loca(mut self) -> Self {
        self.long_loca = true;
        self
    }

    /// Leaves a table out of the font
    pub fn without(mut self, tag: &[u8; 4]) -> Self {
        self.skip.push(*tag);
        self
    }

    pub fn table(mut self, tag: &[u8; 4], data: Vec<u8>) -> Self {
        self.extra.push((*tag, data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_at(0)
    }

    /// Lays the font out as if its offset table started at `base` in a
    /// larger file, table offsets are absolute
    pub fn build_at(&self, base: usize) -> Vec<u8> {
        let mut tables = vec![
            (*b"cmap", self.cmap()),
            (*b"head", self.head()),
            (*b"hhea", self.hhea()),
            (*b"hmtx", self.hmtx()),
            (*b"maxp", self.maxp()),
        ];
        let (loca, glyf) = self.loca_glyf();
        tables.push((*b"glyf", glyf));
        tables.push((*b"loca", loca));
        tables.extend(self.extra.iter().cloned());
        tables.retain(|(tag, _)| !self.skip.contains(tag));
        tables.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = Vec::new();
        out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
        out.extend_from_slice(&[0; 6]);

        let mut offset = base + 12 + tables.len() * 16;
        for (tag, data) in &tables {
            out.extend_from_slice(tag);
            out.extend_from_slice(&0u32.to_be_bytes());
            out.extend_from_slice(&(offset as u32).to_be_bytes());
            out.extend_from_slice(&(data.len() as u32).to_be_bytes());
            offset += data.len().next_multiple_of(4);
        }
        for (_, data) in &tables {
            out.extend_from_slice(data);
            out.resize(out.len().next_multiple_of(4), 0);
        }
        out
    }

    /// Wraps several fonts in a `ttcf` collection
    pub fn collection(fonts: &[FontBuilder]) -> Vec<u8> {
        let header_len = 12 + fonts.len() * 4;
        let mut out = Vec::new();
        out.extend_from_slice(b"ttcf");
        out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        out.extend_from_slice(&(fonts.len() as u32).to_be_bytes());

        let mut bodies = Vec::new();
        let mut offset = header_len;
        for font in fonts {
            out.extend_from_slice(&(offset as u32).to_be_bytes());
            let body = font.build_at(offset);
            offset += body.len();
            bodies.push(body);
        }
        for body in bodies {
            out.extend_from_slice(&body);
        }
        out
    }

    fn head(&self) -> Vec<u8> {
        let mut data = vec![0u8; 54];
        data[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
        data[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
        data[18..20].copy_from_slice(&1000u16.to_be_bytes());
        data[40..42].copy_from_slice(&500i16.to_be_bytes());
        data[42..44].copy_from_slice(&400i16.to_be_bytes());
        data[50..52].copy_from_slice(&i16::from(self.long_loca).to_be_bytes());
        data
    }

    fn hhea(&self) -> Vec<u8> {
        let mut data = vec![0u8; 36];
        data[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
        data[4..6].copy_from_slice(&800i16.to_be_bytes());
        data[6..8].copy_from_slice(&(-200i16).to_be_bytes());
        data[34..36].copy_from_slice(&(self.metrics.len() as u16).to_be_bytes());
        data
    }

    fn maxp(&self) -> Vec<u8> {
        let mut data = 0x0000_5000u32.to_be_bytes().to_vec();
        data.extend_from_slice(&(self.glyphs.len() as u16).to_be_bytes());
        data
    }

    fn hmtx(&self) -> Vec<u8> {
        self.metrics
            .iter()
            .flat_map(|&(advance, lsb)| {
                let mut record = advance.to_be_bytes().to_vec();
                record.extend_from_slice(&lsb.to_be_bytes());
                record
            })
            .collect()
    }

    fn loca_glyf(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut offsets = vec![0usize];
        for glyph in &self.glyphs {
            glyf.extend_from_slice(glyph);
            glyf.resize(glyf.len().next_multiple_of(2), 0);
            offsets.push(glyf.len());
        }

        let loca = offsets
            .iter()
            .flat_map(|&offset| {
                if self.long_loca {
                    (offset as u32).to_be_bytes().to_vec()
                } else {
                    ((offset / 2) as u16).to_be_bytes().to_vec()
                }
            })
            .collect();
        (loca, glyf)
    }

    /// A single format 4 subtable, one segment per mapping
    fn cmap(&self) -> Vec<u8> {
        let mut segments: Vec<(u16, u16, u16)> = self.mappings.clone();
        segments.sort();
        segments.push((0xFFFF, 0xFFFF, 0));

        let be16 = |out: &mut Vec<u8>, v: u16| out.extend_from_slice(&v.to_be_bytes());
        let seg_count = segments.len() as u16;

        let mut sub = Vec::new();
        for v in [4, 0, 0, seg_count * 2, 0, 0, 0] {
            be16(&mut sub, v);
        }
        for &(_, end, _) in &segments {
            be16(&mut sub, end);
        }
        be16(&mut sub, 0);
        for &(start, _, _) in &segments {
            be16(&mut sub, start);
        }
        for &(start, _, glyph) in &segments {
            let delta = if start == 0xFFFF { 1 } else { glyph.wrapping_sub(start) };
            be16(&mut sub, delta);
        }
        for _ in &segments {
            be16(&mut sub, 0);
        }
        let length = sub.len() as u16;
        sub[2..4].copy_from_slice(&length.to_be_bytes());

        let mut data = Vec::new();
        be16(&mut data, 0);
        be16(&mut data, 1);
        be16(&mut data, self.cmap_platform.0);
        be16(&mut data, self.cmap_platform.1);
        data.extend_from_slice(&12u32.to_be_bytes());
        data.extend_from_slice(&sub);
        data
    }
}
