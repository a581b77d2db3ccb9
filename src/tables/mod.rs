use std::fmt;

use thiserror::Error;

use crate::buffer::{VeroBufReader, VeroBufReaderError};

pub mod cmap;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod loca;
pub mod maxp;

/// A 4 byte SFNT table tag such as `cmap` or `glyf`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const CMAP: Tag = Tag(*b"cmap");
    pub const GLYF: Tag = Tag(*b"glyf");
    pub const HEAD: Tag = Tag(*b"head");
    pub const HHEA: Tag = Tag(*b"hhea");
    pub const HMTX: Tag = Tag(*b"hmtx");
    pub const LOCA: Tag = Tag(*b"loca");
    pub const MAXP: Tag = Tag(*b"maxp");
    pub const KERN: Tag = Tag(*b"kern");
    pub const GPOS: Tag = Tag(*b"GPOS");
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}

/// The tables every font must carry for us to map and measure glyphs.
/// `glyf`/`loca` are optional as a pair, CFF flavoured fonts have neither.
pub const REQUIRED_TABLES: [Tag; 4] = [Tag::CMAP, Tag::HEAD, Tag::HHEA, Tag::HMTX];

/// Represents the error messages which may occur when trying
/// to parse tables from raw binary buffers
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TableEncodingError {
    #[error("The required buffer length for this table is {0} bytes, got {1} bytes")]
    InvalidBufferLength(usize, usize),

    #[error("Unrecognised font signature 0x{0:08x}")]
    InvalidSignature(u32),

    #[error("Required table '{0}' is missing")]
    MissingTable(Tag),

    #[error("Table '{tag}' at offset {offset} with length {length} runs past the end of the font ({font_len} bytes)")]
    TableOutOfBounds {
        tag: Tag,
        offset: u32,
        length: u32,
        font_len: usize,
    },

    #[error("The cmap table has no Unicode encoding subtable")]
    NoUnicodeCmap,

    #[error("Face {index} requested but the font holds {faces}")]
    FaceIndexOutOfRange { index: u32, faces: u32 },

    #[error(transparent)]
    Buffer(#[from] VeroBufReaderError),
}

/// The scaler type found in the first four bytes of a font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// `0x00010000`
    TrueType,
    /// `OTTO`, CFF outlines
    OpenType,
    /// `ttcf`
    Collection,
    /// `true`, legacy Apple TrueType
    AppleTrueType,
}

impl TryFrom<u32> for Signature {
    type Error = TableEncodingError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match &value.to_be_bytes() {
            [0x00, 0x01, 0x00, 0x00] => Self::TrueType,
            b"OTTO" => Self::OpenType,
            b"ttcf" => Self::Collection,
            b"true" => Self::AppleTrueType,
            _ => Err(TableEncodingError::InvalidSignature(value))?,
        })
    }
}

/// Represents the offset subtable directory and it's metadata
/// providing us with a important info such as the number of tables
#[derive(Debug, Clone, Copy)]
pub struct OffsetTable {
    signature: Signature,
    num_tables: u16,
}

impl OffsetTable {
    /// Constructs the offset sub table from a raw buffer
    /// the offset sub table buffer size must be 12 per the reference manual.
    pub fn from_buffer(buf: &[u8]) -> Result<Self, TableEncodingError> {
        if buf.len() != 12 {
            return Err(TableEncodingError::InvalidBufferLength(12, buf.len()));
        }
        let reader = VeroBufReader::from_buffer(buf);

        Ok(Self {
            signature: Signature::try_from(reader.u32_at(0)?)?,
            num_tables: reader.u16_at(4)?,
        })
    }

    /// Reads the offset table of the font starting at `font_offset`
    pub(crate) fn from_reader(
        reader: &VeroBufReader<'_>,
        font_offset: usize,
    ) -> Result<Self, TableEncodingError> {
        // Validate the signature before anything else so a short garbage
        // buffer reports the signature rather than a length problem
        Signature::try_from(reader.u32_at(font_offset)?)?;
        Self::from_buffer(reader.slice(font_offset, 12)?)
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Returns the number of tables exists in the font file
    pub fn num_tables(&self) -> u16 {
        self.num_tables
    }
}

/// Represents the table directory, every record in declared order.
#[derive(Debug, Clone)]
pub struct TablesHeaders {
    inner: Vec<(Tag, TableMetadata)>,
}

impl TablesHeaders {
    /// Reads `num_tables` 16 byte records starting 12 bytes past `font_offset`
    pub fn from_reader(
        reader: &VeroBufReader<'_>,
        font_offset: usize,
        num_tables: u16,
    ) -> Result<Self, TableEncodingError> {
        let start = font_offset + 12;
        let buffer = reader.slice(start, usize::from(num_tables) * 16)?;

        let headers = buffer
            .chunks(16)
            .map(|raw_table| {
                let tag = Tag([raw_table[0], raw_table[1], raw_table[2], raw_table[3]]);
                TableMetadata::from_buffer(raw_table).map(|metadata| (tag, metadata))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { inner: headers })
    }

    /// Looks a table up by tag, the first matching record wins
    pub fn find(&self, tag: Tag) -> Option<&TableMetadata> {
        self.inner
            .iter()
            .find(|(candidate, _)| *candidate == tag)
            .map(|(_, metadata)| metadata)
    }

    /// Like `find`, but checks the table fits in a font of `font_len` bytes
    pub fn locate(&self, tag: Tag, font_len: usize) -> Result<Option<TableMetadata>, TableEncodingError> {
        let Some(metadata) = self.find(tag) else {
            return Ok(None);
        };

        let end = u64::from(metadata.offset) + u64::from(metadata.length);
        if end > font_len as u64 {
            return Err(TableEncodingError::TableOutOfBounds {
                tag,
                offset: metadata.offset,
                length: metadata.length,
                font_len,
            });
        }

        Ok(Some(*metadata))
    }

    /// Same as `locate` but a missing table is an error
    pub fn require(&self, tag: Tag, font_len: usize) -> Result<TableMetadata, TableEncodingError> {
        self.locate(tag, font_len)?
            .ok_or(TableEncodingError::MissingTable(tag))
    }

    /// Tags in declared order
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.inner.iter().map(|(tag, _)| *tag)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Represents metadata for a table within a larger data structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableMetadata {
    /// The checksum of the table. This value can be used to verify the
    /// integrity of the table data.
    pub checksum: u32,
    /// The offset of the table, in bytes, from the beginning of the file.
    pub offset: u32,
    /// The length of this table in bytes, without padding.
    pub length: u32,
}

impl TableMetadata {
    /// Constructs a `TableMetadata` instance from a raw 16 byte record.
    ///
    /// * Bytes 0-3: Tag (read by the caller)
    /// * Bytes 4-7: Checksum of the table
    /// * Bytes 8-11: Offset of the table from the beginning of the file
    /// * Bytes 12-15: Length of the table in bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use vero_type::tables::TableMetadata;
    ///
    /// let buffer: [u8; 16] = [
    ///     b'h', b'e', b'a', b'd',
    ///     0x12, 0x34, 0x56, 0x78,
    ///     0x00, 0x01, 0x00, 0x00,
    ///     0x00, 0x00, 0x0A, 0x00,
    /// ];
    ///
    /// let metadata = TableMetadata::from_buffer(&buffer).unwrap();
    /// assert_eq!(metadata.checksum, 0x12345678);
    /// assert_eq!(metadata.offset, 0x00010000);
    /// assert_eq!(metadata.length, 0x00000A00);
    ///
    /// assert!(TableMetadata::from_buffer(&[0; 10]).is_err());
    /// ```
    pub fn from_buffer(buf: &[u8]) -> Result<Self, TableEncodingError> {
        // Each table metadata should be EXACTLY 16 bytes
        if buf.len() != 16 {
            return Err(TableEncodingError::InvalidBufferLength(16, buf.len()));
        }
        let reader = VeroBufReader::from_buffer(buf);

        Ok(Self {
            checksum: reader.u32_at(4)?,
            offset: reader.u32_at(8)?,
            length: reader.u32_at(12)?,
        })
    }

    pub fn offset(&self) -> usize {
        self.offset as usize
    }

    pub fn length(&self) -> usize {
        self.length as usize
    }
}

/// Offset of face `index` inside a `ttcf` collection.
/// A plain (non collection) font only has face 0, found at offset 0.
pub fn collection_font_offset(data: &[u8], index: u32) -> Result<usize, TableEncodingError> {
    let reader = VeroBufReader::from_buffer(data);
    let signature = Signature::try_from(reader.u32_at(0)?)?;

    if signature != Signature::Collection {
        return match index {
            0 => Ok(0),
            _ => Err(TableEncodingError::FaceIndexOutOfRange { index, faces: 1 }),
        };
    }

    let faces = reader.u32_at(8)?;
    if index >= faces {
        return Err(TableEncodingError::FaceIndexOutOfRange { index, faces });
    }

    Ok(reader.u32_at(12 + index as usize * 4)? as usize)
}
