use thiserror::Error;

macro_rules! impl_read {
    ($fn_name:ident, $at_name:ident, $typ:ty) => {
        /// Reads a big-endian value at the cursor and advances past it
        pub fn $fn_name(&mut self) -> Result<$typ, VeroBufReaderError> {
            let value = self.$at_name(self.pos)?;
            self.pos += size_of::<$typ>();

            Ok(value)
        }

        /// Reads a big-endian value at an absolute offset, the cursor is left untouched
        pub fn $at_name(&self, offset: usize) -> Result<$typ, VeroBufReaderError> {
            let bytes = self.slice(offset, size_of::<$typ>())?;
            let mut raw = [0u8; size_of::<$typ>()];
            raw.copy_from_slice(bytes);

            Ok(<$typ>::from_be_bytes(raw))
        }
    };
}

/// Represents the possible errors that can occur when using `VeroBufReader`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VeroBufReaderError {
    /// A read of `size` bytes at `offset` would go past the end of the buffer.
    #[error("Read of {size} bytes at offset {offset} is out of bounds (buffer is {len} bytes)")]
    OutOfBounds {
        offset: usize,
        size: usize,
        len: usize,
    },

    /// A seek landed outside of the buffer.
    #[error("Failed to seek to {0}, buffer is {1} bytes")]
    FailedToSeek(usize, usize),
}

/// A bounds-checked big-endian cursor over a borrowed byte buffer.
///
/// Every read is validated against the buffer length, a read that would
/// run past the end returns `VeroBufReaderError::OutOfBounds` instead of
/// touching memory it doesn't own.
#[derive(Debug, Clone, Copy)]
pub struct VeroBufReader<'a> {
    inner: &'a [u8],
    pos: usize,
}

impl<'a> VeroBufReader<'a> {
    /// Returns a new reader positioned at the start of `buffer`
    pub fn from_buffer(buffer: &'a [u8]) -> Self {
        Self {
            inner: buffer,
            pos: 0,
        }
    }

    /// Seeks to a specifc place in the buffer
    /// from the start of the buffer
    ///
    /// # Examples
    ///
    /// ```
    /// use vero_type::buffer::VeroBufReader;
    ///
    /// let data = [0, 0, 0, 10, 0, 0, 0, 20];
    /// let mut reader = VeroBufReader::from_buffer(&data);
    ///
    /// reader.seek_to(4).unwrap();
    /// assert_eq!(reader.read_u32().unwrap(), 20);
    /// ```
    pub fn seek_to(&mut self, pos: usize) -> Result<(), VeroBufReaderError> {
        if pos > self.inner.len() {
            return Err(VeroBufReaderError::FailedToSeek(pos, self.inner.len()));
        }
        self.pos = pos;

        Ok(())
    }

    /// Skips n bytes from the CURRENT cursor positon
    ///
    /// # Examples
    ///
    /// ```
    /// use vero_type::buffer::VeroBufReader;
    ///
    /// let data = [0, 0, 0, 10, 0, 0, 0, 20];
    /// let mut reader = VeroBufReader::from_buffer(&data);
    ///
    /// assert_eq!(reader.read_u32().unwrap(), 10);
    /// reader.skip(4).unwrap();
    ///
    /// // Nothing left to read
    /// assert!(reader.read_u32().is_err());
    /// ```
    pub fn skip(&mut self, n: usize) -> Result<(), VeroBufReaderError> {
        let target = self
            .pos
            .checked_add(n)
            .ok_or(VeroBufReaderError::FailedToSeek(usize::MAX, self.inner.len()))?;
        self.seek_to(target)
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Length of the underlying buffer
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Borrows `len` bytes starting at `offset`
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], VeroBufReaderError> {
        offset
            .checked_add(len)
            .and_then(|end| self.inner.get(offset..end))
            .ok_or(VeroBufReaderError::OutOfBounds {
                offset,
                size: len,
                len: self.inner.len(),
            })
    }

    /// Reads a 4 byte tag at an absolute offset
    pub fn tag_at(&self, offset: usize) -> Result<[u8; 4], VeroBufReaderError> {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(self.slice(offset, 4)?);

        Ok(tag)
    }

    impl_read!(read_i32, i32_at, i32);
    impl_read!(read_u32, u32_at, u32);
    impl_read!(read_i16, i16_at, i16);
    impl_read!(read_u16, u16_at, u16);
    impl_read!(read_i8, i8_at, i8);
    impl_read!(read_u8, u8_at, u8);
}
