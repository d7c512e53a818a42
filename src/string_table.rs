use crate::error::BymlError;
use crate::types::*;

// ─── StringTable (zero-copy) ────────────────────────────────────────────────
//
//  header:  0xC2 | count: u24
//  offsets: u32 × (count + 1), relative to the table start
//  data:    NUL-terminated strings
//
/// Zero-copy view over a key table or value string table.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    data: &'a [u8],
    offset: usize,
    count: usize,
    offsets: &'a [u8],
}

impl<'a> StringTable<'a> {
    pub fn new(data: &'a [u8], offset: usize) -> Result<Self, BymlError> {
        let (tag, count) = read_container_header(data, offset)?;
        if tag != TAG_STRING_TABLE {
            return Err(BymlError::UnexpectedNodeType {
                expected: TAG_STRING_TABLE,
                actual: tag,
            });
        }
        let offsets = slice_at(data, offset + CONTAINER_HEADER_SIZE, (count + 1) * 4)?;
        Ok(Self {
            data,
            offset,
            count,
            offsets,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Raw bytes of string `index`, without the NUL terminator.
    pub fn get(&self, index: usize) -> Result<&'a [u8], BymlError> {
        if index >= self.count {
            return Err(BymlError::IndexOutOfBounds {
                index,
                count: self.count,
            });
        }
        let start = self.offset + read_u32_le(self.offsets, index * 4)? as usize;
        let end = self.offset + read_u32_le(self.offsets, (index + 1) * 4)? as usize;
        let raw = slice_at(self.data, start, end.saturating_sub(start))?;
        let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(&raw[..len])
    }

    pub fn get_str(&self, index: usize) -> Result<&'a str, BymlError> {
        std::str::from_utf8(self.get(index)?).map_err(|_| BymlError::InvalidUtf8 { index })
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Result<&'a str, BymlError>> + '_ {
        (0..self.count).map(move |i| self.get_str(i))
    }
}
