use crate::error::BymlError;

// ─── Node Type Tags ─────────────────────────────────────────────────────────
pub const TAG_STRING: u8 = 0xA0;
pub const TAG_BINARY: u8 = 0xA1;
pub const TAG_FILE: u8 = 0xA2; // Binary with alignment
pub const TAG_ARRAY: u8 = 0xC0;
pub const TAG_MAP: u8 = 0xC1;
pub const TAG_STRING_TABLE: u8 = 0xC2;
pub const TAG_BOOL: u8 = 0xD0;
pub const TAG_INT: u8 = 0xD1;
pub const TAG_FLOAT: u8 = 0xD2;
pub const TAG_UINT: u8 = 0xD3;
pub const TAG_INT64: u8 = 0xD4;
pub const TAG_UINT64: u8 = 0xD5;
pub const TAG_DOUBLE: u8 = 0xD6;
pub const TAG_NULL: u8 = 0xFF;

/// True for nodes whose value is an offset to another container.
#[inline]
pub fn is_container_type(tag: u8) -> bool {
    matches!(tag, TAG_ARRAY | TAG_MAP)
}

pub fn tag_name(tag: u8) -> &'static str {
    match tag {
        TAG_STRING => "String",
        TAG_BINARY => "Binary",
        TAG_FILE => "File",
        TAG_ARRAY => "Array",
        TAG_MAP => "Map",
        TAG_STRING_TABLE => "StringTable",
        TAG_BOOL => "Bool",
        TAG_INT => "Int",
        TAG_FLOAT => "Float",
        TAG_UINT => "UInt",
        TAG_INT64 => "Int64",
        TAG_UINT64 => "UInt64",
        TAG_DOUBLE => "Double",
        TAG_NULL => "Null",
        _ => "Unknown",
    }
}

// ─── Binary Layout ──────────────────────────────────────────────────────────
//
//  ┌──────────────────────────────────────────────┐
//  │ Document header (16 bytes)                   │
//  │   magic:        [u8; 2]  "YB" / "BY"         │
//  │   version:      u16                          │
//  │   key_table:    u32      offset, 0 = none    │
//  │   string_table: u32      offset, 0 = none    │
//  │   root:         u32      offset, 0 = empty   │
//  ├──────────────────────────────────────────────┤
//  │ Container header (4 bytes)                   │
//  │   type_tag:     u8                           │
//  │   count:        u24                          │
//  ├──────────────────────────────────────────────┤
//  │ Map entry (8 bytes × count)                  │
//  │   key_index:    u24                          │
//  │   type_tag:     u8                           │
//  │   value:        u32   inline or offset       │
//  └──────────────────────────────────────────────┘

pub const DOCUMENT_HEADER_SIZE: usize = 16;
pub const CONTAINER_HEADER_SIZE: usize = 4;
pub const MAP_ENTRY_SIZE: usize = 8;

pub const MAGIC_LE: [u8; 2] = *b"YB";
pub const MAGIC_BE: [u8; 2] = *b"BY";
pub const MIN_VERSION: u16 = 2;
pub const MAX_VERSION: u16 = 7;

/// Deepest container nesting decoded or emitted. Also stops a container
/// whose entries point back at itself.
pub const MAX_DEPTH: usize = 128;

const KEY_INDEX_MASK: u32 = 0x00FF_FFFF;

/// Byte order of a document (or of the bytes a cursor is about to flip).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    #[inline]
    pub fn u16_from(self, bytes: [u8; 2]) -> u16 {
        match self {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        }
    }

    #[inline]
    pub fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        }
    }

    /// Decode a 24-bit unsigned integer.
    #[inline]
    pub fn u24_from(self, bytes: [u8; 3]) -> u32 {
        match self {
            Endian::Little => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]),
            Endian::Big => u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]),
        }
    }
}

// ─── Raw reads ──────────────────────────────────────────────────────────────

/// Bounds-checked sub-slice of `buf`.
#[inline]
pub fn slice_at(buf: &[u8], offset: usize, len: usize) -> Result<&[u8], BymlError> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(BymlError::OutOfBounds {
            offset,
            len,
            buffer_len: buf.len(),
        })
}

#[inline]
pub fn read_u32_le(buf: &[u8], offset: usize) -> Result<u32, BymlError> {
    let bytes: [u8; 4] = slice_at(buf, offset, 4)?
        .try_into()
        .map_err(|_| BymlError::UnexpectedEof { offset, len: 4 })?;
    Ok(u32::from_le_bytes(bytes))
}

#[inline]
pub fn read_u64_le(buf: &[u8], offset: usize) -> Result<u64, BymlError> {
    let bytes: [u8; 8] = slice_at(buf, offset, 8)?
        .try_into()
        .map_err(|_| BymlError::UnexpectedEof { offset, len: 8 })?;
    Ok(u64::from_le_bytes(bytes))
}

/// Read a container header, returning `(type_tag, count)`.
#[inline]
pub fn read_container_header(buf: &[u8], offset: usize) -> Result<(u8, usize), BymlError> {
    let word = read_u32_le(buf, offset)?;
    Ok(((word & 0xFF) as u8, (word >> 8) as usize))
}

// ─── Node ───────────────────────────────────────────────────────────────────

/// A tagged value slot: inline payload or absolute offset, per `node_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub node_type: u8,
    pub value: u32,
}

impl Node {
    #[inline]
    pub fn new(node_type: u8, value: u32) -> Self {
        Self { node_type, value }
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        is_container_type(self.node_type)
    }

    #[inline]
    pub fn as_i32(&self) -> i32 {
        self.value as i32
    }

    #[inline]
    pub fn as_f32(&self) -> f32 {
        f32::from_bits(self.value)
    }

    #[inline]
    pub fn as_bool(&self) -> bool {
        self.value != 0
    }

    /// The value field as an absolute document offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.value as usize
    }
}

// ─── MapEntry ───────────────────────────────────────────────────────────────

/// One decoded 8-byte map entry. Copy-only, no references into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    pub key_index: u32,
    pub node_type: u8,
    pub value: u32,
}

impl MapEntry {
    /// Unpack an entry from its two little-endian words.
    #[inline]
    pub fn from_words(w0: u32, w1: u32) -> Self {
        Self {
            key_index: w0 & KEY_INDEX_MASK,
            node_type: (w0 >> 24) as u8,
            value: w1,
        }
    }

    #[inline]
    pub fn node(&self) -> Node {
        Node::new(self.node_type, self.value)
    }
}
