// ─── Error ──────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BymlError {
    #[error("Range {offset}..{offset}+{len} exceeds buffer of {buffer_len} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },
    #[error("Index {index} out of bounds for container of {count} entries")]
    IndexOutOfBounds { index: usize, count: usize },
    #[error("Unexpected end of data reading {len} bytes at {offset}")]
    UnexpectedEof { offset: usize, len: usize },
    #[error("Unknown node type: {0:#04x}")]
    UnknownNodeType(u8),
    #[error("Node type mismatch: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedNodeType { expected: u8, actual: u8 },
    #[error("Container at {offset:#x} nested deeper than {limit} levels")]
    TooDeep { offset: u32, limit: usize },
    #[error("Offset {offset:#x} reached as {first:#04x} and again as {second:#04x}")]
    AliasedOffset { offset: u32, first: u8, second: u8 },
    #[error("Invalid magic: {0:?}")]
    InvalidMagic([u8; 2]),
    #[error("Big endian document needs to be normalized through from_bytes_mut")]
    BigEndianDocument,
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u16),
    #[error("Document has no key table")]
    MissingKeyTable,
    #[error("Document has no string table")]
    MissingStringTable,
    #[error("String {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },
    #[error("Emit error: {0}")]
    Emit(#[from] std::fmt::Error),
}
