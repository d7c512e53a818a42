use crate::containers::{ArrayView, MapView};
use crate::deserialization::{FromByml, decode_node};
use crate::error::BymlError;
use crate::reverse::reverse_document;
use crate::string_table::StringTable;
use crate::types::*;
use crate::yaml::{EmitterConfig, YamlEmitter};
use tracing::debug;

// ─── BymlDocument (zero-copy) ───────────────────────────────────────────────

/// Read-only root of a little-endian document.
///
/// Holds the parsed header and the two string tables. Nothing below the root
/// is decoded until asked for.
#[derive(Debug, Clone, Copy)]
pub struct BymlDocument<'a> {
    data: &'a [u8],
    version: u16,
    key_table: Option<StringTable<'a>>,
    string_table: Option<StringTable<'a>>,
    root: Option<Node>,
}

impl<'a> BymlDocument<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, BymlError> {
        let header = slice_at(data, 0, DOCUMENT_HEADER_SIZE)?;
        let magic = [header[0], header[1]];
        match magic {
            MAGIC_LE => {}
            MAGIC_BE => return Err(BymlError::BigEndianDocument),
            other => return Err(BymlError::InvalidMagic(other)),
        }
        let version = u16::from_le_bytes([header[2], header[3]]);
        if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
            return Err(BymlError::UnsupportedVersion(version));
        }

        let key_table = match read_u32_le(header, 4)? {
            0 => None,
            offset => Some(StringTable::new(data, offset as usize)?),
        };
        let string_table = match read_u32_le(header, 8)? {
            0 => None,
            offset => Some(StringTable::new(data, offset as usize)?),
        };
        let root = match read_u32_le(header, 12)? {
            0 => None,
            offset => {
                let tag = slice_at(data, offset as usize, 1)?[0];
                Some(Node::new(tag, offset))
            }
        };

        Ok(Self {
            data,
            version,
            key_table,
            string_table,
            root,
        })
    }

    /// Open a document of either byte order. Big-endian input is flipped to
    /// little-endian in place first.
    pub fn from_bytes_mut(data: &'a mut [u8]) -> Result<Self, BymlError> {
        let header = slice_at(data, 0, DOCUMENT_HEADER_SIZE)?;
        if header[0..2] == MAGIC_BE {
            debug!(len = data.len(), "normalizing big endian document");
            reverse_document(data, Endian::Big)?;
        }
        Self::new(data)
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn version(&self) -> u16 {
        self.version
    }

    #[inline]
    pub fn root(&self) -> Option<Node> {
        self.root
    }

    pub fn key_table(&self) -> Result<StringTable<'a>, BymlError> {
        self.key_table.ok_or(BymlError::MissingKeyTable)
    }

    pub fn string_table(&self) -> Result<StringTable<'a>, BymlError> {
        self.string_table.ok_or(BymlError::MissingStringTable)
    }

    /// Key string for a map entry's `key_index`.
    #[inline]
    pub fn key(&self, index: u32) -> Result<&'a str, BymlError> {
        self.key_table()?.get_str(index as usize)
    }

    /// Value string for a `String` node.
    #[inline]
    pub fn string(&self, index: u32) -> Result<&'a str, BymlError> {
        self.string_table()?.get_str(index as usize)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Node access
    // ════════════════════════════════════════════════════════════════════════

    fn expect_container(&self, node: Node, expected: u8) -> Result<usize, BymlError> {
        if node.node_type != expected {
            return Err(BymlError::UnexpectedNodeType {
                expected,
                actual: node.node_type,
            });
        }
        let (tag, count) = read_container_header(self.data, node.offset())?;
        if tag != expected {
            return Err(BymlError::UnexpectedNodeType {
                expected,
                actual: tag,
            });
        }
        Ok(count)
    }

    pub fn map_view(&self, node: Node) -> Result<MapView<'a>, BymlError> {
        let count = self.expect_container(node, TAG_MAP)?;
        MapView::new(self.data, node.offset(), count)
    }

    pub fn array_view(&self, node: Node) -> Result<ArrayView<'a>, BymlError> {
        let count = self.expect_container(node, TAG_ARRAY)?;
        ArrayView::new(self.data, node.offset(), count)
    }

    /// The 8-byte payload of an `Int64`, `UInt64` or `Double` node.
    #[inline]
    pub fn read_u64(&self, node: Node) -> Result<u64, BymlError> {
        read_u64_le(self.data, node.offset())
    }

    /// Payload of a `Binary` node.
    pub fn binary(&self, node: Node) -> Result<&'a [u8], BymlError> {
        let len = read_u32_le(self.data, node.offset())? as usize;
        slice_at(self.data, node.offset() + 4, len)
    }

    /// Payload and alignment of a `File` node.
    pub fn file(&self, node: Node) -> Result<(&'a [u8], u32), BymlError> {
        let len = read_u32_le(self.data, node.offset())? as usize;
        let alignment = read_u32_le(self.data, node.offset() + 4)?;
        Ok((slice_at(self.data, node.offset() + 8, len)?, alignment))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Whole-document conversions
    // ════════════════════════════════════════════════════════════════════════

    /// Decode the whole document. An empty document decodes to null.
    pub fn to_value<V: FromByml>(&self) -> Result<V, BymlError> {
        match self.root {
            Some(root) => decode_node(root, self),
            None => Ok(V::from_null()),
        }
    }

    pub fn emit_yaml(&self, emitter: &mut YamlEmitter) -> Result<(), BymlError> {
        match self.root {
            Some(root) => emitter.emit_node(root, self),
            None => {
                emitter.write("null");
                Ok(())
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String, BymlError> {
        self.to_yaml_with(EmitterConfig::default())
    }

    pub fn to_yaml_with(&self, config: EmitterConfig) -> Result<String, BymlError> {
        let mut emitter = YamlEmitter::with_config(config);
        self.emit_yaml(&mut emitter)?;
        Ok(emitter.into_string())
    }
}
