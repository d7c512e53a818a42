use crate::containers::{ArrayView, MapView};
use crate::error::BymlError;
use crate::types::*;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

// ─── ByteCursor ─────────────────────────────────────────────────────────────

/// Seekable cursor that flips the byte order of whatever it reads.
///
/// Every `flip_*` call decodes the value in the `source` order, reverses the
/// bytes in place and advances.
pub struct ByteCursor<'a> {
    data: &'a mut [u8],
    position: usize,
    source: Endian,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a mut [u8], source: Endian) -> Self {
        Self {
            data,
            position: 0,
            source,
        }
    }

    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn source(&self) -> Endian {
        self.source
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn take(&mut self, len: usize) -> Result<&mut [u8], BymlError> {
        let offset = self.position;
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(BymlError::UnexpectedEof { offset, len })?;
        self.position = end;
        Ok(&mut self.data[offset..end])
    }

    pub fn read_u8(&mut self) -> Result<u8, BymlError> {
        Ok(self.take(1)?[0])
    }

    /// Reverse `len` bytes in place without interpreting them.
    pub fn reverse(&mut self, len: usize) -> Result<(), BymlError> {
        self.take(len)?.reverse();
        Ok(())
    }

    pub fn flip_u16(&mut self) -> Result<u16, BymlError> {
        let source = self.source;
        let bytes = self.take(2)?;
        let value = source.u16_from([bytes[0], bytes[1]]);
        bytes.reverse();
        Ok(value)
    }

    pub fn flip_u24(&mut self) -> Result<u32, BymlError> {
        let source = self.source;
        let bytes = self.take(3)?;
        let value = source.u24_from([bytes[0], bytes[1], bytes[2]]);
        bytes.reverse();
        Ok(value)
    }

    pub fn flip_u32(&mut self) -> Result<u32, BymlError> {
        let source = self.source;
        let bytes = self.take(4)?;
        let value = source.u32_from([bytes[0], bytes[1], bytes[2], bytes[3]]);
        bytes.reverse();
        Ok(value)
    }
}

// ─── ReversedOffsets ────────────────────────────────────────────────────────

/// Out-of-line offsets already flipped, with the node type they were reached as.
#[derive(Debug, Default)]
pub struct ReversedOffsets {
    seen: FxHashMap<u32, u8>,
}

impl ReversedOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `offset` is visited. A second visit with
    /// another node type is an error.
    pub fn visit(&mut self, offset: u32, node_type: u8) -> Result<bool, BymlError> {
        match self.seen.get(&offset) {
            None => {
                self.seen.insert(offset, node_type);
                Ok(true)
            }
            Some(&first) if first == node_type => Ok(false),
            Some(&first) => Err(BymlError::AliasedOffset {
                offset,
                first,
                second: node_type,
            }),
        }
    }

    pub fn contains(&self, offset: u32) -> bool {
        self.seen.contains_key(&offset)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

// ─── Node reversal ──────────────────────────────────────────────────────────

/// Flip whatever `node` points at. Inline values were already flipped when
/// their slot was read.
pub fn reverse_node(
    cursor: &mut ByteCursor<'_>,
    node: Node,
    visited: &mut ReversedOffsets,
) -> Result<(), BymlError> {
    match node.node_type {
        TAG_STRING | TAG_BOOL | TAG_INT | TAG_FLOAT | TAG_UINT | TAG_NULL => Ok(()),
        TAG_INT64 | TAG_UINT64 | TAG_DOUBLE => {
            if visited.visit(node.value, node.node_type)? {
                cursor.seek(node.offset());
                cursor.reverse(8)?;
            }
            Ok(())
        }
        TAG_BINARY => {
            if visited.visit(node.value, node.node_type)? {
                cursor.seek(node.offset());
                cursor.flip_u32()?;
            }
            Ok(())
        }
        TAG_FILE => {
            if visited.visit(node.value, node.node_type)? {
                cursor.seek(node.offset());
                cursor.flip_u32()?;
                cursor.flip_u32()?;
            }
            Ok(())
        }
        TAG_ARRAY | TAG_MAP | TAG_STRING_TABLE => {
            if visited.visit(node.value, node.node_type)? {
                reverse_container(cursor, node, visited)?;
            }
            Ok(())
        }
        other => Err(BymlError::UnknownNodeType(other)),
    }
}

fn reverse_container(
    cursor: &mut ByteCursor<'_>,
    node: Node,
    visited: &mut ReversedOffsets,
) -> Result<(), BymlError> {
    let offset = node.offset();
    cursor.seek(offset);
    let tag = cursor.read_u8()?;
    if tag != node.node_type {
        return Err(BymlError::UnexpectedNodeType {
            expected: node.node_type,
            actual: tag,
        });
    }
    let count = cursor.flip_u24()? as usize;
    trace!(offset, count, kind = tag_name(tag), "reversing container");

    match tag {
        TAG_MAP => MapView::reverse(cursor, offset, count, visited),
        TAG_ARRAY => ArrayView::reverse(cursor, offset, count, visited),
        _ => reverse_string_table(cursor, offset, count),
    }
}

fn reverse_string_table(
    cursor: &mut ByteCursor<'_>,
    offset: usize,
    count: usize,
) -> Result<(), BymlError> {
    cursor.seek(offset + CONTAINER_HEADER_SIZE);
    for _ in 0..=count {
        cursor.flip_u32()?;
    }
    Ok(())
}

// ─── Document reversal ──────────────────────────────────────────────────────

/// Flip a whole document from `source` order to the other one, in place.
///
/// A fault leaves the buffer partially flipped; callers discard it.
pub fn reverse_document(data: &mut [u8], source: Endian) -> Result<(), BymlError> {
    let magic: [u8; 2] = slice_at(data, 0, DOCUMENT_HEADER_SIZE)?[0..2]
        .try_into()
        .map_err(|_| BymlError::UnexpectedEof { offset: 0, len: 2 })?;
    let (expected, target) = match source {
        Endian::Little => (MAGIC_LE, MAGIC_BE),
        Endian::Big => (MAGIC_BE, MAGIC_LE),
    };
    if magic != expected {
        return Err(BymlError::InvalidMagic(magic));
    }

    let mut cursor = ByteCursor::new(data, source);
    cursor.seek(2);
    let version = cursor.flip_u16()?;
    if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
        return Err(BymlError::UnsupportedVersion(version));
    }
    let key_table = cursor.flip_u32()?;
    let string_table = cursor.flip_u32()?;
    let root = cursor.flip_u32()?;
    debug!(
        ?source,
        version, key_table, string_table, root, "reversing document"
    );

    let mut visited = ReversedOffsets::new();
    if key_table != 0 {
        reverse_node(&mut cursor, Node::new(TAG_STRING_TABLE, key_table), &mut visited)?;
    }
    if string_table != 0 {
        reverse_node(&mut cursor, Node::new(TAG_STRING_TABLE, string_table), &mut visited)?;
    }
    if root != 0 {
        cursor.seek(root as usize);
        let tag = cursor.read_u8()?;
        reverse_node(&mut cursor, Node::new(tag, root), &mut visited)?;
    }

    data[0..2].copy_from_slice(&target);
    debug!(nodes = visited.len(), "document reversed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BymlDocument;
    use crate::test_utils::{DocBuilder, TestNode};

    fn sample() -> TestNode {
        TestNode::Map(vec![
            ("name", TestNode::Str("sheik")),
            ("hp", TestNode::Int(-12)),
            ("big", TestNode::Int64(-1 << 40)),
            ("ratio", TestNode::Double(0.25)),
            (
                "items",
                TestNode::Array(vec![
                    TestNode::UInt(7),
                    TestNode::Binary(vec![1, 2, 3]),
                    TestNode::Map(vec![("deep", TestNode::Float(1.5))]),
                ]),
            ),
            ("file", TestNode::File(vec![9, 9], 0x80)),
        ])
    }

    #[test]
    fn test_cursor_flip_reads_source_order() {
        let mut buf = [0x12u8, 0x34, 0x56, 0x78];
        let mut cursor = ByteCursor::new(&mut buf, Endian::Big);
        assert_eq!(cursor.flip_u32().unwrap(), 0x1234_5678);
        assert_eq!(cursor.position(), 4);
        assert_eq!(buf, [0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn test_cursor_eof() {
        let mut buf = [0u8; 3];
        let mut cursor = ByteCursor::new(&mut buf, Endian::Little);
        cursor.seek(1);
        assert_eq!(
            cursor.flip_u32(),
            Err(BymlError::UnexpectedEof { offset: 1, len: 4 })
        );
    }

    #[test]
    fn test_visit_same_type_once() {
        let mut visited = ReversedOffsets::new();
        assert_eq!(visited.visit(0x40, TAG_MAP), Ok(true));
        assert_eq!(visited.visit(0x40, TAG_MAP), Ok(false));
        assert!(visited.contains(0x40));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_visit_aliased_type_faults() {
        let mut visited = ReversedOffsets::new();
        visited.visit(0x40, TAG_INT64).unwrap();
        assert_eq!(
            visited.visit(0x40, TAG_DOUBLE),
            Err(BymlError::AliasedOffset {
                offset: 0x40,
                first: TAG_INT64,
                second: TAG_DOUBLE,
            })
        );
    }

    #[test]
    fn test_big_endian_matches_little_endian() {
        let le = DocBuilder::new(Endian::Little).finish(&sample());
        let mut be = DocBuilder::new(Endian::Big).finish(&sample());
        assert_ne!(le, be);

        reverse_document(&mut be, Endian::Big).unwrap();
        assert_eq!(le, be);
    }

    #[test]
    fn test_document_reverse_is_involution() {
        let original = DocBuilder::new(Endian::Little).finish(&sample());
        let mut buf = original.clone();

        reverse_document(&mut buf, Endian::Little).unwrap();
        assert_eq!(&buf[0..2], b"BY");
        reverse_document(&mut buf, Endian::Big).unwrap();
        assert_eq!(buf, original);
    }

    #[test]
    fn test_shared_offset_reversed_once() {
        let mut builder = DocBuilder::new(Endian::Big);
        let shared = builder.write(&TestNode::UInt64(0x0102_0304_0506_0708));
        let root = TestNode::Map(vec![
            ("a", TestNode::Raw(shared)),
            ("b", TestNode::Raw(shared)),
        ]);
        let mut buf = builder.finish(&root);

        reverse_document(&mut buf, Endian::Big).unwrap();
        let doc = BymlDocument::new(&buf).unwrap();
        let map = doc.to_value::<crate::Byml>().unwrap();
        let values: Vec<_> = map
            .as_map()
            .unwrap()
            .values()
            .map(|v| v.as_u64())
            .collect();
        assert_eq!(
            values,
            vec![Some(0x0102_0304_0506_0708), Some(0x0102_0304_0506_0708)]
        );
    }

    #[test]
    fn test_aliased_offset_with_type_mismatch_faults() {
        let mut builder = DocBuilder::new(Endian::Big);
        let shared = builder.write(&TestNode::Int64(5));
        let root = TestNode::Map(vec![
            ("a", TestNode::Raw(shared)),
            ("b", TestNode::Raw(Node::new(TAG_DOUBLE, shared.value))),
        ]);
        let mut buf = builder.finish(&root);

        assert!(matches!(
            reverse_document(&mut buf, Endian::Big),
            Err(BymlError::AliasedOffset { .. })
        ));
    }

    #[test]
    fn test_wrong_magic() {
        let mut buf = DocBuilder::new(Endian::Little).finish(&sample());
        assert_eq!(
            reverse_document(&mut buf, Endian::Big),
            Err(BymlError::InvalidMagic(*b"YB"))
        );
    }

    #[test]
    fn test_unknown_node_type() {
        let root = TestNode::Map(vec![("x", TestNode::Raw(Node::new(0x42, 0)))]);
        let mut buf = DocBuilder::new(Endian::Little).finish(&root);
        assert_eq!(
            reverse_document(&mut buf, Endian::Little),
            Err(BymlError::UnknownNodeType(0x42))
        );
    }
}
