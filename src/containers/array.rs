use crate::deserialization::{FromByml, decode_node_at};
use crate::document::BymlDocument;
use crate::error::BymlError;
use crate::reverse::{ByteCursor, ReversedOffsets, reverse_node};
use crate::types::*;
use crate::yaml::YamlEmitter;

/// Byte length of the type run, padded to 4.
#[inline]
fn types_len(count: usize) -> usize {
    (count + 3) & !3
}

// ─── ArrayView (zero-copy) ──────────────────────────────────────────────────
//
//  header: 0xC0 | count: u24
//  types:  u8 × count, padded to 4
//  values: u32 × count
//
#[derive(Debug, Clone, Copy)]
pub struct ArrayView<'a> {
    data: &'a [u8],
    offset: usize,
    count: usize,
    types: &'a [u8],
    values: &'a [u8],
}

impl<'a> ArrayView<'a> {
    pub fn new(data: &'a [u8], offset: usize, count: usize) -> Result<Self, BymlError> {
        if count == 0 {
            return Ok(Self {
                data,
                offset,
                count,
                types: &[],
                values: &[],
            });
        }
        let types_at = offset.saturating_add(CONTAINER_HEADER_SIZE);
        let types = slice_at(data, types_at, count)?;
        let values_len = count.checked_mul(4).ok_or(BymlError::OutOfBounds {
            offset,
            len: usize::MAX,
            buffer_len: data.len(),
        })?;
        let values = slice_at(data, types_at.saturating_add(types_len(count)), values_len)?;
        Ok(Self {
            data,
            offset,
            count,
            types,
            values,
        })
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Node> {
        if index >= self.count {
            return None;
        }
        let at = index * 4;
        let raw = &self.values[at..at + 4];
        Some(Node::new(
            self.types[index],
            u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
        ))
    }

    #[inline]
    pub fn node(&self, index: usize) -> Result<Node, BymlError> {
        self.get(index).ok_or(BymlError::IndexOutOfBounds {
            index,
            count: self.count,
        })
    }

    #[inline]
    pub fn iter(&self) -> ArrayIter<'a> {
        ArrayIter {
            view: *self,
            pos: 0,
        }
    }

    pub fn has_container_nodes(&self) -> bool {
        self.types.iter().any(|&tag| is_container_type(tag))
    }

    pub fn to_owned_vec<V: FromByml>(&self, doc: &BymlDocument<'a>) -> Result<Vec<V>, BymlError> {
        self.to_owned_vec_at(doc, 1)
    }

    pub(crate) fn to_owned_vec_at<V: FromByml>(
        &self,
        doc: &BymlDocument<'a>,
        depth: usize,
    ) -> Result<Vec<V>, BymlError> {
        self.iter()
            .map(|node| decode_node_at(node, doc, depth))
            .collect()
    }

    /// Flip the `count` values of the array at `offset`. Type bytes stay put.
    pub fn reverse(
        cursor: &mut ByteCursor<'_>,
        offset: usize,
        count: usize,
        visited: &mut ReversedOffsets,
    ) -> Result<(), BymlError> {
        let types_at = offset + CONTAINER_HEADER_SIZE;
        let values_at = types_at + types_len(count);
        for i in 0..count {
            cursor.seek(types_at + i);
            let node_type = cursor.read_u8()?;
            cursor.seek(values_at + 4 * i);
            let value = cursor.flip_u32()?;

            reverse_node(cursor, Node::new(node_type, value), visited)?;
        }
        Ok(())
    }

    pub fn emit_yaml(
        &self,
        emitter: &mut YamlEmitter,
        doc: &BymlDocument<'a>,
    ) -> Result<(), BymlError> {
        if self.count <= emitter.config().inline_container_max_count
            && !self.has_container_nodes()
        {
            emitter.write("[");
            for (i, node) in self.iter().enumerate() {
                if i > 0 {
                    emitter.write(", ");
                }
                emitter.emit_node(node, doc)?;
            }
            emitter.write("]");
            return Ok(());
        }

        for node in self.iter() {
            emitter.begin_line();
            emitter.write_sequence_marker();
            emitter.with_indent(|e| e.emit_node(node, doc))?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for ArrayView<'a> {
    type Item = Node;
    type IntoIter = ArrayIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct ArrayIter<'a> {
    view: ArrayView<'a>,
    pos: usize,
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.view.get(self.pos)?;
        self.pos += 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.count - self.pos;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for ArrayIter<'a> {}
