use crate::deserialization::{FromByml, decode_node_at};
use crate::document::BymlDocument;
use crate::duplicate_key_map::DuplicateKeyMap;
use crate::error::BymlError;
use crate::reverse::{ByteCursor, ReversedOffsets, reverse_node};
use crate::types::*;
use crate::yaml::YamlEmitter;
use smol_str::SmolStr;

// ─── MapView (zero-copy) ────────────────────────────────────────────────────

/// Zero-copy view over a map container.
///
/// `count` comes from the caller and is trusted; construction only checks
/// that the entry run `[offset + 4, offset + 4 + 8 * count)` fits in `data`.
#[derive(Debug, Clone, Copy)]
pub struct MapView<'a> {
    data: &'a [u8],
    offset: usize,
    count: usize,
    entries: &'a [u8],
}

impl<'a> MapView<'a> {
    pub fn new(data: &'a [u8], offset: usize, count: usize) -> Result<Self, BymlError> {
        let entries = if count == 0 {
            &[][..]
        } else {
            let len = count
                .checked_mul(MAP_ENTRY_SIZE)
                .ok_or(BymlError::OutOfBounds {
                    offset,
                    len: usize::MAX,
                    buffer_len: data.len(),
                })?;
            let start = offset.saturating_add(CONTAINER_HEADER_SIZE);
            slice_at(data, start, len)?
        };
        Ok(Self {
            data,
            offset,
            count,
            entries,
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

    /// The whole document buffer this view was built over.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Decode entry `index`, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<MapEntry> {
        if index >= self.count {
            return None;
        }
        let at = index * MAP_ENTRY_SIZE;
        let raw = &self.entries[at..at + MAP_ENTRY_SIZE];
        let w0 = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let w1 = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
        Some(MapEntry::from_words(w0, w1))
    }

    #[inline]
    pub fn entry(&self, index: usize) -> Result<MapEntry, BymlError> {
        self.get(index).ok_or(BymlError::IndexOutOfBounds {
            index,
            count: self.count,
        })
    }

    #[inline]
    pub fn iter(&self) -> MapIter<'a> {
        MapIter {
            view: *self,
            pos: 0,
        }
    }

    /// True if any entry holds an array or map.
    pub fn has_container_nodes(&self) -> bool {
        self.iter().any(|entry| is_container_type(entry.node_type))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Materialization
    // ════════════════════════════════════════════════════════════════════════

    /// Decode every entry into an owned multimap. Entries with equal keys are
    /// all kept, in storage order.
    pub fn to_owned_map<V: FromByml>(
        &self,
        doc: &BymlDocument<'a>,
    ) -> Result<DuplicateKeyMap<SmolStr, V>, BymlError> {
        self.to_owned_map_at(doc, 1)
    }

    /// `depth` is the nesting level of this map's entries.
    pub(crate) fn to_owned_map_at<V: FromByml>(
        &self,
        doc: &BymlDocument<'a>,
        depth: usize,
    ) -> Result<DuplicateKeyMap<SmolStr, V>, BymlError> {
        let mut map = DuplicateKeyMap::with_capacity(self.count);
        for entry in self.iter() {
            let key = doc.key(entry.key_index)?;
            let value = decode_node_at(entry.node(), doc, depth)?;
            map.insert(SmolStr::new(key), value);
        }
        Ok(map)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Byte order reversal
    // ════════════════════════════════════════════════════════════════════════

    /// Flip the `count` entries of the map at `offset` and everything they
    /// point at. The container header is the caller's job.
    pub fn reverse(
        cursor: &mut ByteCursor<'_>,
        offset: usize,
        count: usize,
        visited: &mut ReversedOffsets,
    ) -> Result<(), BymlError> {
        for i in 0..count {
            cursor.seek(offset + CONTAINER_HEADER_SIZE + MAP_ENTRY_SIZE * i);
            cursor.reverse(3)?;
            let node_type = cursor.read_u8()?;
            let value = cursor.flip_u32()?;

            reverse_node(cursor, Node::new(node_type, value), visited)?;
        }
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════
    // YAML
    // ════════════════════════════════════════════════════════════════════════

    pub fn emit_yaml(
        &self,
        emitter: &mut YamlEmitter,
        doc: &BymlDocument<'a>,
    ) -> Result<(), BymlError> {
        if self.count <= emitter.config().inline_container_max_count
            && !self.has_container_nodes()
        {
            emitter.write("{");
            for (i, entry) in self.iter().enumerate() {
                if i > 0 {
                    emitter.write(", ");
                }
                emitter.emit_string(doc.key(entry.key_index)?)?;
                emitter.write(": ");
                emitter.emit_node(entry.node(), doc)?;
            }
            emitter.write("}");
            return Ok(());
        }

        for entry in self.iter() {
            emitter.begin_line();
            emitter.emit_string(doc.key(entry.key_index)?)?;
            emitter.write(": ");
            emitter.with_indent(|e| e.emit_node(entry.node(), doc))?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for MapView<'a> {
    type Item = MapEntry;
    type IntoIter = MapIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ─── Iterator ───────────────────────────────────────────────────────────────

pub struct MapIter<'a> {
    view: MapView<'a>,
    pos: usize,
}

impl<'a> Iterator for MapIter<'a> {
    type Item = MapEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.view.get(self.pos)?;
        self.pos += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.count - self.pos;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for MapIter<'a> {}
