//! Test-only document builder. The library itself never encodes.

use crate::types::*;

/// Tree of values to lay out as a BYML document.
#[derive(Debug, Clone)]
pub enum TestNode {
    Null,
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    Str(&'static str),
    Binary(Vec<u8>),
    File(Vec<u8>, u32),
    Array(Vec<TestNode>),
    Map(Vec<(&'static str, TestNode)>),
    /// Pre-written node, used to share one offset between several entries.
    Raw(Node),
}

pub struct DocBuilder {
    endian: Endian,
    buf: Vec<u8>,
    keys: Vec<&'static str>,
    strings: Vec<&'static str>,
}

impl DocBuilder {
    pub fn new(endian: Endian) -> Self {
        Self {
            endian,
            buf: vec![0u8; DOCUMENT_HEADER_SIZE],
            keys: Vec::new(),
            strings: Vec::new(),
        }
    }

    fn u16_bytes(&self, v: u16) -> [u8; 2] {
        match self.endian {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        }
    }

    fn u32_bytes(&self, v: u32) -> [u8; 4] {
        match self.endian {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        }
    }

    fn u64_bytes(&self, v: u64) -> [u8; 8] {
        match self.endian {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        }
    }

    fn u24_bytes(&self, v: u32) -> [u8; 3] {
        let le = v.to_le_bytes();
        match self.endian {
            Endian::Little => [le[0], le[1], le[2]],
            Endian::Big => [le[2], le[1], le[0]],
        }
    }

    fn align(&mut self) {
        while self.buf.len() % 4 != 0 {
            self.buf.push(0);
        }
    }

    fn put_u32(&mut self, at: usize, v: u32) {
        let bytes = self.u32_bytes(v);
        self.buf[at..at + 4].copy_from_slice(&bytes);
    }

    fn put_container_header(&mut self, at: usize, tag: u8, count: usize) {
        let count = self.u24_bytes(count as u32);
        self.buf[at] = tag;
        self.buf[at + 1..at + 4].copy_from_slice(&count);
    }

    fn intern(list: &mut Vec<&'static str>, s: &'static str) -> u32 {
        match list.iter().position(|k| *k == s) {
            Some(i) => i as u32,
            None => {
                list.push(s);
                (list.len() - 1) as u32
            }
        }
    }

    /// Lay out `node` (and any out-of-line data) and return its value slot.
    pub fn write(&mut self, node: &TestNode) -> Node {
        match node {
            TestNode::Null => Node::new(TAG_NULL, 0),
            TestNode::Bool(b) => Node::new(TAG_BOOL, *b as u32),
            TestNode::Int(v) => Node::new(TAG_INT, *v as u32),
            TestNode::UInt(v) => Node::new(TAG_UINT, *v),
            TestNode::Float(v) => Node::new(TAG_FLOAT, v.to_bits()),
            TestNode::Str(s) => Node::new(TAG_STRING, Self::intern(&mut self.strings, *s)),
            TestNode::Int64(v) => Node::new(TAG_INT64, self.write_u64(*v as u64)),
            TestNode::UInt64(v) => Node::new(TAG_UINT64, self.write_u64(*v)),
            TestNode::Double(v) => Node::new(TAG_DOUBLE, self.write_u64(v.to_bits())),
            TestNode::Binary(data) => {
                self.align();
                let at = self.buf.len();
                let len = self.u32_bytes(data.len() as u32);
                self.buf.extend_from_slice(&len);
                self.buf.extend_from_slice(data);
                Node::new(TAG_BINARY, at as u32)
            }
            TestNode::File(data, alignment) => {
                self.align();
                let at = self.buf.len();
                let len = self.u32_bytes(data.len() as u32);
                let align = self.u32_bytes(*alignment);
                self.buf.extend_from_slice(&len);
                self.buf.extend_from_slice(&align);
                self.buf.extend_from_slice(data);
                Node::new(TAG_FILE, at as u32)
            }
            TestNode::Array(items) => {
                self.align();
                let at = self.buf.len();
                let types_len = (items.len() + 3) & !3;
                let values_at = at + CONTAINER_HEADER_SIZE + types_len;
                self.buf.resize(values_at + items.len() * 4, 0);
                self.put_container_header(at, TAG_ARRAY, items.len());
                for (i, item) in items.iter().enumerate() {
                    let child = self.write(item);
                    self.buf[at + CONTAINER_HEADER_SIZE + i] = child.node_type;
                    self.put_u32(values_at + i * 4, child.value);
                }
                Node::new(TAG_ARRAY, at as u32)
            }
            TestNode::Map(entries) => {
                self.align();
                let at = self.buf.len();
                self.buf
                    .resize(at + CONTAINER_HEADER_SIZE + entries.len() * MAP_ENTRY_SIZE, 0);
                self.put_container_header(at, TAG_MAP, entries.len());
                for (i, (key, value)) in entries.iter().enumerate() {
                    let key_index = Self::intern(&mut self.keys, *key);
                    let child = self.write(value);
                    let entry_at = at + CONTAINER_HEADER_SIZE + i * MAP_ENTRY_SIZE;
                    let key_bytes = self.u24_bytes(key_index);
                    self.buf[entry_at..entry_at + 3].copy_from_slice(&key_bytes);
                    self.buf[entry_at + 3] = child.node_type;
                    self.put_u32(entry_at + 4, child.value);
                }
                Node::new(TAG_MAP, at as u32)
            }
            TestNode::Raw(node) => *node,
        }
    }

    fn write_u64(&mut self, v: u64) -> u32 {
        self.align();
        let at = self.buf.len();
        let bytes = self.u64_bytes(v);
        self.buf.extend_from_slice(&bytes);
        at as u32
    }

    fn write_string_table(&mut self, strings: &[&str]) -> u32 {
        self.align();
        let at = self.buf.len();
        let table = string_table_with(strings, self.endian);
        self.buf.extend_from_slice(&table);
        at as u32
    }

    /// Write `root`, both string tables and the header.
    pub fn finish(mut self, root: &TestNode) -> Vec<u8> {
        let root = self.write(root);
        let root_offset = if root.is_container() { root.value } else { 0 };
        let keys = std::mem::take(&mut self.keys);
        let strings = std::mem::take(&mut self.strings);
        let key_table = if keys.is_empty() { 0 } else { self.write_string_table(&keys) };
        let string_table = if strings.is_empty() {
            0
        } else {
            self.write_string_table(&strings)
        };
        self.align();

        let magic = match self.endian {
            Endian::Little => MAGIC_LE,
            Endian::Big => MAGIC_BE,
        };
        let version = self.u16_bytes(7);
        self.buf[0..2].copy_from_slice(&magic);
        self.buf[2..4].copy_from_slice(&version);
        self.put_u32(4, key_table);
        self.put_u32(8, string_table);
        self.put_u32(12, root_offset);
        self.buf
    }
}

/// Little-endian document for `root`.
pub fn document_bytes(root: &TestNode) -> Vec<u8> {
    DocBuilder::new(Endian::Little).finish(root)
}

/// Unpadded little-endian string table.
pub fn string_table_bytes(strings: &[&str]) -> Vec<u8> {
    string_table_with(strings, Endian::Little)
}

fn string_table_with(strings: &[&str], endian: Endian) -> Vec<u8> {
    let u32_bytes = |v: u32| match endian {
        Endian::Little => v.to_le_bytes(),
        Endian::Big => v.to_be_bytes(),
    };
    let count = (strings.len() as u32).to_le_bytes();
    let mut out = vec![TAG_STRING_TABLE];
    match endian {
        Endian::Little => out.extend_from_slice(&count[..3]),
        Endian::Big => out.extend_from_slice(&[count[2], count[1], count[0]]),
    }
    let mut cursor = CONTAINER_HEADER_SIZE + (strings.len() + 1) * 4;
    for s in strings {
        out.extend_from_slice(&u32_bytes(cursor as u32));
        cursor += s.len() + 1;
    }
    out.extend_from_slice(&u32_bytes(cursor as u32));
    for s in strings {
        out.extend_from_slice(s.as_bytes());
        out.push(0);
    }
    out
}

/// A bare little-endian map container at offset 0: header plus raw entries.
pub fn raw_map_bytes(entries: &[(u32, u8, u32)]) -> Vec<u8> {
    let mut out = vec![TAG_MAP];
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes()[..3]);
    for &(key, tag, value) in entries {
        out.extend_from_slice(&key.to_le_bytes()[..3]);
        out.push(tag);
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}
