//! Zero-copy views over BYML (binary YAML) documents.
//!
//! Containers are read straight out of the backing buffer. Nothing is decoded
//! until a caller materializes a node, flips the byte order, or emits YAML.

pub mod byml_value;
pub mod containers;
pub mod deserialization;
pub mod document;
pub mod duplicate_key_map;
pub mod error;
pub mod reverse;
pub mod string_table;
pub mod types;
pub mod yaml;

#[cfg(test)]
pub(crate) mod test_utils;

pub use byml_value::{Byml, BymlMap};
pub use containers::{ArrayView, MapView};
pub use deserialization::{FromByml, decode_node};
pub use document::BymlDocument;
pub use duplicate_key_map::{DuplicateKeyComparer, DuplicateKeyMap};
pub use error::BymlError;
pub use reverse::{ByteCursor, ReversedOffsets, reverse_document, reverse_node};
pub use types::{Endian, MapEntry, Node};
pub use yaml::{EmitterConfig, YamlEmitter};
