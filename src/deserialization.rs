use crate::byml_value::{Byml, BymlMap};
use crate::document::BymlDocument;
use crate::duplicate_key_map::DuplicateKeyMap;
use crate::error::BymlError;
use crate::types::*;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use smol_str::SmolStr;

// ─── FromByml Trait ─────────────────────────────────────────────────────────

/// Trait for value types that can be built from BYML nodes.
///
/// This trait abstracts over different value representations (Byml,
/// serde_json::Value, cbor4ii::core::Value) allowing the same node decoder
/// to materialize any of them.
pub trait FromByml: Sized {
    fn from_null() -> Self;

    fn from_bool(b: bool) -> Self;

    fn from_i32(v: i32) -> Self;

    fn from_u32(v: u32) -> Self;

    fn from_f32(v: f32) -> Self;

    fn from_i64(v: i64) -> Self;

    fn from_u64(v: u64) -> Self;

    fn from_f64(v: f64) -> Self;

    fn from_str(s: &str) -> Self;

    /// Raw bytes of a `Binary` node.
    fn from_binary(data: &[u8]) -> Self;

    /// Raw bytes and alignment of a `File` node.
    fn from_file(data: &[u8], alignment: u32) -> Self;

    fn from_array(items: Vec<Self>) -> Self;

    /// Entries in key order; equal keys keep their storage order.
    fn from_map(map: DuplicateKeyMap<SmolStr, Self>) -> Self;
}

// ─── FromByml for Byml ──────────────────────────────────────────────────────

impl FromByml for Byml {
    #[inline]
    fn from_null() -> Self {
        Byml::Null
    }

    #[inline]
    fn from_bool(b: bool) -> Self {
        Byml::Bool(b)
    }

    #[inline]
    fn from_i32(v: i32) -> Self {
        Byml::Int(v)
    }

    #[inline]
    fn from_u32(v: u32) -> Self {
        Byml::UInt(v)
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        Byml::Float(v)
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        Byml::Int64(v)
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        Byml::UInt64(v)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        Byml::Double(v)
    }

    #[inline]
    fn from_str(s: &str) -> Self {
        Byml::String(SmolStr::new(s))
    }

    #[inline]
    fn from_binary(data: &[u8]) -> Self {
        Byml::Binary(data.to_vec())
    }

    #[inline]
    fn from_file(data: &[u8], alignment: u32) -> Self {
        Byml::File {
            data: data.to_vec(),
            alignment,
        }
    }

    #[inline]
    fn from_array(items: Vec<Self>) -> Self {
        Byml::Array(items)
    }

    #[inline]
    fn from_map(map: BymlMap) -> Self {
        Byml::Map(map)
    }
}

// ─── FromByml for serde_json::Value ─────────────────────────────────────────

impl FromByml for serde_json::Value {
    #[inline]
    fn from_null() -> Self {
        serde_json::Value::Null
    }

    #[inline]
    fn from_bool(b: bool) -> Self {
        serde_json::Value::Bool(b)
    }

    #[inline]
    fn from_i32(v: i32) -> Self {
        serde_json::Value::Number(v.into())
    }

    #[inline]
    fn from_u32(v: u32) -> Self {
        serde_json::Value::Number(v.into())
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        Self::from_f64(f64::from(v))
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        serde_json::Value::Number(v.into())
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        serde_json::Value::Number(v.into())
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        serde_json::Number::from_f64(v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }

    #[inline]
    fn from_str(s: &str) -> Self {
        serde_json::Value::String(s.to_string())
    }

    #[inline]
    fn from_binary(data: &[u8]) -> Self {
        serde_json::Value::String(STANDARD.encode(data))
    }

    fn from_file(data: &[u8], alignment: u32) -> Self {
        serde_json::json!({
            "alignment": alignment,
            "data": STANDARD.encode(data),
        })
    }

    #[inline]
    fn from_array(items: Vec<Self>) -> Self {
        serde_json::Value::Array(items)
    }

    /// JSON objects hold one value per key: the last duplicate wins.
    fn from_map(map: DuplicateKeyMap<SmolStr, Self>) -> Self {
        serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

// ─── FromByml for cbor4ii::core::Value ──────────────────────────────────────

impl FromByml for cbor4ii::core::Value {
    #[inline]
    fn from_null() -> Self {
        cbor4ii::core::Value::Null
    }

    #[inline]
    fn from_bool(b: bool) -> Self {
        cbor4ii::core::Value::Bool(b)
    }

    #[inline]
    fn from_i32(v: i32) -> Self {
        cbor4ii::core::Value::Integer(v as i128)
    }

    #[inline]
    fn from_u32(v: u32) -> Self {
        cbor4ii::core::Value::Integer(v as i128)
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        cbor4ii::core::Value::Float(f64::from(v))
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        cbor4ii::core::Value::Integer(v as i128)
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        cbor4ii::core::Value::Integer(v as i128)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        cbor4ii::core::Value::Float(v)
    }

    #[inline]
    fn from_str(s: &str) -> Self {
        cbor4ii::core::Value::Text(s.to_string())
    }

    #[inline]
    fn from_binary(data: &[u8]) -> Self {
        cbor4ii::core::Value::Bytes(data.to_vec())
    }

    fn from_file(data: &[u8], alignment: u32) -> Self {
        cbor4ii::core::Value::Map(vec![
            (
                cbor4ii::core::Value::Text("alignment".to_string()),
                cbor4ii::core::Value::Integer(alignment as i128),
            ),
            (
                cbor4ii::core::Value::Text("data".to_string()),
                cbor4ii::core::Value::Bytes(data.to_vec()),
            ),
        ])
    }

    #[inline]
    fn from_array(items: Vec<Self>) -> Self {
        cbor4ii::core::Value::Array(items)
    }

    /// CBOR maps are entry lists, so duplicates survive.
    fn from_map(map: DuplicateKeyMap<SmolStr, Self>) -> Self {
        cbor4ii::core::Value::Map(
            map.into_iter()
                .map(|(k, v)| (cbor4ii::core::Value::Text(k.to_string()), v))
                .collect(),
        )
    }
}

// ─── Decode Node ────────────────────────────────────────────────────────────

/// Decode `node` (recursing through containers) into any `FromByml` type.
pub fn decode_node<V: FromByml>(node: Node, doc: &BymlDocument<'_>) -> Result<V, BymlError> {
    decode_node_at(node, doc, 0)
}

/// `depth` counts the containers already entered above `node`.
pub(crate) fn decode_node_at<V: FromByml>(
    node: Node,
    doc: &BymlDocument<'_>,
    depth: usize,
) -> Result<V, BymlError> {
    if node.is_container() && depth >= MAX_DEPTH {
        return Err(BymlError::TooDeep {
            offset: node.value,
            limit: MAX_DEPTH,
        });
    }
    Ok(match node.node_type {
        TAG_NULL => V::from_null(),
        TAG_BOOL => V::from_bool(node.as_bool()),
        TAG_INT => V::from_i32(node.as_i32()),
        TAG_UINT => V::from_u32(node.value),
        TAG_FLOAT => V::from_f32(node.as_f32()),
        TAG_INT64 => V::from_i64(doc.read_u64(node)? as i64),
        TAG_UINT64 => V::from_u64(doc.read_u64(node)?),
        TAG_DOUBLE => V::from_f64(f64::from_bits(doc.read_u64(node)?)),
        TAG_STRING => V::from_str(doc.string(node.value)?),
        TAG_BINARY => V::from_binary(doc.binary(node)?),
        TAG_FILE => {
            let (data, alignment) = doc.file(node)?;
            V::from_file(data, alignment)
        }
        TAG_ARRAY => V::from_array(doc.array_view(node)?.to_owned_vec_at(doc, depth + 1)?),
        TAG_MAP => V::from_map(doc.map_view(node)?.to_owned_map_at(doc, depth + 1)?),
        other => return Err(BymlError::UnknownNodeType(other)),
    })
}
