use crate::duplicate_key_map::DuplicateKeyMap;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, SerializeStruct, Serializer};
use smol_str::SmolStr;

pub type BymlMap = DuplicateKeyMap<SmolStr, Byml>;

// ─── Byml ───────────────────────────────────────────────────────────────────

/// Owned, fully decoded node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Byml {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    String(SmolStr),
    Binary(Vec<u8>),
    File { data: Vec<u8>, alignment: u32 },
    Array(Vec<Byml>),
    Map(BymlMap),
}

impl Byml {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Byml::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Byml::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any signed or unsigned integer that fits in an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Byml::Int(i) => Some(i64::from(*i)),
            Byml::UInt(u) => Some(i64::from(*u)),
            Byml::Int64(i) => Some(*i),
            Byml::UInt64(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Byml::Int(i) => u64::try_from(*i).ok(),
            Byml::UInt(u) => Some(u64::from(*u)),
            Byml::Int64(i) => u64::try_from(*i).ok(),
            Byml::UInt64(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Byml::Float(f) => Some(f64::from(*f)),
            Byml::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Byml::Binary(data) | Byml::File { data, .. } => Some(data.as_slice()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Byml>> {
        match self {
            Byml::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BymlMap> {
        match self {
            Byml::Map(map) => Some(map),
            _ => None,
        }
    }

    /// First value under `key` if this is a map.
    pub fn get(&self, key: &str) -> Option<&Byml> {
        self.as_map()?.get(key)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Byml::Null)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Byml::Array(_) | Byml::Map(_))
    }
}

// ─── Serialize ──────────────────────────────────────────────────────────────

impl Serialize for Byml {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Byml::Null => serializer.serialize_none(),
            Byml::Bool(b) => serializer.serialize_bool(*b),
            Byml::Int(i) => serializer.serialize_i32(*i),
            Byml::UInt(u) => serializer.serialize_u32(*u),
            Byml::Float(f) => serializer.serialize_f32(*f),
            Byml::Int64(i) => serializer.serialize_i64(*i),
            Byml::UInt64(u) => serializer.serialize_u64(*u),
            Byml::Double(d) => serializer.serialize_f64(*d),
            Byml::String(s) => serializer.serialize_str(s.as_str()),
            Byml::Binary(data) => serializer.serialize_bytes(data),
            Byml::File { data, alignment } => {
                let mut s = serializer.serialize_struct("File", 2)?;
                s.serialize_field("alignment", alignment)?;
                s.serialize_field("data", &BytesRef(data))?;
                s.end()
            }
            Byml::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for v in items {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            // Duplicate keys are emitted as separate entries.
            Byml::Map(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    m.serialize_entry(k.as_str(), v)?;
                }
                m.end()
            }
        }
    }
}

struct BytesRef<'a>(&'a [u8]);

impl Serialize for BytesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

// ─── From impls ─────────────────────────────────────────────────────────────

impl From<bool> for Byml {
    fn from(b: bool) -> Self {
        Byml::Bool(b)
    }
}

impl From<i32> for Byml {
    fn from(n: i32) -> Self {
        Byml::Int(n)
    }
}

impl From<u32> for Byml {
    fn from(n: u32) -> Self {
        Byml::UInt(n)
    }
}

impl From<f32> for Byml {
    fn from(n: f32) -> Self {
        Byml::Float(n)
    }
}

impl From<i64> for Byml {
    fn from(n: i64) -> Self {
        Byml::Int64(n)
    }
}

impl From<u64> for Byml {
    fn from(n: u64) -> Self {
        Byml::UInt64(n)
    }
}

impl From<f64> for Byml {
    fn from(n: f64) -> Self {
        Byml::Double(n)
    }
}

impl From<&str> for Byml {
    fn from(s: &str) -> Self {
        Byml::String(SmolStr::from(s))
    }
}

impl From<String> for Byml {
    fn from(s: String) -> Self {
        Byml::String(SmolStr::from(s))
    }
}

// ─── Into serde_json::Value ─────────────────────────────────────────────────

impl From<Byml> for serde_json::Value {
    fn from(val: Byml) -> Self {
        match val {
            Byml::Null => serde_json::Value::Null,
            Byml::Bool(b) => serde_json::Value::Bool(b),
            Byml::Int(i) => serde_json::json!(i),
            Byml::UInt(u) => serde_json::json!(u),
            Byml::Float(f) => serde_json::json!(f),
            Byml::Int64(i) => serde_json::json!(i),
            Byml::UInt64(u) => serde_json::json!(u),
            Byml::Double(d) => serde_json::json!(d),
            Byml::String(s) => serde_json::Value::String(s.to_string()),
            Byml::Binary(data) => serde_json::Value::String(STANDARD.encode(data)),
            Byml::File { data, alignment } => serde_json::json!({
                "alignment": alignment,
                "data": STANDARD.encode(data),
            }),
            Byml::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(|v| v.into()).collect())
            }
            Byml::Map(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k.to_string(), v.into()))
                    .collect(),
            ),
        }
    }
}
