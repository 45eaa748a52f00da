//! The in-memory configuration tree and the path coordinates that address it.
//!
//! A [`Node`] is a tagged variant over scalars, insertion-ordered mappings and sequences.
//! Subtrees are owned by value; a configuration document is parsed from acyclic text, so no
//! indirection is needed.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// A leaf value.
///
/// `Path` never comes out of the YAML parser directly: the loader produces it by coercing
/// strings found under a key named `path`.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
}

impl Scalar {
    /// Short name of the scalar kind, used in type-mismatch messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "string",
            Scalar::Path(_) => "path",
        }
    }
}

/// One node of a configuration document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    /// Keys are unique and kept in document order.
    Mapping(Vec<(String, Node)>),
    Sequence(Vec<Node>),
}

impl Node {
    /// An empty mapping, which is what an empty document parses to.
    #[must_use]
    pub fn empty_mapping() -> Self {
        Node::Mapping(Vec::new())
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(s) => s.kind(),
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
        }
    }

    /// Look up a mapping key. Returns `None` for a missing key or a non-mapping node.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up a sequence item by index.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&Node> {
        match self {
            Node::Sequence(items) => items.get(index),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Node::Scalar(Scalar::Path(p)) => Some(p),
            _ => None,
        }
    }

    /// Number of nodes below this one (the node itself is not counted).
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        match self {
            Node::Scalar(_) => 0,
            Node::Mapping(entries) => entries.iter().map(|(_, v)| 1 + v.descendant_count()).sum(),
            Node::Sequence(items) => items.iter().map(|v| 1 + v.descendant_count()).sum(),
        }
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Node::Scalar(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Scalar(Scalar::Str(value))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Scalar(Scalar::Int(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Scalar(Scalar::Float(value))
    }
}

impl From<PathBuf> for Node {
    fn from(value: PathBuf) -> Self {
        Node::Scalar(Scalar::Path(value))
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::Str(s) => serializer.serialize_str(s),
            Scalar::Path(p) => serializer.serialize_str(&p.to_string_lossy()),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(s) => s.serialize(serializer),
            Node::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Node::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for v in items {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}

/// Dot/bracket address of one node, e.g. `data_ingestion.retry.attempts` or `lags[2]`.
///
/// Purely a coordinate; it holds no reference into a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigPath(String);

impl ConfigPath {
    /// The empty path, addressing the document root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Child path for a mapping key: `prefix.key`, or just `key` at the root.
    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{key}", self.0))
        }
    }

    /// Child path for a sequence index: `prefix[index]`.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for ConfigPath {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConfigPath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ConfigPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ConfigPath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ConfigPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
