//! Typed navigation over a configuration tree.
//!
//! A [`Section`] pairs a node with the address it was reached by, so every lookup failure
//! can name the exact dotted path that is missing or mistyped.

use crate::config::loader::ConfigDocument;
use crate::config::node::{ConfigPath, Node, Scalar};
use crate::error::{Error, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Section<'a> {
    node: &'a Node,
    path: ConfigPath,
}

impl<'a> Section<'a> {
    #[must_use]
    pub fn new(node: &'a Node, path: ConfigPath) -> Self {
        Self { node, path }
    }

    /// Section rooted at the top of `doc`.
    #[must_use]
    pub fn of(doc: &'a ConfigDocument) -> Self {
        Self::new(doc.root(), ConfigPath::root())
    }

    #[must_use]
    pub fn path(&self) -> &ConfigPath {
        &self.path
    }

    #[must_use]
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Required mapping key.
    ///
    /// # Errors
    /// [`Error::MissingField`] naming the child path if absent, [`Error::TypeMismatch`] if this
    /// section is not a mapping.
    pub fn child(&self, key: &str) -> Result<Section<'a>> {
        self.optional(key)?
            .ok_or_else(|| Error::missing(self.path.key(key)))
    }

    /// Optional mapping key. An explicit `null` counts as absent.
    ///
    /// # Errors
    /// [`Error::TypeMismatch`] if this section is not a mapping.
    pub fn optional(&self, key: &str) -> Result<Option<Section<'a>>> {
        match self.node {
            Node::Mapping(_) => Ok(self
                .node
                .get(key)
                .filter(|n| !matches!(n, Node::Scalar(Scalar::Null)))
                .map(|n| Section::new(n, self.path.key(key)))),
            // `input:` with nothing under it reads as an empty mapping.
            Node::Scalar(Scalar::Null) => Ok(None),
            _ => Err(self.mismatch("mapping")),
        }
    }

    pub fn string(&self) -> Result<String> {
        match self.node {
            Node::Scalar(Scalar::Str(s)) => Ok(s.clone()),
            Node::Scalar(Scalar::Path(p)) => Ok(p.to_string_lossy().into_owned()),
            _ => Err(self.mismatch("string")),
        }
    }

    pub fn bool(&self) -> Result<bool> {
        match self.node {
            Node::Scalar(Scalar::Bool(b)) => Ok(*b),
            _ => Err(self.mismatch("boolean")),
        }
    }

    /// Integer value. Floats with no fractional part are accepted.
    pub fn i64(&self) -> Result<i64> {
        match self.node {
            Node::Scalar(Scalar::Int(i)) => Ok(*i),
            Node::Scalar(Scalar::Float(f))
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Ok(*f as i64)
            }
            _ => Err(self.mismatch("integer")),
        }
    }

    /// Non-negative integer that fits `T`.
    pub fn unsigned<T: TryFrom<i64>>(&self) -> Result<T> {
        let v = self.i64()?;
        T::try_from(v).map_err(|_| self.mismatch("unsigned integer"))
    }

    pub fn usize(&self) -> Result<usize> {
        self.unsigned()
    }

    pub fn u32(&self) -> Result<u32> {
        self.unsigned()
    }

    pub fn u64(&self) -> Result<u64> {
        self.unsigned()
    }

    /// Any number, integers widened.
    pub fn f64(&self) -> Result<f64> {
        match self.node {
            Node::Scalar(Scalar::Float(f)) => Ok(*f),
            Node::Scalar(Scalar::Int(i)) => Ok(*i as f64),
            _ => Err(self.mismatch("number")),
        }
    }

    /// Filesystem path; plain strings are accepted for keys not named `path`.
    pub fn path_buf(&self) -> Result<PathBuf> {
        match self.node {
            Node::Scalar(Scalar::Path(p)) => Ok(p.clone()),
            Node::Scalar(Scalar::Str(s)) => Ok(PathBuf::from(s)),
            _ => Err(self.mismatch("path")),
        }
    }

    pub fn items(&self) -> Result<Vec<Section<'a>>> {
        match self.node {
            Node::Sequence(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, n)| Section::new(n, self.path.index(i)))
                .collect()),
            _ => Err(self.mismatch("sequence")),
        }
    }

    /// Mapping entries in document order.
    pub fn entries(&self) -> Result<Vec<(&'a str, Section<'a>)>> {
        match self.node {
            Node::Mapping(entries) => Ok(entries
                .iter()
                .map(|(k, n)| (k.as_str(), Section::new(n, self.path.key(k))))
                .collect()),
            _ => Err(self.mismatch("mapping")),
        }
    }

    pub fn strings(&self) -> Result<Vec<String>> {
        self.items()?.iter().map(Section::string).collect()
    }

    pub fn u32s(&self) -> Result<Vec<u32>> {
        self.items()?.iter().map(Section::u32).collect()
    }

    /// Owned copy of a mapping subtree, for fields kept as free-form configuration.
    pub fn mapping(&self) -> Result<Node> {
        match self.node {
            Node::Mapping(_) => Ok(self.node.clone()),
            _ => Err(self.mismatch("mapping")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::TypeMismatch {
            path: self.path.clone(),
            expected,
            found: self.node.kind(),
        }
    }
}
