//! YAML loading for [`ConfigDocument`].
//!
//! The loader parses the source with `serde_yaml`, then converts the generic YAML value into
//! the crate's own [`Node`] tree, applying the `path` coercion on the way: every string found
//! anywhere under a key literally named `path` becomes a [`Scalar::Path`].

use crate::config::catalog;
use crate::config::node::{ConfigPath, Node, Scalar};
use crate::error::{Error, NotFound, Result};
use regex::Regex;
use serde_yaml::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default configuration document shipped with the crate.
pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/data_path.yaml");

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_ENV_VAR: &str = "TIMESERIES_INVENTORY_CONFIG";

/// Key whose string scalars are coerced to filesystem paths.
const PATH_KEY: &str = "path";

/// Pseudo-location used in error messages for documents parsed from a string.
const INLINE_SOURCE: &str = "<inline>";

static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<key>[^.\[\]]*)(?P<indices>(?:\[\d+\])*)$").expect("valid segment regex")
});

static INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("valid index regex"));

/// An immutable, fully parsed configuration snapshot.
///
/// Construct it once at startup and share it by reference (or behind an `Arc`); nothing in
/// the crate mutates a document after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Node,
    source: Option<PathBuf>,
}

impl ConfigDocument {
    /// Load and parse the document at `path`.
    ///
    /// Each call re-reads the file; nothing is cached.
    ///
    /// # Errors
    /// - [`NotFound::ConfigFile`] if `path` does not exist.
    /// - [`Error::Io`] if it exists but cannot be read.
    /// - [`Error::Parse`] if the content is not well-formed YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::error!(path = %path.display(), "Configuration file not found");
                return Err(NotFound::ConfigFile(path.to_path_buf()).into());
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let root = parse_yaml(&content, path)?;
        tracing::info!(path = %path.display(), "Loaded configuration document");
        Ok(Self {
            root,
            source: Some(path.to_path_buf()),
        })
    }

    /// Load from [`CONFIG_ENV_VAR`] if set, otherwise from [`DEFAULT_CONFIG_PATH`].
    ///
    /// # Errors
    /// See [`ConfigDocument::load`].
    pub fn load_default() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV_VAR) {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => PathBuf::from(DEFAULT_CONFIG_PATH),
        };
        tracing::info!(path = %path.display(), "No configuration path given, loading default location");
        Self::load(path)
    }

    /// Load `path` when given, otherwise fall back to [`ConfigDocument::load_default`].
    ///
    /// # Errors
    /// See [`ConfigDocument::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load_default(),
        }
    }

    /// Parse a document held in memory.
    ///
    /// # Errors
    /// [`Error::Parse`] if `yaml` is not well-formed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let root = parse_yaml(yaml, Path::new(INLINE_SOURCE))?;
        Ok(Self { root, source: None })
    }

    /// Wrap an already-built tree. The `path` coercion is applied here as well.
    #[must_use]
    pub fn from_root(root: Node) -> Self {
        Self {
            root: coerce_paths(root, false),
            source: None,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// File the document was read from, `None` for in-memory documents.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Every address in the document, in pre-order.
    #[must_use]
    pub fn catalog(&self) -> Vec<ConfigPath> {
        catalog::extract(&self.root)
    }

    /// Resolve a dot/bracket address such as `data_ingestion.input.path` or `lags[1]`.
    ///
    /// Meant for diagnostics; stage code goes through the typed resolvers instead.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Node> {
        if path.is_empty() {
            return Some(&self.root);
        }
        let mut node = &self.root;
        for segment in path.split('.') {
            let caps = SEGMENT_RE.captures(segment)?;
            let key = &caps["key"];
            if !key.is_empty() {
                node = node.get(key)?;
            }
            for idx in INDEX_RE.captures_iter(&caps["indices"]) {
                let i: usize = idx[1].parse().ok()?;
                node = node.item(i)?;
            }
        }
        Some(node)
    }

    /// Re-emit the document as YAML. Paths are written as plain strings.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(&self.root)?)
    }

    /// Re-emit the document as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails (e.g. a non-finite float).
    pub fn to_json_string(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}

fn parse_yaml(content: &str, origin: &Path) -> Result<Node> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| {
        tracing::error!(path = %origin.display(), error = %e, "Failed to parse configuration");
        Error::Parse {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        }
    })?;
    match value {
        // An empty or comment-only document is an empty mapping.
        Value::Null => Ok(Node::empty_mapping()),
        other => convert(other, false, &ConfigPath::root(), origin),
    }
}

fn convert(value: Value, under_path: bool, at: &ConfigPath, origin: &Path) -> Result<Node> {
    Ok(match value {
        Value::Null => Node::Scalar(Scalar::Null),
        Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Node::Scalar(Scalar::Int(i)),
            None => Node::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN))),
        },
        Value::String(s) if under_path => Node::Scalar(Scalar::Path(PathBuf::from(s))),
        Value::String(s) => Node::Scalar(Scalar::Str(s)),
        Value::Sequence(items) => Node::Sequence(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| convert(v, under_path, &at.index(i), origin))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Mapping(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (k, v) in map {
                let key = mapping_key(k).ok_or_else(|| Error::Parse {
                    path: origin.to_path_buf(),
                    reason: format!("unsupported non-scalar mapping key under `{at}`"),
                })?;
                let child = at.key(&key);
                let node = convert(v, under_path || key == PATH_KEY, &child, origin)?;
                entries.push((key, node));
            }
            Node::Mapping(entries)
        }
        Value::Tagged(tagged) => convert(tagged.value, under_path, at, origin)?,
    })
}

fn mapping_key(key: Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Tagged(tagged) => mapping_key(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn coerce_paths(node: Node, under_path: bool) -> Node {
    match node {
        Node::Scalar(Scalar::Str(s)) if under_path => Node::Scalar(Scalar::Path(PathBuf::from(s))),
        Node::Scalar(s) => Node::Scalar(s),
        Node::Sequence(items) => {
            Node::Sequence(items.into_iter().map(|v| coerce_paths(v, under_path)).collect())
        }
        Node::Mapping(entries) => Node::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| {
                    let nested = under_path || k == PATH_KEY;
                    (k, coerce_paths(v, nested))
                })
                .collect(),
        ),
    }
}
