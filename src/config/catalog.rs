//! Flatten a configuration tree into its ordered catalog of addresses.
//!
//! The catalog is a pre-order walk: a node's own path is emitted before its children's,
//! mapping keys follow document order and sequence items follow index order. It exists for
//! coverage checks and debugging, not as an access path for stage logic.

use crate::config::node::{ConfigPath, Node};

/// Catalog of `node`, addressed from the root.
///
/// # Examples
///
/// ```
/// use timeseries_inventory::config::{ConfigDocument, extract};
///
/// let doc = ConfigDocument::from_yaml_str("a:\n  b: 1\nlags: [1, 2]\n")?;
/// let paths: Vec<String> = extract(doc.root()).iter().map(|p| p.to_string()).collect();
/// assert_eq!(paths, ["a", "a.b", "lags", "lags[0]", "lags[1]"]);
/// # Ok::<(), timeseries_inventory::Error>(())
/// ```
#[must_use]
pub fn extract(node: &Node) -> Vec<ConfigPath> {
    extract_with_prefix(node, &ConfigPath::root())
}

/// Catalog of `node`, with every entry prefixed by `prefix`.
///
/// The prefix itself is not emitted.
#[must_use]
pub fn extract_with_prefix(node: &Node, prefix: &ConfigPath) -> Vec<ConfigPath> {
    let mut out = Vec::with_capacity(node.descendant_count());
    walk(node, prefix, &mut out);
    out
}

fn walk(node: &Node, prefix: &ConfigPath, out: &mut Vec<ConfigPath>) {
    match node {
        Node::Mapping(entries) => {
            for (key, child) in entries {
                let path = prefix.key(key);
                out.push(path.clone());
                walk(child, &path, out);
            }
        }
        Node::Sequence(items) => {
            for (idx, child) in items.iter().enumerate() {
                let path = prefix.index(idx);
                out.push(path.clone());
                walk(child, &path, out);
            }
        }
        Node::Scalar(_) => {}
    }
}
