//! Configuration loading, introspection and per-stage resolution.
//!
//! - [`ConfigDocument`] parses a YAML source into an immutable [`Node`] tree.
//! - [`extract`] flattens a tree into its catalog of [`ConfigPath`]s.
//! - [`stages`] turns the tree into the nine typed stage records.

pub mod catalog;
pub mod loader;
pub mod node;
pub mod section;
pub mod stages;

pub use catalog::{extract, extract_with_prefix};
pub use loader::{CONFIG_ENV_VAR, ConfigDocument, DEFAULT_CONFIG_PATH};
pub use node::{ConfigPath, Node, Scalar};
pub use section::Section;
pub use stages::*;
