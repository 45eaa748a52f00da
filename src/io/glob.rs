//! File discovery for ingestion.
//!
//! Source files are selected by matching a glob pattern against the entries of one
//! directory. Results keep the order the filesystem lists them in; they are not sorted.
//!
//! # Pattern Syntax
//!
//! - `*` matches any sequence of characters within a name
//! - `?` matches any single character
//! - `[abc]` / `[!abc]` match any character in / not in the set
//! - patterns containing `/` or `**` are matched against nested paths under the directory
//!
//! # Examples
//!
//! ```no_run
//! use timeseries_inventory::io::glob::expand_in_dir;
//! use std::path::Path;
//!
//! let files = expand_in_dir(Path::new("data/raw"), "sales_*.csv")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use glob::{Pattern, glob};
use std::fs;
use std::path::{Path, PathBuf};

/// All regular files under `directory` matching `pattern`.
///
/// Simple patterns (a single name component) are matched against `read_dir` entries, so the
/// result follows directory-listing order. Nested patterns are expanded with the `glob`
/// crate relative to `directory`.
///
/// # Errors
///
/// Returns an error if:
/// - The pattern is invalid
/// - The directory cannot be listed
/// - No files match the pattern (returns empty vector, not an error)
pub fn expand_in_dir(directory: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if is_nested(pattern) {
        return expand_nested(directory, pattern);
    }
    let matcher = Pattern::new(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;
    let entries =
        fs::read_dir(directory).with_context(|| format!("list {}", directory.display()))?;

    let mut result = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry of {}", directory.display()))?;
        let path = entry.path();
        // Only include actual files, not directories
        if matcher.matches(&entry.file_name().to_string_lossy()) && path.is_file() {
            result.push(path);
        }
    }
    Ok(result)
}

/// [`expand_in_dir`] truncated to at most `max_files` entries.
///
/// # Errors
/// See [`expand_in_dir`].
pub fn expand_in_dir_limited(
    directory: &Path,
    pattern: &str,
    max_files: usize,
) -> Result<Vec<PathBuf>> {
    let mut files = expand_in_dir(directory, pattern)?;
    files.truncate(max_files);
    Ok(files)
}

fn is_nested(pattern: &str) -> bool {
    pattern.contains('/') || pattern.contains(std::path::MAIN_SEPARATOR) || pattern.contains("**")
}

fn expand_nested(directory: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let base = Pattern::escape(&directory.to_string_lossy());
    let full = format!("{base}/{pattern}");
    let paths = glob(&full).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut result = Vec::new();
    for entry in paths {
        let path = entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            result.push(path);
        }
    }
    Ok(result)
}

/// Check that `pattern` is a well-formed glob pattern.
///
/// # Errors
/// The parse error, pointing at the offending character.
pub fn validate_pattern(pattern: &str) -> Result<(), glob::PatternError> {
    Pattern::new(pattern).map(|_| ())
}
