use csv::StringRecord;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One bounded chunk of rows read from a single source file.
///
/// The ingestion layer does not interpret columns: rows are raw [`StringRecord`]s and the
/// header (empty when the source has none) is shared by every batch of the same file.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBatch {
    source: PathBuf,
    index: usize,
    headers: Arc<StringRecord>,
    rows: Vec<StringRecord>,
}

impl DataBatch {
    #[must_use]
    pub fn new(
        source: impl Into<PathBuf>,
        index: usize,
        headers: Arc<StringRecord>,
        rows: Vec<StringRecord>,
    ) -> Self {
        Self {
            source: source.into(),
            index,
            headers,
            rows,
        }
    }

    /// File the rows were read from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Position of this batch within its file, starting at 0.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column named `name` in the header.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Value of `column` in every row, `None` where a row is short.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = Option<&'a str>> + use<'a>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| r.get(idx)))
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<StringRecord> {
        self.rows
    }
}
