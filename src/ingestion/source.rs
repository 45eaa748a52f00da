use anyhow::Result;
use csv::StringRecord;
use std::path::Path;

/// A file opened by a [`RowSource`]: its header and a lazy row iterator.
///
/// Dropping the value releases the underlying file handle.
pub struct OpenedFile<R> {
    /// Header row; empty when the format has none.
    pub headers: StringRecord,
    pub rows: R,
}

/// Turns a file path into a stream of rows.
///
/// The ingestion reader calls [`RowSource::open`] once per attempt, so an implementation
/// must be able to re-open the same file from its beginning. Errors from `open` and from the
/// row iterator are both treated as transient read failures and retried.
pub trait RowSource {
    type Rows: Iterator<Item = Result<StringRecord>>;

    /// Open `path` for reading from the first row.
    ///
    /// # Errors
    /// Any failure to open or prepare the file.
    fn open(&self, path: &Path) -> Result<OpenedFile<Self::Rows>>;
}

impl<S: RowSource + ?Sized> RowSource for &S {
    type Rows = S::Rows;

    fn open(&self, path: &Path) -> Result<OpenedFile<Self::Rows>> {
        (**self).open(path)
    }
}
