//! CSV row source for the ingestion reader.
//!
//! [`CsvSource`] opens a file (decompressing it when needed), reads the optional header and
//! hands back a lazy iterator of [`StringRecord`]s. Records are not deserialized: the
//! ingestion layer passes them through untouched.
//!
//! Errors are annotated with the file and record number for easier debugging.

use crate::config::InputConfig;
use crate::ingestion::{OpenedFile, RowSource};
use crate::io::compression::auto_detect_reader;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Reads CSV files with a fixed header/delimiter setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvSource {
    has_headers: bool,
    delimiter: u8,
}

impl Default for CsvSource {
    fn default() -> Self {
        Self {
            has_headers: true,
            delimiter: b',',
        }
    }
}

impl CsvSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Source set up from `data_ingestion.input`.
    #[must_use]
    pub fn from_input(input: &InputConfig) -> Self {
        Self {
            has_headers: input.has_headers(),
            delimiter: input.delimiter(),
        }
    }

    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Lazy record iterator over one CSV file.
pub struct CsvRows {
    inner: StringRecordsIntoIter<Box<dyn Read + Send>>,
    path: PathBuf,
    record: u64,
}

impl Iterator for CsvRows {
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let rec = self.inner.next()?;
        self.record += 1;
        Some(rec.with_context(|| {
            format!("parse CSV record #{} in {}", self.record, self.path.display())
        }))
    }
}

impl RowSource for CsvSource {
    type Rows = CsvRows;

    fn open(&self, path: &Path) -> Result<OpenedFile<CsvRows>> {
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let rdr = auto_detect_reader(f, path)
            .with_context(|| format!("setup decompression for {}", path.display()))?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(self.has_headers)
            .delimiter(self.delimiter)
            .from_reader(rdr);
        let headers = if self.has_headers {
            rdr.headers()
                .with_context(|| format!("read CSV header of {}", path.display()))?
                .clone()
        } else {
            StringRecord::new()
        };
        Ok(OpenedFile {
            headers,
            rows: CsvRows {
                inner: rdr.into_records(),
                path: path.to_path_buf(),
                record: 0,
            },
        })
    }
}

/// Count the data rows of a CSV file (header excluded when `has_headers`).
///
/// # Errors
/// Returns an error if the file cannot be opened or a record is malformed.
pub fn count_csv_rows(path: impl AsRef<Path>, has_headers: bool) -> Result<u64> {
    let opened = CsvSource::new().with_headers(has_headers).open(path.as_ref())?;
    let mut total: u64 = 0;
    for rec in opened.rows {
        rec?;
        total += 1;
    }
    Ok(total)
}
