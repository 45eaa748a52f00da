//! Row sources that wrap another source to inject failures or record activity.
//!
//! Both wrappers keep their counters behind a `Mutex`, so tests can hand the reader a
//! reference (`&source` is itself a [`RowSource`]) and inspect the counters afterwards.

use crate::ingestion::{OpenedFile, RowSource};
use crate::io::csv::CsvSource;
use anyhow::{Result, anyhow, bail};
use csv::StringRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Wraps a [`RowSource`] and makes some of its reads fail.
///
/// Failures are counted per file:
/// - the first `failing_opens` opens of a file fail outright;
/// - with `failing_after_rows(k)`, the first open that does succeed yields `k` rows and then
///   one error.
///
/// By default every file is affected; [`FlakySource::only_file`] narrows that to one file
/// name.
#[derive(Debug)]
pub struct FlakySource<S = CsvSource> {
    inner: S,
    failing_opens: u32,
    fail_after_rows: Option<u64>,
    only: Option<String>,
    opens: Mutex<HashMap<PathBuf, u32>>,
}

impl FlakySource<CsvSource> {
    /// Flaky wrapper over the default CSV source.
    #[must_use]
    pub fn csv() -> Self {
        Self::new(CsvSource::default())
    }
}

impl<S> FlakySource<S> {
    /// Wrap `inner`; no failures until configured.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing_opens: 0,
            fail_after_rows: None,
            only: None,
            opens: Mutex::new(HashMap::new()),
        }
    }

    /// Fail the first `n` opens of each affected file.
    #[must_use]
    pub fn failing_opens(mut self, n: u32) -> Self {
        self.failing_opens = n;
        self
    }

    /// Fail every open of each affected file.
    #[must_use]
    pub fn always_failing(self) -> Self {
        self.failing_opens(u32::MAX)
    }

    /// Break the first successful read of each affected file after `rows` rows.
    #[must_use]
    pub fn failing_after_rows(mut self, rows: u64) -> Self {
        self.fail_after_rows = Some(rows);
        self
    }

    /// Only inject failures into files whose name is `file_name`.
    #[must_use]
    pub fn only_file(mut self, file_name: impl Into<String>) -> Self {
        self.only = Some(file_name.into());
        self
    }

    /// Number of times `path` was opened, failed opens included.
    #[must_use]
    pub fn opens(&self, path: &Path) -> u32 {
        let opens = self.opens.lock().unwrap_or_else(PoisonError::into_inner);
        opens.get(path).copied().unwrap_or(0)
    }

    /// Number of opens across all files.
    #[must_use]
    pub fn total_opens(&self) -> u32 {
        let opens = self.opens.lock().unwrap_or_else(PoisonError::into_inner);
        opens.values().sum()
    }

    fn affects(&self, path: &Path) -> bool {
        match &self.only {
            None => true,
            Some(name) => path.file_name().is_some_and(|n| n == name.as_str()),
        }
    }
}

impl<S: RowSource> RowSource for FlakySource<S> {
    type Rows = FlakyRows<S::Rows>;

    fn open(&self, path: &Path) -> Result<OpenedFile<Self::Rows>> {
        let attempt = {
            let mut opens = self.opens.lock().unwrap_or_else(PoisonError::into_inner);
            let n = opens.entry(path.to_path_buf()).or_insert(0);
            *n += 1;
            *n
        };
        let affected = self.affects(path);
        if affected && attempt <= self.failing_opens {
            bail!("injected open failure #{attempt} for {}", path.display());
        }
        let opened = self.inner.open(path)?;
        let fail_after = if affected && attempt == self.failing_opens.saturating_add(1) {
            self.fail_after_rows
        } else {
            None
        };
        Ok(OpenedFile {
            headers: opened.headers,
            rows: FlakyRows {
                inner: opened.rows,
                fail_after,
                yielded: 0,
            },
        })
    }
}

/// Row iterator handed out by [`FlakySource`].
pub struct FlakyRows<R> {
    inner: R,
    fail_after: Option<u64>,
    yielded: u64,
}

impl<R> Iterator for FlakyRows<R>
where
    R: Iterator<Item = Result<StringRecord>>,
{
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fail_after == Some(self.yielded) {
            self.fail_after = None;
            return Some(Err(anyhow!("injected read failure after {} rows", self.yielded)));
        }
        let row = self.inner.next()?;
        self.yielded += 1;
        Some(row)
    }
}

/// Wraps a [`RowSource`] and records every path it is asked to open.
#[derive(Debug, Default)]
pub struct CountingSource<S = CsvSource> {
    inner: S,
    opened: Mutex<Vec<PathBuf>>,
}

impl<S> CountingSource<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Every opened path, in call order.
    #[must_use]
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of times `path` was opened.
    #[must_use]
    pub fn open_count(&self, path: &Path) -> usize {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|p| p.as_path() == path)
            .count()
    }
}

impl<S: RowSource> RowSource for CountingSource<S> {
    type Rows = S::Rows;

    fn open(&self, path: &Path) -> Result<OpenedFile<Self::Rows>> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_path_buf());
        self.inner.open(path)
    }
}
