use crate::config::{ConfigPath, DataIngestionConfig, OnExhausted, StageConfig};
use crate::error::{Error, NotFound, Result};
use crate::ingestion::batch::DataBatch;
use crate::ingestion::retry::{self, RetryDecision};
use crate::ingestion::source::RowSource;
use crate::io::csv::CsvSource;
use crate::io::glob::{expand_in_dir_limited, validate_pattern};
use csv::StringRecord;
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;

/// Chunked, retrying reader over the files selected by a [`DataIngestionConfig`].
///
/// The set of files is computed once, at construction; each call to
/// [`IngestionReader::stream`] starts a fresh pass from the first file.
///
/// # Examples
///
/// ```no_run
/// use timeseries_inventory::config::{ConfigDocument, resolve_data_ingestion};
/// use timeseries_inventory::ingestion::IngestionReader;
///
/// let doc = ConfigDocument::load_default()?;
/// let reader = IngestionReader::new(&resolve_data_ingestion(&doc)?)?;
/// for batch in reader.stream() {
///     let batch = batch?;
///     println!("{} rows from {}", batch.len(), batch.source().display());
/// }
/// # Ok::<(), timeseries_inventory::Error>(())
/// ```
#[derive(Debug)]
pub struct IngestionReader<S = CsvSource> {
    config: DataIngestionConfig,
    files: Vec<PathBuf>,
    source: S,
}

impl IngestionReader<CsvSource> {
    /// Reader over CSV files, with header and delimiter taken from `input`.
    ///
    /// # Errors
    /// See [`IngestionReader::with_source`].
    pub fn new(config: &DataIngestionConfig) -> Result<Self> {
        Self::with_source(config, CsvSource::from_input(&config.input))
    }
}

impl<S: RowSource> IngestionReader<S> {
    /// Reader that opens files through `source`.
    ///
    /// # Errors
    /// - [`Error::InvalidValue`] if the record fails [`DataIngestionConfig::validate`].
    /// - [`NotFound::SourceDirectory`] if `input.path` is not an existing directory.
    /// - [`Error::InvalidValue`] if `input.file_pattern` is not a valid glob.
    /// - [`NotFound::NoMatchingFiles`] if nothing matches.
    pub fn with_source(config: &DataIngestionConfig, source: S) -> Result<Self> {
        config.validate()?;
        let input = &config.input;
        if !input.path.is_dir() {
            tracing::error!(path = %input.path.display(), "Source directory does not exist");
            return Err(NotFound::SourceDirectory(input.path.clone()).into());
        }
        if let Err(e) = validate_pattern(&input.file_pattern) {
            return Err(Error::invalid(
                ConfigPath::root()
                    .key(DataIngestionConfig::SECTION)
                    .key("input")
                    .key("file_pattern"),
                e.to_string(),
            ));
        }
        let files = expand_in_dir_limited(&input.path, &input.file_pattern, input.max_files)
            .map_err(|e| Error::Io {
                path: input.path.clone(),
                source: std::io::Error::other(format!("{e:#}")),
            })?;
        if files.is_empty() {
            tracing::error!(
                pattern = %input.file_pattern,
                path = %input.path.display(),
                "No files matching pattern"
            );
            return Err(NotFound::NoMatchingFiles {
                directory: input.path.clone(),
                pattern: input.file_pattern.clone(),
            }
            .into());
        }
        tracing::info!(
            files = files.len(),
            max_files = input.max_files,
            pattern = %input.file_pattern,
            path = %input.path.display(),
            "Found files matching pattern"
        );
        Ok(Self {
            config: config.clone(),
            files,
            source,
        })
    }

    /// The matched file set, in read order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    #[must_use]
    pub fn config(&self) -> &DataIngestionConfig {
        &self.config
    }

    /// Lazy, pull-based sequence of batches over every matched file.
    ///
    /// Files are read in order and each file is split into batches of at most
    /// `input.chunksize` rows. A failed read is retried up to `retry.attempts` times in total,
    /// pausing `retry.delay_seconds` between attempts; a retried attempt resumes after the rows
    /// already yielded, so the consumer never sees a row twice. Once a file runs out of
    /// attempts the stream yields one [`Error::IngestionRead`] and then ends, unless
    /// `retry.on_exhausted` is `skip`.
    #[must_use]
    pub fn stream(&self) -> BatchStream<'_, S> {
        BatchStream {
            reader: self,
            state: StreamState::Pending {
                file: 0,
                attempt: 1,
            },
            delivered: 0,
            batches: 0,
        }
    }
}

enum StreamState<R> {
    Pending {
        file: usize,
        attempt: u32,
    },
    Reading {
        file: usize,
        attempt: u32,
        headers: Arc<StringRecord>,
        rows: R,
    },
    Done,
    Aborted,
}

/// Iterator returned by [`IngestionReader::stream`].
///
/// Yields `Ok(batch)` for data and at most one `Err`, after which it is exhausted. Dropping it
/// part-way through closes the file being read.
pub struct BatchStream<'r, S: RowSource> {
    reader: &'r IngestionReader<S>,
    state: StreamState<S::Rows>,
    /// Rows of the current file already handed to the consumer.
    delivered: u64,
    /// Batches of the current file already handed to the consumer.
    batches: usize,
}

impl<S: RowSource> BatchStream<'_, S> {
    /// `true` once the stream ended on a terminal read failure.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self.state, StreamState::Aborted)
    }

    fn finish_file(&mut self, file: usize) {
        tracing::info!(
            file = %self.reader.files[file].display(),
            batches = self.batches,
            rows = self.delivered,
            "Finished reading file"
        );
        self.delivered = 0;
        self.batches = 0;
    }

    /// Handle a failed attempt. Returns the item to surface, if any; otherwise `self.state`
    /// holds the next step.
    fn fail(&mut self, file: usize, attempt: u32, err: anyhow::Error) -> Option<Result<DataBatch>> {
        let reader = self.reader;
        let policy = &reader.config.retry;
        let path = &reader.files[file];
        match retry::decide(policy, attempt) {
            RetryDecision::RetryAfter {
                delay,
                next_attempt,
            } => {
                tracing::warn!(
                    file = %path.display(),
                    attempt,
                    attempts = policy.attempts,
                    delay = ?delay,
                    error = %format!("{err:#}"),
                    "Failed to read file, will retry"
                );
                retry::pause(delay);
                self.state = StreamState::Pending {
                    file,
                    attempt: next_attempt,
                };
                None
            }
            RetryDecision::Exhausted => {
                tracing::error!(
                    file = %path.display(),
                    attempts = policy.attempts,
                    on_exhausted = %policy.on_exhausted(),
                    error = %format!("{err:#}"),
                    "Exceeded max retry attempts for file"
                );
                match policy.on_exhausted() {
                    OnExhausted::Abort => {
                        self.state = StreamState::Aborted;
                        Some(Err(Error::IngestionRead {
                            file: path.clone(),
                            attempts: policy.attempts,
                            source: err.into(),
                        }))
                    }
                    OnExhausted::Skip => {
                        self.delivered = 0;
                        self.batches = 0;
                        self.state = StreamState::Pending {
                            file: file + 1,
                            attempt: 1,
                        };
                        None
                    }
                }
            }
        }
    }
}

impl<S: RowSource> Iterator for BatchStream<'_, S> {
    type Item = Result<DataBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader;
        loop {
            match mem::replace(&mut self.state, StreamState::Done) {
                StreamState::Done => return None,
                StreamState::Aborted => {
                    self.state = StreamState::Aborted;
                    return None;
                }
                StreamState::Pending { file, attempt } => {
                    let Some(path) = reader.files.get(file) else {
                        return None;
                    };
                    tracing::info!(file = %path.display(), attempt, "Loading file");
                    let delivered = self.delivered;
                    let opened = reader.source.open(path).and_then(|mut opened| {
                        // A retried attempt resumes after the rows already delivered.
                        skip_rows(&mut opened.rows, delivered)?;
                        Ok(opened)
                    });
                    match opened {
                        Ok(opened) => {
                            self.state = StreamState::Reading {
                                file,
                                attempt,
                                headers: Arc::new(opened.headers),
                                rows: opened.rows,
                            };
                        }
                        Err(e) => {
                            if let Some(item) = self.fail(file, attempt, e) {
                                return Some(item);
                            }
                        }
                    }
                }
                StreamState::Reading {
                    file,
                    attempt,
                    headers,
                    mut rows,
                } => match read_chunk(&mut rows, reader.config.input.chunksize) {
                    Ok((chunk, exhausted)) => {
                        if !chunk.is_empty() {
                            let batch = DataBatch::new(
                                reader.files[file].clone(),
                                self.batches,
                                Arc::clone(&headers),
                                chunk,
                            );
                            self.delivered += batch.len() as u64;
                            self.batches += 1;
                            tracing::debug!(
                                file = %batch.source().display(),
                                batch = batch.index(),
                                rows = batch.len(),
                                "Yielding batch"
                            );
                            if exhausted {
                                drop(rows);
                                self.finish_file(file);
                                self.state = StreamState::Pending {
                                    file: file + 1,
                                    attempt: 1,
                                };
                            } else {
                                self.state = StreamState::Reading {
                                    file,
                                    attempt,
                                    headers,
                                    rows,
                                };
                            }
                            return Some(Ok(batch));
                        }
                        drop(rows);
                        self.finish_file(file);
                        self.state = StreamState::Pending {
                            file: file + 1,
                            attempt: 1,
                        };
                    }
                    Err(e) => {
                        drop(rows);
                        if let Some(item) = self.fail(file, attempt, e) {
                            return Some(item);
                        }
                    }
                },
            }
        }
    }
}

fn skip_rows<R>(rows: &mut R, skip: u64) -> anyhow::Result<()>
where
    R: Iterator<Item = anyhow::Result<StringRecord>>,
{
    for skipped in 0..skip {
        match rows.next() {
            Some(rec) => {
                rec?;
            }
            None => anyhow::bail!(
                "source ended after {skipped} rows but {skip} were already delivered"
            ),
        }
    }
    Ok(())
}

/// Read up to `chunksize` rows. Returns the rows and whether the file is exhausted.
fn read_chunk<R>(rows: &mut R, chunksize: usize) -> anyhow::Result<(Vec<StringRecord>, bool)>
where
    R: Iterator<Item = anyhow::Result<StringRecord>>,
{
    let mut chunk = Vec::with_capacity(chunksize.min(4096));
    while chunk.len() < chunksize {
        match rows.next() {
            Some(rec) => chunk.push(rec?),
            None => return Ok((chunk, true)),
        }
    }
    Ok((chunk, false))
}
