//! Chunked, retrying ingestion of raw source files.
//!
//! [`IngestionReader`] resolves the file set once from a [`DataIngestionConfig`] and
//! [`IngestionReader::stream`] turns it into a lazy sequence of [`DataBatch`]es. How a file
//! becomes rows is behind the [`RowSource`] trait; the default is CSV (optionally gzip
//! compressed).
//!
//! [`DataIngestionConfig`]: crate::config::DataIngestionConfig

mod batch;
mod reader;
pub mod retry;
mod source;

pub use batch::DataBatch;
pub use reader::{BatchStream, IngestionReader};
pub use retry::{RetryDecision, decide};
pub use source::{OpenedFile, RowSource};
