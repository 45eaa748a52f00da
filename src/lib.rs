//! # timeseries-inventory
//!
//! Configuration and ingestion core for a **time-series inventory forecasting pipeline**.
//! The crate turns a single YAML configuration document into nine strictly-typed stage
//! records and reads raw source files as a lazy, retrying stream of bounded batches.
//!
//! ## Key Features
//!
//! - **Immutable configuration snapshot** - [`ConfigDocument`] preserves key order and turns
//!   every string under a `path` key into a filesystem path
//! - **Path catalog** - [`config::extract`] lists every address in a document, in pre-order
//! - **Typed stage records** - one `resolve_*` function per stage; a missing or mistyped field
//!   fails with the exact dotted path
//! - **Chunked ingestion** - [`IngestionReader`] matches files with a glob pattern and yields
//!   [`DataBatch`]es of at most `chunksize` rows
//! - **Retries without duplicates** - a failed read is retried with a fixed delay and resumes
//!   after the rows already delivered
//! - **Gzip sources** - `.gz` files are decompressed transparently (`compression-gzip`)
//!
//! ## Quick Start
//!
//! ```no_run
//! use timeseries_inventory::*;
//!
//! # fn main() -> Result<()> {
//! let doc = ConfigDocument::load_default()?;
//! let ingestion = config::resolve_data_ingestion(&doc)?;
//!
//! let reader = IngestionReader::new(&ingestion)?;
//! for batch in reader.stream() {
//!     let batch = batch?;
//!     println!("{}: {} rows", batch.source().display(), batch.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Configuration document
//!
//! A [`ConfigDocument`] is loaded once and never mutated. Its tree is made of [`Node`]s:
//! scalars, ordered mappings and sequences. Addresses such as
//! `data_ingestion.retry.attempts` or `feature_engineering.operations.lag_features.lags[0]`
//! are [`ConfigPath`]s.
//!
//! ### Stage records
//!
//! Each pipeline stage reads its own top-level section through [`config::StageConfig`].
//! Resolution is all-or-nothing and independent of the other stages;
//! [`config::StageConfigs::resolve_all`] resolves all nine at once.
//!
//! ### Ingestion
//!
//! [`IngestionReader::stream`] reads files in directory-listing order, then rows in file
//! order. Each file gets `retry.attempts` attempts; once they are spent the stream yields a
//! single [`Error::IngestionRead`] and stops (or moves on, with `retry.on_exhausted: skip`).
//!
//! ### Orchestration
//!
//! [`Orchestrator`] feeds the batches to a [`Collaborators`] implementation's cleaning hook
//! and then calls the remaining stages in pipeline order.
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber; configure one in the
//! application.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---|---|---|
//! | `compression-gzip` | yes | Read `.gz` source files |
//!
//! ## Testing
//!
//! The [`testing`] module has fixtures, temporary source files and row sources that inject
//! failures, for exercising your own stage code.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod io;
pub mod pipeline;
pub mod testing;

// General re-exports
pub use config::{ConfigDocument, ConfigPath, Node, Scalar, StageConfig, StageConfigs};
pub use error::{Error, NotFound, Result};
pub use ingestion::{BatchStream, DataBatch, IngestionReader, RowSource};
pub use io::csv::CsvSource;
pub use pipeline::{Collaborators, Orchestrator, RunSummary};
