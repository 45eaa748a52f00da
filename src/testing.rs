//! Testing utilities for code built on the configuration and ingestion layers.
//!
//! - **Fixtures**: a complete nine-stage configuration document and typed ingestion
//!   records pointing at a directory of your choice
//! - **Mock I/O**: temporary directories and CSV source files with predictable rows
//! - **Row sources**: [`FlakySource`] injects read failures, [`CountingSource`] records opens
//!
//! # Quick Start
//!
//! ```
//! use timeseries_inventory::ingestion::IngestionReader;
//! use timeseries_inventory::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = TempDirPath::new()?;
//! write_rows_csv(dir.file_path("sales_1.csv"), 250)?;
//!
//! let config = ingestion_config(dir.path(), "*.csv", 10, 100, 3);
//! let flaky = FlakySource::csv().failing_opens(2);
//! let reader = IngestionReader::with_source(&config, &flaky)?;
//!
//! let batches = reader.stream().collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(collect_ids(&batches), (0..250).collect::<Vec<_>>());
//! assert_eq!(flaky.total_opens(), 3);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod mock_io;
pub mod sources;

pub use fixtures::*;
pub use mock_io::*;
pub use sources::*;
