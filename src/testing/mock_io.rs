//! Temporary directories and source files for ingestion tests.

use crate::ingestion::DataBatch;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory that is automatically deleted when dropped.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A path within this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }

    /// Create (and return) a subdirectory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create_dir(&self, name: &str) -> std::io::Result<PathBuf> {
        let dir = self.path.join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

fn write_rows<W: Write>(writer: W, rows: usize) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["id", "value"])?;
    for i in 0..rows {
        wtr.write_record([i.to_string(), format!("{:.1}", i as f64 * 0.5)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a CSV file with an `id,value` header and `rows` data rows; row `i` has `id == i`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_rows_csv(path: impl AsRef<Path>, rows: usize) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_rows(file, rows).with_context(|| format!("write {}", path.display()))
}

/// [`write_rows_csv`], gzip-compressed.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
#[cfg(feature = "compression-gzip")]
pub fn write_rows_csv_gz(path: impl AsRef<Path>, rows: usize) -> Result<()> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    write_rows(&mut encoder, rows).with_context(|| format!("write {}", path.display()))?;
    encoder.finish()?;
    Ok(())
}

/// The `id` column of every row, across `batches`, in stream order.
///
/// Rows without a parseable `id` are skipped.
#[must_use]
pub fn collect_ids(batches: &[DataBatch]) -> Vec<u64> {
    batches
        .iter()
        .filter_map(|b| b.column("id"))
        .flat_map(|col| col.filter_map(|v| v.and_then(|s| s.parse().ok())).collect::<Vec<u64>>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_path() {
        let temp_dir = TempDirPath::new().unwrap();
        assert!(temp_dir.path().is_dir());
        let file_path = temp_dir.file_path("a.csv");
        assert!(file_path.starts_with(temp_dir.path()));
        assert!(file_path.ends_with("a.csv"));
    }

    #[test]
    fn test_write_rows_csv() {
        let temp_dir = TempDirPath::new().unwrap();
        let path = temp_dir.file_path("rows.csv");
        write_rows_csv(&path, 3).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,value\n0,0.0\n1,0.5\n2,1.0\n");
    }
}
