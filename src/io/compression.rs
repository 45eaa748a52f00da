//! Transparent decompression of ingestion sources.
//!
//! Codecs are detected by file extension first, then by magic bytes, so a gzip file that
//! lost its `.gz` suffix is still read correctly. With no codec features enabled,
//! [`auto_detect_reader`] is a buffered pass-through.
//!
//! ## Built-in Codecs
//!
//! - **Gzip** (`.gz`, `.gzip`) - via `flate2` (feature: `compression-gzip`)

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A decompression algorithm the ingestion reader can unwrap.
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g., "gzip").
    fn name(&self) -> &str;

    /// Lowercase file extensions with the leading dot.
    fn extensions(&self) -> &[&str];

    /// Optional magic byte signature for content-based detection.
    fn magic_bytes(&self) -> Option<&[u8]>;

    /// Wrap a reader with decompression.
    fn wrap_reader_dyn(
        &self,
        reader: Box<dyn Read + Send>,
    ) -> std::io::Result<Box<dyn Read + Send>>;
}

fn codecs() -> Vec<&'static dyn CompressionCodec> {
    #[allow(unused_mut)]
    let mut out: Vec<&'static dyn CompressionCodec> = Vec::new();
    #[cfg(feature = "compression-gzip")]
    out.push(&GzipCodec);
    out
}

fn detect_from_extension(path: &Path) -> Option<&'static dyn CompressionCodec> {
    let path_str = path.to_string_lossy().to_lowercase();
    codecs()
        .into_iter()
        .find(|codec| codec.extensions().iter().any(|ext| path_str.ends_with(ext)))
}

/// Peeks at the start of the stream without advancing it.
fn detect_from_magic<R: BufRead>(reader: &mut R) -> Option<&'static dyn CompressionCodec> {
    let buf = reader.fill_buf().ok()?;
    if buf.is_empty() {
        return None;
    }
    codecs().into_iter().find(|codec| {
        codec
            .magic_bytes()
            .is_some_and(|magic| buf.len() >= magic.len() && buf.starts_with(magic))
    })
}

/// Wrap `reader` with decompression if `path_hint` or the stream content calls for it.
///
/// # Errors
/// Returns an error if the codec fails to initialise on the stream.
pub fn auto_detect_reader<R: Read + Send + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Read + Send>> {
    if let Some(codec) = detect_from_extension(path_hint.as_ref()) {
        return codec
            .wrap_reader_dyn(Box::new(reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }

    let mut buf_reader = BufReader::new(reader);
    if let Some(codec) = detect_from_magic(&mut buf_reader) {
        return codec
            .wrap_reader_dyn(Box::new(buf_reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }

    Ok(Box::new(buf_reader))
}

#[cfg(feature = "compression-gzip")]
pub struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader_dyn(
        &self,
        reader: Box<dyn Read + Send>,
    ) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }
}

#[cfg(all(test, feature = "compression-gzip"))]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::{Cursor, Write};

    fn gzipped(text: &str) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(text.as_bytes()).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn detects_gzip_by_extension_and_magic() {
        for hint in ["rows.csv.gz", "rows.csv"] {
            let mut out = String::new();
            auto_detect_reader(Cursor::new(gzipped("id\n1\n")), hint)
                .unwrap()
                .read_to_string(&mut out)
                .unwrap();
            assert_eq!(out, "id\n1\n", "hint {hint}");
        }
    }

    #[test]
    fn plain_input_passes_through() {
        let mut out = String::new();
        auto_detect_reader(Cursor::new(b"id\n1\n".to_vec()), "rows.csv")
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "id\n1\n");
    }
}
