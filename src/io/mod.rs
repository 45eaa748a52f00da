//! Filesystem plumbing for ingestion: file discovery, decompression and CSV row sources.

pub mod compression;
pub mod csv;
pub mod glob;
