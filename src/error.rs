//! Error taxonomy shared by the configuration and ingestion layers.
//!
//! Configuration errors ([`Error::NotFound`], [`Error::Parse`], [`Error::MissingField`],
//! [`Error::TypeMismatch`], [`Error::InvalidValue`]) are never retried: they surface to the
//! caller of the loader or resolver as soon as they are detected. [`Error::IngestionRead`] is
//! only produced once a file has exhausted its retry budget.
//!
//! Every variant names the configuration path or file that caused it, so the message alone is
//! enough to locate the bad input.

use crate::config::ConfigPath;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error carried by the terminal ingestion and stage variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Something the configuration or ingestion layer expected on disk was not there.
#[derive(Debug, Error)]
pub enum NotFound {
    #[error("configuration file not found: {}", .0.display())]
    ConfigFile(PathBuf),

    #[error("source directory does not exist: {}", .0.display())]
    SourceDirectory(PathBuf),

    #[error("no files matching pattern '{pattern}' in {}", .directory.display())]
    NoMatchingFiles { directory: PathBuf, pattern: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("missing required field `{path}`")]
    MissingField { path: ConfigPath },

    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: ConfigPath,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid value at `{path}`: {reason}")]
    InvalidValue { path: ConfigPath, reason: String },

    #[error("failed to read {} after {attempts} attempt(s): {source}", .file.display())]
    IngestionRead {
        file: PathBuf,
        attempts: u32,
        #[source]
        source: BoxError,
    },

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// `true` for any [`NotFound`] condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// `true` for schema violations raised while resolving a stage configuration.
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::MissingField { .. } | Error::TypeMismatch { .. } | Error::InvalidValue { .. }
        )
    }

    /// The configuration path this error points at, if it is a schema error.
    #[must_use]
    pub fn config_path(&self) -> Option<&ConfigPath> {
        match self {
            Error::MissingField { path }
            | Error::TypeMismatch { path, .. }
            | Error::InvalidValue { path, .. } => Some(path),
            _ => None,
        }
    }

    pub(crate) fn missing(path: ConfigPath) -> Self {
        Error::MissingField { path }
    }

    pub(crate) fn invalid(path: ConfigPath, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            path,
            reason: reason.into(),
        }
    }
}
