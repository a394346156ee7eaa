//! Error handling utilities shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = CorpusError> = std::result::Result<T, E>;

/// Failures raised while configuring, listing, reading, or writing a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Configuration was missing or failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Filesystem IO error with optional context path.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying IO error returned by the standard library.
        source: std::io::Error,
        /// Target path associated with the IO failure if available.
        path: Option<PathBuf>,
    },
    /// An input file contained bytes that are not valid UTF-8.
    #[error("{path:?} is not valid UTF-8 (line {line})")]
    Decode {
        /// File that failed to decode.
        path: PathBuf,
        /// 1-based line number of the offending line.
        line: usize,
    },
    /// Serialization failure while rendering a run report.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CorpusError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl CorpusError {
    /// Helper constructor that attaches an optional path when wrapping IO errors.
    pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }
}
