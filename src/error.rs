//! Error handling for HPL decoding operations.
//!
//! Every failure is fatal for the file being decoded. Variants carry the
//! 1-based line number (and record index where one exists) so the offending
//! input can be located.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HplError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed header at line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    #[error("Malformed record {record} at line {line}: {reason}")]
    MalformedRecord {
        line: usize,
        record: usize,
        reason: String,
    },

    #[error("Record capacity of {capacity} exceeded at line {line}")]
    CapacityExceeded { capacity: usize, line: usize },

    #[error("No data records found")]
    EmptyFile,

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl HplError {
    /// Create a malformed header error
    pub fn malformed_header(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            line,
            reason: reason.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed_record(line: usize, record: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            record,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Line number the error points at, when it has one
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedHeader { line, .. }
            | Self::MalformedRecord { line, .. }
            | Self::CapacityExceeded { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HplError>;
