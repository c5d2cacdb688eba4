//! Error types for XPT file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing XPT files.
#[derive(Debug, Error)]
pub enum XptError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid XPT file format.
    #[error("invalid XPT file: {message}")]
    InvalidFormat { message: String },

    /// Missing required header record.
    #[error("missing header: expected {expected}")]
    MissingHeader { expected: &'static str },

    /// Invalid NAMESTR record.
    #[error("invalid NAMESTR at index {index}: {message}")]
    InvalidNamestr { index: usize, message: String },

    /// Dataset name is empty or longer than 8 characters.
    #[error("invalid dataset name: '{name}'")]
    InvalidDatasetName { name: String },

    /// Variable name is empty or longer than 8 characters.
    #[error("invalid variable name: '{name}'")]
    InvalidVariableName { name: String },

    /// Duplicate variable name.
    #[error("duplicate variable name: {name}")]
    DuplicateVariable { name: String },

    /// Row length mismatch.
    #[error("row length mismatch: expected {expected}, got {actual}")]
    RowLengthMismatch { expected: usize, actual: usize },

    /// Value type does not match the column type.
    #[error("value for column {name} does not match its {expected} type")]
    TypeMismatch { name: String, expected: &'static str },

    /// Record out of bounds.
    #[error("record out of bounds at offset {offset}")]
    RecordOutOfBounds { offset: usize },

    /// Numeric field parsing error.
    #[error("failed to parse numeric field: {field}")]
    NumericParse { field: String },

    /// Observation data overflow.
    #[error("observation length overflow")]
    ObservationOverflow,

    /// Unexpected trailing bytes.
    #[error("unexpected trailing bytes in observations")]
    TrailingBytes,

    /// DataFrame conversion failed.
    #[cfg(feature = "polars")]
    #[error("dataframe conversion failed: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for XPT operations.
pub type Result<T> = std::result::Result<T, XptError>;

impl XptError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create a MissingHeader error.
    pub fn missing_header(expected: &'static str) -> Self {
        Self::MissingHeader { expected }
    }
}
