//! Error types for source table loading.

use std::path::PathBuf;

use adam_xpt::XptError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// A required domain table is absent.
    #[error("missing source table for {domain}: {path}")]
    MissingResource { domain: String, path: PathBuf },

    #[error("data directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// The transport file exists but could not be decoded.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: XptError,
    },

    /// Decoded rows could not be turned into a DataFrame.
    #[error("failed to convert {path}: {message}")]
    Conversion { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
