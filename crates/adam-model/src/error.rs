use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdamError {
    #[error("{table} is missing required column {column}")]
    MissingColumn { table: String, column: String },

    #[error("duplicate USUBJID in ADSL: {}", .subjects.join(", "))]
    DuplicateSubjects { subjects: Vec<String> },

    #[error("invalid rule set '{name}': {message}")]
    InvalidRuleSet { name: String, message: String },

    #[error("failed to parse rule set {origin}: {source}")]
    RuleSetParse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown ADSL column: {column}")]
    UnknownColumn { column: String },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AdamError {
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub(crate) fn invalid_rules(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidRuleSet {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdamError>;
