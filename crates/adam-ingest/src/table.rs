use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;

/// A decoded source table.
#[derive(Debug, Clone)]
pub struct SourceTable {
    /// Upper-case domain code, e.g. `DM` or `SUPPDM`.
    pub domain: String,
    pub path: PathBuf,
    pub data: DataFrame,
}

impl SourceTable {
    pub fn new(domain: impl Into<String>, path: impl Into<PathBuf>, data: DataFrame) -> Self {
        Self {
            domain: domain.into(),
            path: path.into(),
            data,
        }
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }
}

/// Outcome of looking for a domain's supplemental table.
#[derive(Debug, Clone, Default)]
pub enum SupplementalData {
    /// No supplemental file exists.
    #[default]
    Absent,
    /// The file exists but holds no records.
    Empty { path: PathBuf },
    Loaded(SourceTable),
}

impl SupplementalData {
    /// The table, if it carries any records.
    pub fn table(&self) -> Option<&SourceTable> {
        match self {
            Self::Loaded(table) => Some(table),
            Self::Absent | Self::Empty { .. } => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Absent => None,
            Self::Empty { path } => Some(path),
            Self::Loaded(table) => Some(&table.path),
        }
    }

    pub fn rows(&self) -> usize {
        self.table().map_or(0, SourceTable::height)
    }
}

/// A domain's main table with its supplemental qualifiers.
#[derive(Debug, Clone)]
pub struct DomainSource {
    pub main: SourceTable,
    pub supplemental: SupplementalData,
}

impl DomainSource {
    pub fn domain(&self) -> &str {
        &self.main.domain
    }
}
